use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{parse_attr_pairs, Attributes};
use crate::store::{RecordStore, StorageBackend};

/// Creates a record from CLI-style input: tags and `KEY:VALUE` entries.
pub fn run<B: StorageBackend>(
    store: &mut RecordStore<B>,
    data: &str,
    tags: &[String],
    attrs: &[String],
) -> Result<CmdResult> {
    let map: Attributes = parse_attr_pairs(attrs)?.into_iter().collect();
    let record = store.create(data, tags, map)?;
    let mut result = CmdResult::default().with_ids(vec![record.id]);
    result.add_message(CmdMessage::success(format!("Entry {} added", record.id)));
    Ok(result.with_records(vec![record]))
}
