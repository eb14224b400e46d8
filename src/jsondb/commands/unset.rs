use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::RecordId;
use crate::store::{RecordStore, StorageBackend};

pub fn run<B: StorageBackend>(store: &mut RecordStore<B>, id: RecordId) -> Result<CmdResult> {
    let removed = store.delete(id)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Entry {} deleted", id)));
    Ok(result.with_records(vec![removed]))
}
