use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::RecordId;
use crate::store::{RecordStore, StorageBackend};
use crate::template::Template;

/// Renders the given records, one line each, in the order the ids are given.
/// Every id is looked up before anything is rendered.
pub fn run<B: StorageBackend>(
    store: &RecordStore<B>,
    ids: &[RecordId],
    template: &Template,
) -> Result<CmdResult> {
    let records = ids
        .iter()
        .map(|id| store.get(*id))
        .collect::<Result<Vec<_>>>()?;
    let output = template.render_all(records.iter().copied());
    Ok(CmdResult::default()
        .with_ids(ids.to_vec())
        .with_output(output))
}
