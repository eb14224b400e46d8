use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::{RecordStore, StorageBackend};

/// Ids of the records carrying every tag in `filter`, ascending.
pub fn run<B: StorageBackend>(store: &RecordStore<B>, filter: &[String]) -> Result<CmdResult> {
    let ids = store.filter(filter).iter().map(|r| r.id).collect();
    Ok(CmdResult::default().with_ids(ids))
}
