use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::query::FindMode;
use crate::store::{RecordStore, StorageBackend};

/// Finds the ids of records whose data matches `needle`.
pub fn run<B: StorageBackend>(
    store: &RecordStore<B>,
    needle: &str,
    mode: FindMode,
) -> Result<CmdResult> {
    let ids = store.find_id(needle, mode);
    let mut result = CmdResult::default();
    if ids.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Nothing found matching '{}'",
            needle
        )));
    }
    Ok(result.with_ids(ids))
}
