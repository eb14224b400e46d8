use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DbError, Result};
use crate::model::{RecordId, RecordPatch};
use crate::store::{RecordStore, StorageBackend};

/// Applies a patch to one record. An empty patch is refused rather than
/// silently rewriting the file.
pub fn run<B: StorageBackend>(
    store: &mut RecordStore<B>,
    id: RecordId,
    patch: &RecordPatch,
) -> Result<CmdResult> {
    if patch.is_empty() {
        return Err(DbError::Validation(
            "nothing to edit; pass at least one of --data, --tag, --rm-tag, --attr, --unset-attr"
                .into(),
        ));
    }
    let record = store.update(id, patch)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Entry {} updated", id)));
    Ok(result.with_records(vec![record]))
}
