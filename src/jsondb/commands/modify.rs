use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{RecordStore, SettingsChange, StorageBackend};

/// Applies a settings change as one write.
pub fn run<B: StorageBackend>(
    store: &mut RecordStore<B>,
    change: &SettingsChange,
    suppress_warnings: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if change.is_empty() {
        result.add_message(CmdMessage::info("Nothing to modify"));
        return Ok(result);
    }
    if change.clear_tags && !change.add_tags.is_empty() && !suppress_warnings {
        result.add_message(CmdMessage::warning(
            "--add-tag will be overridden by --clear-tags. Suppress this warning by setting \
             the JSONDB_SUPPRESS_WARNINGS environment variable to 1.",
        ));
    }

    store.configure(change)?;
    result.add_message(CmdMessage::success("Database settings updated"));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::mem_backend::MemBackend;

    fn store() -> RecordStore<MemBackend> {
        RecordStore::open(MemBackend::new()).unwrap()
    }

    #[test]
    fn applies_all_changes_in_one_write() {
        let mut store = store();
        let change = SettingsChange {
            add_tags: vec!["a".into(), "b".into(), "c".into()],
            remove_tags: vec!["b".into()],
            enforce_tags: Some(true),
            backups_enabled: Some(true),
            ..Default::default()
        };
        run(&mut store, &change, false).unwrap();

        let settings = store.settings();
        assert_eq!(
            settings.enforced_tags.as_slice(),
            &["a".to_string(), "c".to_string()]
        );
        assert!(settings.enforce_tags);
        assert!(settings.backups_enabled);
        assert_eq!(store.backend().write_count(), 1);
    }

    #[test]
    fn clear_overrides_add_with_warning() {
        let mut store = store();
        let change = SettingsChange {
            add_tags: vec!["a".into()],
            clear_tags: true,
            ..Default::default()
        };
        let result = run(&mut store, &change, false).unwrap();
        assert!(store.settings().enforced_tags.is_empty());
        assert_eq!(result.messages[0].level, MessageLevel::Warning);

        let result = run(&mut store, &change, true).unwrap();
        assert!(result
            .messages
            .iter()
            .all(|m| m.level != MessageLevel::Warning));
    }

    #[test]
    fn empty_change_does_not_write() {
        let mut store = store();
        run(&mut store, &SettingsChange::default(), false).unwrap();
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn invalid_tag_is_rejected() {
        let mut store = store();
        let change = SettingsChange {
            add_tags: vec!["has space".into()],
            ..Default::default()
        };
        assert!(run(&mut store, &change, false).is_err());
        assert!(store.settings().enforced_tags.is_empty());
    }
}
