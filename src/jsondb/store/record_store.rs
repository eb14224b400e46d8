use super::backend::StorageBackend;
use super::{document, SettingsChange, StoreInfo, StoreSettings, StoreState};
use crate::error::{DbError, Result};
use crate::model::{validate_attr_key, Attributes, Record, RecordId, RecordPatch, TagSet};
use crate::query::{self, FindMode};
use crate::tags::validate_tags;
use tracing::{debug, info};

/// The in-memory record collection and the single writer of its persisted
/// document.
pub struct RecordStore<B: StorageBackend> {
    backend: B,
    state: StoreState,
    /// Text of the last document read or written, kept for backups.
    persisted: Option<String>,
}

impl<B: StorageBackend> RecordStore<B> {
    /// Loads the store from the backend. A missing document opens an empty
    /// store; a corrupt one is an error.
    pub fn open(backend: B) -> Result<Self> {
        let persisted = backend.load()?;
        let state = match &persisted {
            Some(text) => document::parse(text)?,
            None => StoreState::default(),
        };
        debug!(
            location = %backend.location().display(),
            records = state.records.len(),
            "opened store"
        );
        Ok(Self {
            backend,
            state,
            persisted,
        })
    }

    /// Writes a fresh, empty document. Fails if one already exists.
    pub fn initialize(backend: B) -> Result<Self> {
        if backend.exists() {
            return Err(DbError::Registry(format!(
                "the file {} already exists",
                backend.location().display()
            )));
        }
        let mut store = Self {
            backend,
            state: StoreState::default(),
            persisted: None,
        };
        let empty = store.state.clone();
        store.commit(empty)?;
        Ok(store)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.state.settings
    }

    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    /// The id the next `create` will assign.
    pub fn next_id(&self) -> RecordId {
        self.state.next_id
    }

    /// All records in ascending id order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.state.records.values()
    }

    pub fn get(&self, id: RecordId) -> Result<&Record> {
        self.state.records.get(&id).ok_or(DbError::NotFound(id))
    }

    /// Records carrying every tag in `tags`, ascending by id.
    pub fn filter<S: AsRef<str>>(&self, tags: &[S]) -> Vec<&Record> {
        query::filter(self.records(), tags)
    }

    /// Ids whose data matches `needle`, ascending.
    pub fn find_id(&self, needle: &str, mode: FindMode) -> Vec<RecordId> {
        query::find_id(self.records(), needle, mode)
    }

    pub fn create(
        &mut self,
        data: impl Into<String>,
        tags: &[String],
        attrs: Attributes,
    ) -> Result<Record> {
        validate_tags(tags)?;
        for key in attrs.keys() {
            validate_attr_key(key)?;
        }
        self.check_enforced(tags)?;

        let mut next = self.state.clone();
        let id = next.next_id;
        next.next_id = id
            .checked_add(1)
            .ok_or_else(|| DbError::PersistedState("record id space exhausted".into()))?;
        let record = Record::new(id, data, tags.iter().cloned().collect::<TagSet>(), attrs);
        next.records.insert(id, record.clone());

        self.commit(next)?;
        info!(id, "created record");
        Ok(record)
    }

    /// Removes a record. Its id is never handed out again.
    pub fn delete(&mut self, id: RecordId) -> Result<Record> {
        let mut next = self.state.clone();
        let removed = next.records.remove(&id).ok_or(DbError::NotFound(id))?;
        self.commit(next)?;
        info!(id, "deleted record");
        Ok(removed)
    }

    /// Applies a patch atomically: either every sub-change is persisted or the
    /// record is left as it was.
    pub fn update(&mut self, id: RecordId, patch: &RecordPatch) -> Result<Record> {
        let current = self.get(id)?;

        validate_tags(&patch.add_tags)?;
        for (key, _) in &patch.set_attrs {
            validate_attr_key(key)?;
        }
        // Tags the record already carries stay valid even if no longer enforced.
        let added: Vec<String> = patch
            .add_tags
            .iter()
            .filter(|t| !current.tags.contains(t))
            .cloned()
            .collect();
        self.check_enforced(&added)?;

        let mut next = self.state.clone();
        let record = next.records.get_mut(&id).ok_or(DbError::NotFound(id))?;
        patch.apply_to(record);
        let updated = record.clone();

        self.commit(next)?;
        info!(id, "updated record");
        Ok(updated)
    }

    /// Replaces the enforced tag list. Records already carrying tags outside
    /// the new list keep them.
    pub fn set_enforced_tags(&mut self, tags: &[String]) -> Result<()> {
        validate_tags(tags)?;
        let mut next = self.state.clone();
        next.settings.enforced_tags = tags.iter().cloned().collect();
        self.commit(next)?;
        info!(?tags, "replaced enforced tags");
        Ok(())
    }

    pub fn set_enforcement(&mut self, on: bool) -> Result<()> {
        self.configure(&SettingsChange {
            enforce_tags: Some(on),
            ..Default::default()
        })
    }

    pub fn set_backups(&mut self, on: bool) -> Result<()> {
        self.configure(&SettingsChange {
            backups_enabled: Some(on),
            ..Default::default()
        })
    }

    /// Applies several settings changes with a single write.
    pub fn configure(&mut self, change: &SettingsChange) -> Result<()> {
        validate_tags(&change.add_tags)?;
        let mut next = self.state.clone();
        change.apply_to(&mut next.settings);
        self.commit(next)?;
        info!(?change, "updated settings");
        Ok(())
    }

    pub fn info(&self) -> Result<StoreInfo> {
        let mut universe = TagSet::new();
        for record in self.records() {
            for tag in &record.tags {
                universe.insert(tag.clone());
            }
        }
        let byte_size = document::render(&self.state)?.len();
        Ok(StoreInfo {
            tag_universe: universe.as_slice().to_vec(),
            enforced_tags: self.state.settings.enforced_tags.as_slice().to_vec(),
            size: self.len(),
            byte_size,
            path: self.backend.location(),
            backups_enabled: self.state.settings.backups_enabled,
            tags_enforced: self.state.settings.enforce_tags,
        })
    }

    fn check_enforced(&self, tags: &[String]) -> Result<()> {
        let rejected = self.state.settings.rejected_tags(tags);
        if rejected.is_empty() {
            Ok(())
        } else {
            Err(DbError::TagNotEnforced { tags: rejected })
        }
    }

    /// Persists `next` and makes it the current state. On failure the current
    /// state is untouched.
    fn commit(&mut self, next: StoreState) -> Result<()> {
        let text = document::render(&next)?;
        if self.state.settings.backups_enabled {
            if let Some(previous) = &self.persisted {
                self.backend.backup(previous)?;
            }
        }
        self.backend.save(&text)?;
        self.state = next;
        self.persisted = Some(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn store() -> RecordStore<MemBackend> {
        RecordStore::open(MemBackend::new()).unwrap()
    }

    #[test]
    fn exhausted_id_space_fails_without_writing() {
        let text = r#"{"version":"0.1.0","next_id":18446744073709551615,"records":[]}"#;
        let mut store = RecordStore::open(MemBackend::with_content(text)).unwrap();
        let err = store.create("a", &[], Attributes::new()).unwrap_err();

        assert!(matches!(err, DbError::PersistedState(_)));
        assert!(store.is_empty());
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn ids_increase_and_are_never_reused() {
        let mut store = store();
        let a = store.create("a", &[], Attributes::new()).unwrap();
        let b = store.create("b", &[], Attributes::new()).unwrap();
        store.delete(b.id).unwrap();
        let c = store.create("c", &[], Attributes::new()).unwrap();

        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert_eq!(c.id, 2);
    }

    #[test]
    fn ids_survive_reopen_after_delete() {
        let mut store = store();
        store.create("a", &[], Attributes::new()).unwrap();
        let b = store.create("b", &[], Attributes::new()).unwrap();
        store.delete(b.id).unwrap();

        let text = store.backend().snapshot().unwrap();
        let mut reopened = RecordStore::open(MemBackend::with_content(text)).unwrap();
        let c = reopened.create("c", &[], Attributes::new()).unwrap();
        assert_eq!(c.id, 2);
    }

    #[test]
    fn every_mutation_is_written_through() {
        let mut store = store();
        store.create("a", &[], Attributes::new()).unwrap();
        store.update(0, &RecordPatch::new().data("b")).unwrap();
        store.set_backups(true).unwrap();
        assert_eq!(store.backend().write_count(), 3);

        let reopened =
            RecordStore::open(MemBackend::with_content(store.backend().snapshot().unwrap()))
                .unwrap();
        assert_eq!(reopened.get(0).unwrap().data, "b");
        assert!(reopened.settings().backups_enabled);
    }

    #[test]
    fn get_and_delete_missing_ids() {
        let mut store = store();
        assert!(matches!(store.get(9), Err(DbError::NotFound(9))));
        assert!(matches!(store.delete(9), Err(DbError::NotFound(9))));
        assert!(matches!(
            store.update(9, &RecordPatch::new().data("x")),
            Err(DbError::NotFound(9))
        ));
    }

    #[test]
    fn enforcement_rejects_unknown_tags_on_create() {
        let mut store = store();
        store.set_enforced_tags(&tags(&["x"])).unwrap();
        store.set_enforcement(true).unwrap();
        let before = store.backend().snapshot();

        let err = store
            .create("a", &tags(&["x", "y"]), Attributes::new())
            .unwrap_err();
        match err {
            DbError::TagNotEnforced { tags } => assert_eq!(tags, vec!["y".to_string()]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.backend().snapshot(), before);
        assert!(store.is_empty());
    }

    #[test]
    fn failed_update_leaves_record_and_file_unchanged() {
        let mut store = store();
        store.set_enforced_tags(&tags(&["x"])).unwrap();
        store.set_enforcement(true).unwrap();
        let record = store.create("a", &tags(&["x"]), Attributes::new()).unwrap();
        let before = store.backend().snapshot();

        let patch = RecordPatch::new().data("changed").add_tags(["y"]);
        assert!(matches!(
            store.update(record.id, &patch),
            Err(DbError::TagNotEnforced { .. })
        ));
        assert_eq!(store.get(record.id).unwrap(), &record);
        assert_eq!(store.backend().snapshot(), before);
    }

    #[test]
    fn evicted_tags_stay_on_records() {
        let mut store = store();
        store.set_enforced_tags(&tags(&["x", "y"])).unwrap();
        store.set_enforcement(true).unwrap();
        let record = store.create("a", &tags(&["y"]), Attributes::new()).unwrap();

        store.set_enforced_tags(&tags(&["x"])).unwrap();
        assert_eq!(store.get(record.id).unwrap().tags.as_slice(), &tags(&["y"]));

        // Re-adding a tag the record already has is not a new addition.
        store
            .update(record.id, &RecordPatch::new().add_tags(["y", "x"]))
            .unwrap();
        assert_eq!(
            store.get(record.id).unwrap().tags.as_slice(),
            &tags(&["y", "x"])
        );
    }

    #[test]
    fn enforcement_with_empty_list_rejects_everything() {
        let mut store = store();
        store.set_enforcement(true).unwrap();
        assert!(matches!(
            store.create("a", &tags(&["any"]), Attributes::new()),
            Err(DbError::TagNotEnforced { .. })
        ));
        assert!(store.create("untagged", &[], Attributes::new()).is_ok());
    }

    #[test]
    fn removing_absent_tag_is_a_noop() {
        let mut store = store();
        let record = store.create("a", &tags(&["x"]), Attributes::new()).unwrap();
        let updated = store
            .update(record.id, &RecordPatch::new().remove_tags(["z"]))
            .unwrap();
        assert_eq!(updated, record);
    }

    #[test]
    fn invalid_input_is_a_validation_error() {
        let mut store = store();
        assert!(matches!(
            store.create("a", &tags(&["two words"]), Attributes::new()),
            Err(DbError::Validation(_))
        ));
        let mut attrs = Attributes::new();
        attrs.insert("bad key".into(), "v".into());
        assert!(matches!(
            store.create("a", &[], attrs),
            Err(DbError::Validation(_))
        ));
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn write_failure_rolls_back() {
        let mut store = store();
        store.create("a", &[], Attributes::new()).unwrap();
        store.backend().set_simulate_write_error(true);

        assert!(store.create("b", &[], Attributes::new()).is_err());
        assert!(store.delete(0).is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.next_id(), 1);
    }

    #[test]
    fn backups_hold_the_previous_document() {
        let mut store = store();
        store.create("a", &[], Attributes::new()).unwrap();
        store.set_backups(true).unwrap();
        let before = store.backend().snapshot().unwrap();

        store.create("b", &[], Attributes::new()).unwrap();
        let backups = store.backend().backups();
        assert_eq!(backups.last(), Some(&before));
    }

    #[test]
    fn no_backups_when_disabled() {
        let mut store = store();
        store.create("a", &[], Attributes::new()).unwrap();
        store.create("b", &[], Attributes::new()).unwrap();
        assert!(store.backend().backups().is_empty());
    }

    #[test]
    fn info_reports_attached_tags_not_enforced_list() {
        let mut store = store();
        store.set_enforced_tags(&tags(&["x", "y", "unused"])).unwrap();
        store.create("a", &tags(&["y"]), Attributes::new()).unwrap();
        store.create("b", &tags(&["x", "y"]), Attributes::new()).unwrap();

        let info = store.info().unwrap();
        assert_eq!(info.tag_universe, tags(&["y", "x"]));
        assert_eq!(info.enforced_tags, tags(&["x", "y", "unused"]));
        assert_eq!(info.size, 2);
        assert_eq!(
            info.byte_size,
            store.backend().snapshot().unwrap().len()
        );
        assert!(!info.tags_enforced);
        assert!(!info.backups_enabled);
    }

    #[test]
    fn initialize_refuses_existing_document() {
        let backend = MemBackend::with_content("{}");
        assert!(matches!(
            RecordStore::initialize(backend),
            Err(DbError::Registry(_))
        ));

        let store = RecordStore::initialize(MemBackend::new()).unwrap();
        assert!(store.backend().exists());
    }

    #[test]
    fn configure_applies_clear_after_add() {
        let mut store = store();
        store
            .configure(&SettingsChange {
                add_tags: tags(&["a"]),
                clear_tags: true,
                enforce_tags: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(store.settings().enforced_tags.is_empty());
        assert!(store.settings().enforce_tags);
        assert_eq!(store.backend().write_count(), 1);
    }

    #[test]
    fn save_load_save_round_trips() {
        let mut store = store();
        let mut attrs = Attributes::new();
        attrs.insert("k".into(), "v".into());
        store.create("a", &tags(&["x"]), attrs).unwrap();
        store.create("b \"quoted\"", &[], Attributes::new()).unwrap();
        store.delete(0).unwrap();
        let first = store.backend().snapshot().unwrap();

        let reopened = RecordStore::open(MemBackend::with_content(first.clone())).unwrap();
        let second = document::render(&reopened.state).unwrap();
        assert_eq!(first, second);
    }
}
