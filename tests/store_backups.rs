use jsondb::model::Attributes;
use jsondb::store::fs_backend::FsBackend;
use jsondb::store::RecordStore;
use std::fs;

#[test]
fn mutation_backs_up_the_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.jsondb");
    let mut store = RecordStore::initialize(FsBackend::new(&path)).unwrap();
    store.set_backups(true).unwrap();
    assert!(store.backend().list_backups().unwrap().is_empty());

    let before = fs::read_to_string(&path).unwrap();
    store.create("Dune", &[], Attributes::new()).unwrap();

    let backup_dir = dir.path().join(".jsondb_backups_books");
    assert_eq!(store.backend().backup_dir(), backup_dir);
    let backups = store.backend().list_backups().unwrap();
    assert_eq!(backups.len(), 1);

    let name = backups[0].file_name().unwrap().to_str().unwrap().to_string();
    let ts = name
        .strip_prefix(".jsondb_backup_books_")
        .and_then(|rest| rest.strip_suffix(".jsondb"))
        .unwrap();
    assert!(ts.parse::<i64>().is_ok(), "unexpected backup name {}", name);
    assert_eq!(backups[0].parent().unwrap(), backup_dir);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), before);
    assert!(!fs::read_to_string(&path).unwrap().eq(&before));
}

#[test]
fn old_backups_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.jsondb");
    RecordStore::initialize(FsBackend::new(&path))
        .unwrap()
        .set_backups(true)
        .unwrap();

    let mut store = RecordStore::open(FsBackend::new(&path).with_backup_keep_count(2)).unwrap();
    for data in ["a", "b", "c", "d"] {
        store.create(data, &[], Attributes::new()).unwrap();
    }

    let backups = store.backend().list_backups().unwrap();
    assert_eq!(backups.len(), 2);
    // the newest backup holds the document as it was before the last create
    let newest = fs::read_to_string(backups.last().unwrap()).unwrap();
    assert!(newest.contains("\"c\""));
    assert!(!newest.contains("\"d\""));
}

#[test]
fn no_backups_while_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.jsondb");
    let mut store = RecordStore::initialize(FsBackend::new(&path)).unwrap();
    store.create("a", &[], Attributes::new()).unwrap();

    assert!(store.backend().list_backups().unwrap().is_empty());
    assert!(!dir.path().join(".jsondb_backups_plain").exists());
}
