use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DbError, Result};
use crate::registry::{Registry, DB_EXTENSION};
use crate::store::fs_backend::FsBackend;
use crate::store::RecordStore;
use std::path::Path;

/// Creates `<dir>/<name>.jsondb` (dir defaults to the registry home) and
/// registers it.
pub fn run(registry: &Registry, name: &str, dir: Option<&Path>) -> Result<CmdResult> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(DbError::Validation(format!(
            "'{}' is not a valid database name",
            name
        )));
    }
    if registry.find(name).is_ok() {
        return Err(DbError::Registry(format!(
            "A database called '{}' is already registered elsewhere",
            name
        )));
    }

    registry.ensure()?;
    let dir = dir.unwrap_or_else(|| registry.home());
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", name, DB_EXTENSION));

    RecordStore::initialize(FsBackend::new(&path))?;
    let registered = registry.register(&path)?;

    let mut result = CmdResult::default().with_paths(vec![registered.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Initialized database {} at {}",
        name,
        registered.display()
    )));
    Ok(result)
}
