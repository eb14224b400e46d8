use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::registry::{db_name, Registry};
use std::path::Path;

/// All registered database paths.
pub fn list(registry: &Registry) -> Result<CmdResult> {
    Ok(CmdResult::default().with_paths(registry.list()?))
}

pub fn add(registry: &Registry, path: &Path) -> Result<CmdResult> {
    registry.ensure()?;
    let registered = registry.register(path)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Registered database {} at {}",
        db_name(&registered),
        registered.display()
    )));
    if !registered.exists() {
        result.add_message(CmdMessage::warning(format!(
            "{} does not exist yet",
            registered.display()
        )));
    }
    Ok(result.with_paths(vec![registered]))
}

pub fn remove(registry: &Registry, name: &str) -> Result<CmdResult> {
    let removed = registry.unregister(name)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Unregistered database {}",
        name
    )));
    Ok(result.with_paths(vec![removed]))
}
