use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::{RecordStore, StorageBackend};

pub fn run<B: StorageBackend>(store: &RecordStore<B>) -> Result<CmdResult> {
    Ok(CmdResult::default().with_info(store.info()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::set;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn reports_summary() {
        let mut store = RecordStore::open(MemBackend::new()).unwrap();
        set::run(&mut store, "a", &["x".into()], &[]).unwrap();
        set::run(&mut store, "b", &["y".into(), "x".into()], &[]).unwrap();

        let info = run(&store).unwrap().info.unwrap();
        assert_eq!(info.size, 2);
        assert_eq!(info.tag_universe, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(info.path.to_string_lossy(), "memory://jsondb");
    }
}
