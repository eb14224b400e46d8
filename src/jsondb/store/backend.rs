use crate::error::Result;
use std::path::PathBuf;

/// Raw I/O for a single persisted store document.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`RecordStore`](super::RecordStore) handles the "what" (records, tags,
/// write-through).
pub trait StorageBackend {
    /// True once a document has been written at this location.
    fn exists(&self) -> bool;

    /// Read the persisted document. Returns Ok(None) if nothing exists yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the persisted document wholesale.
    /// MUST be atomic (write to tmp then rename) to avoid partial writes.
    fn save(&self, content: &str) -> Result<()>;

    /// Keep a point-in-time copy of a previously persisted document.
    fn backup(&self, previous: &str) -> Result<()>;

    /// Where the document lives. A real path for `FsBackend`, a virtual one
    /// for `MemBackend`.
    fn location(&self) -> PathBuf;
}
