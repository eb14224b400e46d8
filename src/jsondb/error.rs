use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("The following tags aren't registered: {}", .tags.join(", "))]
    TagNotEnforced { tags: Vec<String> },

    #[error("Record {0} does not exist")]
    NotFound(u64),

    #[error("Format error at position {position} ('{fragment}'): {message}")]
    FormatSyntax {
        position: usize,
        fragment: String,
        message: String,
    },

    #[error("Corrupt database: {0}")]
    PersistedState(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DbError {
    /// Process exit code used by the binary for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            DbError::Registry(_) => 2,
            DbError::PersistedState(_) => 3,
            DbError::Io(_) | DbError::Serialization(_) => 4,
            DbError::TagNotEnforced { .. } => 7,
            DbError::Validation(_) => 8,
            DbError::NotFound(_) => 9,
            DbError::FormatSyntax { .. } => 11,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
