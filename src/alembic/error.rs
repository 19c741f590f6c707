use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlchemyError {
    #[error("Invalid reveal level {0}: valid levels are 0 (novice) to 4 (master)")]
    InvalidLevel(i64),

    #[error("Invalid combination size {0}: combinations need at least 2 items")]
    InvalidCombinationSize(usize),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Duplicate item name: {0}")]
    DuplicateItem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, AlchemyError>;
