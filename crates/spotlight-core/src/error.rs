use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog error in {path}: {reason}")]
    Catalog { path: String, reason: String },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Unknown subfeature: {0}")]
    UnknownSubfeature(String),

    #[error("Work queue is closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
