use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Not connected to a database")]
    NotConnected,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database driver: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("BSON encode: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("BSON decode: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("Malformed result document: {0}")]
    Malformed(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Records before `record` that were already written stay in the collection.
    #[error("Import error at record {record} ({inserted} already inserted): {message}")]
    Import { record: usize, inserted: u64, message: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for BookError {
    fn from(e: std::io::Error) -> Self {
        BookError::Io(e.to_string())
    }
}
