use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Feed connection errors.
///
/// None of these are fatal: the reconnecting stream backs off and retries.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("feed is not connected")]
    NotConnected,
}

/// A single inbound frame that could not be turned into a trade.
///
/// The frame is dropped and the stream keeps going.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field {field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unexpected event type {0:?}")]
    UnexpectedEvent(String),

    /// An id or timestamp too large for the store's signed 64-bit columns.
    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be opened or reset at startup.
    #[error("storage initialization failed: {0}")]
    Init(String),

    #[error("database not found: {0}")]
    NotFound(String),

    #[error("connection pool error: {0}")]
    Pool(String),

    /// A batch transaction failed and none of its rows are visible.
    #[error("batch commit failed: {0}")]
    Commit(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("{field} value {value} does not fit the target type")]
    OutOfRange { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}

impl Error {
    /// True for errors that must stop the process: the store could not be
    /// initialized or the configuration is unusable.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Storage(StorageError::Init(_))
        )
    }
}
