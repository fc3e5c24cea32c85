use thiserror::Error;

/// Failures while retrieving or parsing the calendar feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(u16),

    #[error("malformed feed: {0}")]
    Parse(String),
}

/// Failures reading or writing the stored snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("chat client is not connected")]
    NotConnected,

    #[error("invalid channel id: {0}")]
    InvalidChannel(String),

    #[error("discord error: {0}")]
    Discord(String),
}

/// Everything that can abort one check cycle, tagged by stage.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl CycleError {
    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Persist(_) => "storage",
            CycleError::Delivery(_) => "delivery",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("config file {path}: {reason}")]
    File { path: String, reason: String },
}
