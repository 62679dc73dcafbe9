use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model server returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("could not read model response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("no stream is live")]
    NotLive,

    #[error("a stream is already live")]
    AlreadyLive,

    #[error("still generating the previous reaction")]
    Busy,

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("chat cannot change while a stream is live")]
    ChatLocked,

    #[error("no stored stream at index {0}")]
    NoSuchRecord(usize),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
