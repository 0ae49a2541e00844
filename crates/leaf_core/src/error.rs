use thiserror::Error;

/// A file the user picked that cannot be submitted.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("`{name}` is not an image")]
    NotAnImage { name: String },
    #[error("cannot read `{name}`: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure talking to the diagnosis service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server address `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request worker stopped without a reply")]
    WorkerStopped,
}
