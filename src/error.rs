use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodestashError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected server response: {0}")]
    Protocol(String),

    #[error("authorization denied in the browser")]
    Denied,

    #[error("device code expired, run login again")]
    Expired,

    #[error("device code expired before authorization completed, please retry login")]
    Timeout,

    #[error("login cancelled")]
    Cancelled,

    #[error("{0} not found")]
    NotFound(String),

    #[error("no active context; run `codestash init --folder <id> --collection <id>` first")]
    NoActiveContext,

    #[error("not in note scope; run `codestash note switch <id>` first")]
    NotInNoteScope,

    #[error("no active note selected")]
    NoActiveNote,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodestashError>;
