use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Why a handler refused or failed a message. Logged as the `reason` field; the user sees a reply instead.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Remote API failure: {0}")]
    RemoteApi(String),
}

pub type Result<T> = std::result::Result<T, DbotError>;
