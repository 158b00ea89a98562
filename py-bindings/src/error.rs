/// Errors raised while setting up the extension's native side.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid log filter `{filter}`: {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("logging already initialized by another logger")]
    LoggerAlreadySet,
}
