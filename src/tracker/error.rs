use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("health data is not available on this device")]
    PlatformUnavailable,
    #[error("step count access denied: {0}")]
    AuthorizationDenied(String),
    #[error("step tracker has stopped")]
    Stopped,
}
