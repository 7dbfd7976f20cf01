/// Errors that can occur when talking to a media player handle
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    /// The embed rejected or failed a control call
    #[error("Failed to control player: {0}")]
    ControlFailed(String),

    /// The embed does not support the requested operation
    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),
}
