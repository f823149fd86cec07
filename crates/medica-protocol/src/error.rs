/// Errors returned by backend transport implementations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Request never produced a response (connect failure, timeout, IO).
    #[error("transport error: {0}")]
    Transport(String),
    /// Backend answered with a non-success status.
    #[error("backend rejected request: status {code}")]
    Status {
        code: u16,
        /// Parsed `detail` field from the rejection body, when present.
        detail: Option<String>,
    },
    /// Response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Backend-provided detail message for a rejection, when any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
