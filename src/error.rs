use thiserror::Error;

/// Shown when the request left but nothing came back.
pub const NO_RESPONSE_MESSAGE: &str = "No response from the API. Make sure FastAPI is running.";

/// Failure of a single analysis attempt. The `Display` output is exactly what the
/// UI shows in its error line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Server Error: {status} - {detail}")]
    Server { status: u16, detail: String },

    #[error("{}", NO_RESPONSE_MESSAGE)]
    NoResponse,

    #[error("Unexpected error: {0}")]
    Client(String),
}

impl AnalysisError {
    /// Classify a transport-level reqwest failure. Status errors never reach here
    /// because the client inspects the status itself.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            AnalysisError::Client(err.to_string())
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            AnalysisError::NoResponse
        } else {
            AnalysisError::Client(err.to_string())
        }
    }
}
