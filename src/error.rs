//! Error types shared by the analyzer core and its collaborators.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Errors surfaced to the UI layer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The vision service call failed (network, auth, quota). Never retried.
    #[error("vision service request failed: {0}")]
    RemoteAnalysis(String),

    /// The vision service answered, but not in a shape we can use.
    #[error("malformed vision service response: {0}")]
    MalformedResponse(String),

    /// A selection index does not point into the region list.
    #[error("selection index {index} is out of range for {len} detected regions")]
    InvalidSelection {
        /// The offending index
        index: usize,
        /// Number of regions that were available
        len: usize,
    },

    /// The browser sent a form we cannot interpret.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Decoding the upload or encoding the annotated image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzerError::RemoteAnalysis(err.to_string())
    }
}

impl AnalyzerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyzerError::RemoteAnalysis(_) | AnalyzerError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AnalyzerError::InvalidSelection { .. }
            | AnalyzerError::InvalidRequest(_)
            | AnalyzerError::Image(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AnalyzerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log::error!("❌ {}", self);
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
