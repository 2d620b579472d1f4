use thiserror::Error;

/// Error surface shared by all backend clients. The pipeline never branches
/// on the variant, only on where the error occurred, so the variants exist
/// for message quality rather than recovery logic.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response from backend: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Turn a non-success response into a `Status` error, consuming the body
    /// for the message.
    pub(crate) async fn from_response(response: reqwest::Response) -> SourceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        SourceError::Status { status, body }
    }
}
