use thiserror::Error;

/// Failure talking to the detection backend.
///
/// None of these are fatal to a capture loop: the caller skips the update
/// and carries on.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        url: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("unexpected response from {url}: {message}")]
    InvalidBody { url: String, message: String },
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}
