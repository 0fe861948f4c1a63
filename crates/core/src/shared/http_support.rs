use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::shared::backend_error::BackendError;

const MAX_DETAIL_LEN: usize = 200;

/// Blocking client shared by every backend call.
pub fn build_client(base_url: &str, timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| BackendError::Transport {
            url: base_url.to_string(),
            source,
        })
}

/// Sends the request and turns non-2xx statuses into [`BackendError::Status`].
pub fn send(url: &str, request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send().map_err(|source| BackendError::Transport {
        url: url.to_string(),
        source,
    })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().ok().and_then(|body| error_detail(&body));
    Err(BackendError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        detail,
    })
}

pub fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, BackendError> {
    let body = response.text().map_err(|source| BackendError::Transport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|e| BackendError::InvalidBody {
        url: url.to_string(),
        message: e.to_string(),
    })
}

pub fn read_bytes(url: &str, response: Response) -> Result<Vec<u8>, BackendError> {
    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|source| BackendError::Transport {
            url: url.to_string(),
            source,
        })
}

/// Extracts `error` or `detail` from a JSON error body, falling back to the
/// raw text.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(body.chars().take(MAX_DETAIL_LEN).collect())
}
