use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::inference::domain::frame_encoder::EncodedFrame;
use crate::inference::domain::inference_client::{InferenceClient, InferenceError};
use crate::shared::http_support;
use crate::shared::backend_endpoints::BackendEndpoints;
use crate::shared::backend_error::BackendError;
use crate::shared::constants::UPLOAD_FIELD_NAME;
use crate::shared::detection::Detection;

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// `POST /detect/` with the frame as a single multipart file field.
pub struct HttpInferenceClient {
    client: Client,
    url: String,
}

impl HttpInferenceClient {
    pub fn new(endpoints: &BackendEndpoints, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_support::build_client(endpoints.base(), timeout)?,
            url: endpoints.detect(),
        })
    }
}

impl InferenceClient for HttpInferenceClient {
    fn submit(&self, frame: &EncodedFrame) -> Result<Vec<Detection>, InferenceError> {
        let part = Part::bytes(frame.bytes.clone())
            .file_name(frame.file_name.clone())
            .mime_str(&frame.mime_type)
            .map_err(|source| BackendError::Transport {
                url: self.url.clone(),
                source,
            })?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = http_support::send(&self.url, self.client.post(&self.url).multipart(form))?;
        let parsed: DetectResponse = http_support::read_json(&self.url, response)?;
        log::debug!(
            "Frame {} ({}): {} detections",
            frame.frame_index,
            frame.resolution,
            parsed.detections.len()
        );
        Ok(parsed.detections)
    }
}
