use std::time::Duration;

use reqwest::blocking::Client;

use crate::monitoring::domain::backend_monitor::{BackendMonitor, MuteAck, MuteStatus};
use crate::monitoring::domain::backend_status::BackendStatus;
use crate::monitoring::domain::detection_summary::{DetectionLog, DetectionSummary};
use crate::shared::backend_endpoints::BackendEndpoints;
use crate::shared::backend_error::BackendError;
use crate::shared::http_support;

pub struct HttpBackendMonitor {
    client: Client,
    endpoints: BackendEndpoints,
}

impl HttpBackendMonitor {
    pub fn new(endpoints: BackendEndpoints, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_support::build_client(endpoints.base(), timeout)?,
            endpoints,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        let response = http_support::send(url, self.client.get(url))?;
        http_support::read_json(url, response)
    }
}

impl BackendMonitor for HttpBackendMonitor {
    fn status(&self) -> Result<BackendStatus, BackendError> {
        self.get_json(&self.endpoints.status())
    }

    fn summary(&self) -> Result<DetectionSummary, BackendError> {
        self.get_json(&self.endpoints.summary())
    }

    fn mute(&self) -> Result<MuteAck, BackendError> {
        let url = self.endpoints.mute();
        let response = http_support::send(&url, self.client.post(&url))?;
        http_support::read_json(&url, response)
    }

    fn mute_status(&self) -> Result<MuteStatus, BackendError> {
        self.get_json(&self.endpoints.mute_status())
    }

    fn export_csv(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let url = self.endpoints.export();
        match http_support::send(&url, self.client.get(&url)) {
            Ok(response) => http_support::read_bytes(&url, response).map(Some),
            Err(BackendError::Status { status, detail, .. }) if (400..500).contains(&status) => {
                log::info!(
                    "Nothing to export: {}",
                    detail.as_deref().unwrap_or("empty log")
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn detection_log(&self) -> Result<DetectionLog, BackendError> {
        self.get_json(&self.endpoints.detection_log())
    }
}
