use serde::{Deserialize, Serialize};

use crate::monitoring::domain::backend_status::BackendStatus;
use crate::monitoring::domain::detection_summary::{DetectionLog, DetectionSummary};
use crate::shared::backend_error::BackendError;

/// `POST /mute/` acknowledgement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MuteAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub until: Option<String>,
}

/// `GET /mute/status` body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MuteStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub until: Option<String>,
}

/// Read side of the backend plus the mute and export actions.
pub trait BackendMonitor: Send {
    fn status(&self) -> Result<BackendStatus, BackendError>;

    fn summary(&self) -> Result<DetectionSummary, BackendError>;

    fn mute(&self) -> Result<MuteAck, BackendError>;

    fn mute_status(&self) -> Result<MuteStatus, BackendError>;

    /// CSV export of the backend's detection log. `Ok(None)` when the backend
    /// has nothing to export.
    fn export_csv(&self) -> Result<Option<Vec<u8>>, BackendError>;

    fn detection_log(&self) -> Result<DetectionLog, BackendError>;
}
