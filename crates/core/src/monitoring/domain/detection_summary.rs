use serde::{Deserialize, Serialize};

use crate::monitoring::domain::risk_level::RiskLevel;

/// `GET /summary` body: backend-wide per-class counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    #[serde(default)]
    pub with_mask: u64,
    #[serde(default)]
    pub no_mask: u64,
    #[serde(default)]
    pub incorrect: u64,
    #[serde(default)]
    pub risk_score: f64,
}

impl DetectionSummary {
    pub fn total(&self) -> u64 {
        self.with_mask + self.no_mask + self.incorrect
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// One entry of `GET /detections/log`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedDetection {
    pub timestamp: String,
    pub label: String,
    pub confidence: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionLog {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub logs: Vec<LoggedDetection>,
}
