use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend uptime: seconds from newer backends, a preformatted string from
/// older ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Uptime {
    Seconds(f64),
    Text(String),
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uptime::Seconds(secs) => {
                let total = secs.max(0.0).round() as u64;
                let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
                if h > 0 {
                    write!(f, "{h}h {m:02}m {s:02}s")
                } else if m > 0 {
                    write!(f, "{m}m {s:02}s")
                } else {
                    write!(f, "{s}s")
                }
            }
            Uptime::Text(text) => f.write_str(text),
        }
    }
}

/// `GET /status` body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub ram: f64,
    #[serde(default, alias = "model")]
    pub model_name: Option<String>,
    #[serde(default)]
    pub uptime: Option<Uptime>,
    #[serde(default)]
    pub detections_logged: Option<u64>,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPU {:.1}% | RAM {:.1}%", self.cpu, self.ram)?;
        if let Some(model) = &self.model_name {
            write!(f, " | model {model}")?;
        }
        if let Some(uptime) = &self.uptime {
            write!(f, " | up {uptime}")?;
        }
        if let Some(logged) = self.detections_logged {
            write!(f, " | {logged} logged")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_backend_with_model_alias() {
        let status: BackendStatus = serde_json::from_str(
            r#"{"uptime": 3725, "cpu": 12.5, "ram": 40.1, "model": "best.pt", "detections_logged": 7}"#,
        )
        .unwrap();

        assert_eq!(status.model_name.as_deref(), Some("best.pt"));
        assert_eq!(status.uptime, Some(Uptime::Seconds(3725.0)));
        assert_eq!(status.detections_logged, Some(7));
    }

    #[test]
    fn test_parses_minimal_body_with_string_uptime() {
        let status: BackendStatus =
            serde_json::from_str(r#"{"cpu": 1, "ram": 2, "model_name": "yolo", "uptime": "2h"}"#)
                .unwrap();

        assert_eq!(status.model_name.as_deref(), Some("yolo"));
        assert_eq!(status.uptime, Some(Uptime::Text("2h".into())));
        assert_eq!(status.detections_logged, None);
    }

    #[rstest]
    #[case(42.0, "42s")]
    #[case(125.0, "2m 05s")]
    #[case(3725.0, "1h 02m 05s")]
    fn test_uptime_display(#[case] secs: f64, #[case] expected: &str) {
        assert_eq!(Uptime::Seconds(secs).to_string(), expected);
    }

    #[test]
    fn test_display_skips_missing_fields() {
        let status = BackendStatus {
            cpu: 10.0,
            ram: 20.0,
            model_name: None,
            uptime: None,
            detections_logged: None,
        };
        assert_eq!(status.to_string(), "CPU 10.0% | RAM 20.0%");
    }
}
