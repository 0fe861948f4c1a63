use crate::shared::constants::{
    DETECTION_LOG_PATH, DETECT_PATH, EXPORT_PATH, MUTE_PATH, MUTE_STATUS_PATH, STATUS_PATH,
    SUMMARY_PATH,
};

/// Absolute URLs for every backend route, derived from one base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendEndpoints {
    base: String,
}

impl BackendEndpoints {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let base = base_url.trim().trim_end_matches('/');
        let host = base
            .strip_prefix("http://")
            .or_else(|| base.strip_prefix("https://"))
            .ok_or_else(|| {
                format!("API URL must start with http:// or https://, got '{base_url}'")
            })?;
        if host.is_empty() {
            return Err(format!("API URL has no host: '{base_url}'"));
        }
        Ok(Self {
            base: base.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn detect(&self) -> String {
        self.join(DETECT_PATH)
    }

    pub fn status(&self) -> String {
        self.join(STATUS_PATH)
    }

    pub fn summary(&self) -> String {
        self.join(SUMMARY_PATH)
    }

    pub fn mute(&self) -> String {
        self.join(MUTE_PATH)
    }

    pub fn mute_status(&self) -> String {
        self.join(MUTE_STATUS_PATH)
    }

    pub fn export(&self) -> String {
        self.join(EXPORT_PATH)
    }

    pub fn detection_log(&self) -> String {
        self.join(DETECTION_LOG_PATH)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://127.0.0.1:8000")]
    #[case("http://127.0.0.1:8000/")]
    #[case("  http://127.0.0.1:8000//  ")]
    fn test_trailing_slashes_are_normalized(#[case] base: &str) {
        let endpoints = BackendEndpoints::new(base).unwrap();
        assert_eq!(endpoints.detect(), "http://127.0.0.1:8000/detect/");
        assert_eq!(endpoints.status(), "http://127.0.0.1:8000/status");
    }

    #[test]
    fn test_all_routes() {
        let e = BackendEndpoints::new("https://masks.example.org/api").unwrap();
        assert_eq!(e.summary(), "https://masks.example.org/api/summary");
        assert_eq!(e.mute(), "https://masks.example.org/api/mute/");
        assert_eq!(e.mute_status(), "https://masks.example.org/api/mute/status");
        assert_eq!(e.export(), "https://masks.example.org/api/export");
        assert_eq!(
            e.detection_log(),
            "https://masks.example.org/api/detections/log"
        );
    }

    #[rstest]
    #[case::no_scheme("127.0.0.1:8000")]
    #[case::ftp("ftp://host")]
    #[case::no_host("http://")]
    #[case::empty("")]
    fn test_invalid_base_is_rejected(#[case] base: &str) {
        assert!(BackendEndpoints::new(base).is_err());
    }
}
