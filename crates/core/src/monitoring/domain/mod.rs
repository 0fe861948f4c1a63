pub mod alert_policy;
pub mod backend_monitor;
pub mod backend_status;
pub mod detection_summary;
pub mod mute_timer;
pub mod risk_level;
