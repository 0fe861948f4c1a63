pub mod activity_log;
pub mod cycle_error;
pub mod dashboard_state;
pub mod detection_history;
pub mod infrastructure;
pub mod live_detection_loop;
pub mod loop_state;
pub mod request_sequencer;
pub mod static_detection_use_case;
