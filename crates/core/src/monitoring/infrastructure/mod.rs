pub mod http_backend_monitor;
pub mod status_poller;
