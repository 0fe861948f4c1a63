pub mod backend_endpoints;
pub mod backend_error;
pub mod cancellation;
pub mod constants;
pub mod detection;
pub mod frame;
pub mod frame_context;
pub mod http_support;
pub mod resolution;
