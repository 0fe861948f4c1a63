//! Client core for a remote mask-detection service: frame capture,
//! inference requests, box annotation and backend monitoring.

pub mod annotation;
pub mod capture;
pub mod inference;
pub mod monitoring;
pub mod pipeline;
pub mod shared;

#[cfg(test)]
mod test_support;
