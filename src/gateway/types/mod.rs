//! Gateway types module

pub mod response;

pub use response::{ApiResponse, HealthResponse};
