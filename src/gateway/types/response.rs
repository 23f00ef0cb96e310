//! API Response types
//!
//! FSPIOP routes answer with a bare status code. Operational routes use the
//! `ApiResponse<T>` wrapper.

use serde::Serialize;

use crate::dispatcher::DispatchStatsSnapshot;

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

/// Health check response data
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Registered routing keys, e.g. `alice-usd`
    pub endpoints: Vec<String>,
    pub dispatch: DispatchStatsSnapshot,
}
