//! API request and response types.

use crate::error::ErrorBody;
use crate::validation::Violation;
use serde::{Deserialize, Serialize};

pub use crate::service::SignupResponse;
pub use crate::validation::SignupForm;

/// Response for a form that failed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailureResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub violations: Vec<Violation>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub member_count: usize,
}
