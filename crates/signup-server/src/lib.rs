//! Supporters' club sign-up server.
//!
//! Validates membership sign-up forms and registers applicants, refusing
//! any email or phone number that is already on the member list.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod telemetry;
pub mod validation;

pub use config::Config;
pub use domain::{RegistrationRequest, WhatsappMembership};
pub use error::{AppError, ErrorCode};
pub use service::{RegistrationOutcome, RegistrationService, SignupResponse};
pub use validation::{validate, validate_at, FormValue, SignupForm, ValidationErrors, Violation};
