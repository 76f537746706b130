//! Registration: duplicate check, then insert.

use crate::domain::RegistrationRequest;
use crate::error::{AppError, ErrorBody, ErrorCode};
use member_store::{MemberRecord, MemberStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const SUCCESS_MESSAGE: &str = "You have been successfully signed up.";
pub const DUPLICATE_MESSAGE: &str =
    "A user with this email or phone number is already registered";
pub const UNKNOWN_MESSAGE: &str = "An unexpected error occurred";

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new member was stored.
    Registered {
        member: MemberRecord,
        message: String,
    },
    /// Email or phone already registered; nothing stored.
    Duplicate(AppError),
    /// The store failed; nothing stored.
    Unknown(AppError),
}

impl RegistrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RegistrationOutcome::Registered { .. })
    }

    /// The error for a failed outcome.
    pub fn error(&self) -> Option<&AppError> {
        match self {
            RegistrationOutcome::Registered { .. } => None,
            RegistrationOutcome::Duplicate(e) | RegistrationOutcome::Unknown(e) => Some(e),
        }
    }

    /// HTTP status for this outcome.
    pub fn status_code(&self) -> u16 {
        self.error().map(|e| e.status_code).unwrap_or(200)
    }

    /// Caller-facing shape of this outcome.
    pub fn into_response(self) -> SignupResponse {
        match self {
            RegistrationOutcome::Registered { message, .. } => SignupResponse::success(message),
            RegistrationOutcome::Duplicate(e) | RegistrationOutcome::Unknown(e) => {
                SignupResponse::failure(&e)
            }
        }
    }
}

/// `{ success: true, message }` or `{ success: false, error: { message, code } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl SignupResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: &AppError) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.body()),
        }
    }

    /// Error code of a failed response.
    pub fn code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Creates member records for validated sign-ups.
///
/// The lookup is only a pre-check: two identical sign-ups racing each other
/// can both pass it, and the store's own uniqueness check then rejects the
/// second insert, which is reported as a duplicate.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn MemberStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn MemberStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn MemberStore> {
        &self.store
    }

    /// Register a validated sign-up. Performs at most one insert.
    pub async fn register(&self, request: RegistrationRequest) -> RegistrationOutcome {
        info!(email = %request.email, "Registration request received");

        match self
            .store
            .find_by_email_or_phone(&request.email, &request.phone)
            .await
        {
            Ok(Some(existing)) => {
                warn!(
                    email = %request.email,
                    existing_member = %existing.id,
                    "Sign-up rejected, email or phone already registered"
                );
                return RegistrationOutcome::Duplicate(AppError::duplicate(DUPLICATE_MESSAGE));
            }
            Ok(None) => {}
            Err(e) => return unknown(e),
        }

        match self.store.insert(request.to_new_member()).await {
            Ok(member) => {
                info!(member_id = %member.id, "Member registered");
                RegistrationOutcome::Registered {
                    member,
                    message: SUCCESS_MESSAGE.to_string(),
                }
            }
            Err(StoreError::UniqueViolation(field)) => {
                warn!(
                    email = %request.email,
                    %field,
                    "Insert rejected by store uniqueness check"
                );
                RegistrationOutcome::Duplicate(AppError::duplicate(DUPLICATE_MESSAGE))
            }
            Err(e) => unknown(e),
        }
    }
}

fn unknown(e: StoreError) -> RegistrationOutcome {
    error!("Registration failed: {}", e);

    let message = e.to_string();
    let message = if message.trim().is_empty() {
        UNKNOWN_MESSAGE.to_string()
    } else {
        message
    };
    RegistrationOutcome::Unknown(AppError::unknown(message))
}
