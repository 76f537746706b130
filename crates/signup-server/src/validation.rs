//! Sign-up form validation.
//!
//! Every rule runs and all violations are reported together. The WhatsApp
//! invitation rule depends on the membership answer, so it only runs once
//! that answer has been parsed.

use crate::domain::{RegistrationRequest, WhatsappMembership};
use crate::error::AppError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum age, in whole years, to sign up.
pub const MINIMUM_AGE: i32 = 18;

/// Bounds on the number of digits in a phone number.
pub const PHONE_MIN_DIGITS: usize = 8;
pub const PHONE_MAX_DIGITS: usize = 15;

/// Minimum name length after trimming.
pub const NAME_MIN_CHARS: usize = 2;

/// Form field names, as submitted.
pub mod field {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const DATE_OF_BIRTH: &str = "dateOfBirth";
    pub const WHATSAPP_MEMBERSHIP: &str = "isAlreadyInWhatsapp";
    pub const INVITE_OPT_IN: &str = "shouldInviteToWhatsapp";
    pub const UPDATES_OPT_IN: &str = "shouldReceiveUpdates";
}

const REQUIRED: &str = "Required";
const INVALID_EMAIL: &str = "Invalid email address";
const PHONE_TOO_SHORT: &str = "Phone number is too short";
const PHONE_TOO_LONG: &str = "Phone number is too long";
const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
const INVALID_DATE: &str = "Invalid date of birth";
const UNDERAGE: &str = "You must be at least 18 years old";
const MEMBERSHIP_REQUIRED: &str = "Please select if you are already in the WhatsApp group";
const INVITE_REQUIRED: &str =
    "You must agree to join the WhatsApp group if you're not already a member";
const EXPECTED_STRING: &str = "Expected a string";
const EXPECTED_BOOLEAN: &str = "Expected true or false";

/// Summary message for a failed validation.
pub const VALIDATION_MESSAGE: &str = "Please correct the highlighted fields";

/// A submitted field value, kept even when it has the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue<T> {
    Typed(T),
    Mistyped(serde_json::Value),
}

impl<T> FormValue<T> {
    /// The value, if it had the expected type.
    pub fn typed(&self) -> Option<&T> {
        match self {
            FormValue::Typed(v) => Some(v),
            FormValue::Mistyped(_) => None,
        }
    }
}

impl<T> From<T> for FormValue<T> {
    fn from(value: T) -> Self {
        FormValue::Typed(value)
    }
}

impl From<&str> for FormValue<String> {
    fn from(value: &str) -> Self {
        FormValue::Typed(value.to_string())
    }
}

/// Raw sign-up form as submitted by the client.
///
/// Every field is optional and accepts any JSON type, so a missing or
/// mistyped value becomes a violation rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub name: Option<FormValue<String>>,
    pub email: Option<FormValue<String>>,
    pub phone: Option<FormValue<String>>,
    pub date_of_birth: Option<FormValue<String>>,
    pub is_already_in_whatsapp: Option<FormValue<String>>,
    pub should_invite_to_whatsapp: Option<FormValue<bool>>,
    pub should_receive_updates: Option<FormValue<bool>>,
}

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

/// All violations found in a form, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Please correct the highlighted fields ({} violation(s))", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// First violation reported against `field`.
    pub fn for_field(&self, field: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

impl From<&ValidationErrors> for AppError {
    fn from(_: &ValidationErrors) -> Self {
        AppError::validation(VALIDATION_MESSAGE)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::from(&errors)
    }
}

/// Validate a form against today's UTC date.
pub fn validate(form: &SignupForm) -> Result<RegistrationRequest, ValidationErrors> {
    validate_at(form, Utc::now().date_naive())
}

/// Validate a form, computing age as of `today`.
pub fn validate_at(
    form: &SignupForm,
    today: NaiveDate,
) -> Result<RegistrationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = check_email(&form.email, &mut errors);
    let phone = check_phone(&form.phone, &mut errors);
    let name = check_name(&form.name, &mut errors);
    let date_of_birth = check_date_of_birth(&form.date_of_birth, today, &mut errors);
    let membership = check_membership(&form.is_already_in_whatsapp, &mut errors);
    let updates_opt_in = check_updates(&form.should_receive_updates, &mut errors);

    // A mistyped invite answer is reported here and skips the invite rule.
    let invite = flag(&form.should_invite_to_whatsapp, field::INVITE_OPT_IN, &mut errors);
    let invite_opt_in = match (membership, invite) {
        (Some(m), Some(v)) => check_invite(m, v, &mut errors),
        _ => None,
    };

    match (
        email,
        phone,
        name,
        date_of_birth,
        membership,
        invite_opt_in,
        updates_opt_in,
    ) {
        (
            Some(email),
            Some(phone),
            Some(name),
            Some(date_of_birth),
            Some(whatsapp_membership),
            Some(invite_opt_in),
            Some(updates_opt_in),
        ) if errors.is_empty() => Ok(RegistrationRequest {
            name,
            email,
            phone,
            date_of_birth,
            whatsapp_membership,
            invite_opt_in,
            updates_opt_in,
        }),
        _ => Err(errors),
    }
}

/// Resolve a text field: `None` if it was mistyped (already reported),
/// otherwise the value if present.
fn text<'a>(
    value: &'a Option<FormValue<String>>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Option<&'a str>> {
    match value {
        None => Some(None),
        Some(FormValue::Typed(v)) => Some(Some(v.as_str())),
        Some(FormValue::Mistyped(_)) => {
            errors.push(field, EXPECTED_STRING);
            None
        }
    }
}

/// Resolve a checkbox field, like [`text`].
fn flag(
    value: &Option<FormValue<bool>>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Option<bool>> {
    match value {
        None => Some(None),
        Some(FormValue::Typed(v)) => Some(Some(*v)),
        Some(FormValue::Mistyped(_)) => {
            errors.push(field, EXPECTED_BOOLEAN);
            None
        }
    }
}

fn check_email(value: &Option<FormValue<String>>, errors: &mut ValidationErrors) -> Option<String> {
    let Some(value) = text(value, field::EMAIL, errors)? else {
        errors.push(field::EMAIL, REQUIRED);
        return None;
    };

    let email = value.trim();
    if !validator::validate_email(email) {
        errors.push(field::EMAIL, INVALID_EMAIL);
        return None;
    }
    Some(email.to_string())
}

fn check_phone(value: &Option<FormValue<String>>, errors: &mut ValidationErrors) -> Option<String> {
    let Some(value) = text(value, field::PHONE, errors)? else {
        errors.push(field::PHONE, REQUIRED);
        return None;
    };

    let digits = phone_digits(value).len();
    if digits < PHONE_MIN_DIGITS {
        errors.push(field::PHONE, PHONE_TOO_SHORT);
        return None;
    }
    if digits > PHONE_MAX_DIGITS {
        errors.push(field::PHONE, PHONE_TOO_LONG);
        return None;
    }
    Some(value.to_string())
}

fn check_name(value: &Option<FormValue<String>>, errors: &mut ValidationErrors) -> Option<String> {
    let Some(value) = text(value, field::NAME, errors)? else {
        errors.push(field::NAME, REQUIRED);
        return None;
    };

    let name = value.trim();
    if name.chars().count() < NAME_MIN_CHARS {
        errors.push(field::NAME, NAME_TOO_SHORT);
        return None;
    }
    Some(name.to_string())
}

fn check_date_of_birth(
    value: &Option<FormValue<String>>,
    today: NaiveDate,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let Some(value) = text(value, field::DATE_OF_BIRTH, errors)? else {
        errors.push(field::DATE_OF_BIRTH, REQUIRED);
        return None;
    };

    let Some(date_of_birth) = parse_date(value) else {
        errors.push(field::DATE_OF_BIRTH, INVALID_DATE);
        return None;
    };

    if age_on(date_of_birth, today) < MINIMUM_AGE {
        errors.push(field::DATE_OF_BIRTH, UNDERAGE);
        return None;
    }
    Some(date_of_birth)
}

fn check_membership(
    value: &Option<FormValue<String>>,
    errors: &mut ValidationErrors,
) -> Option<WhatsappMembership> {
    let value = text(value, field::WHATSAPP_MEMBERSHIP, errors)?;
    let membership = value.and_then(WhatsappMembership::parse);
    if membership.is_none() {
        errors.push(field::WHATSAPP_MEMBERSHIP, MEMBERSHIP_REQUIRED);
    }
    membership
}

fn check_updates(value: &Option<FormValue<bool>>, errors: &mut ValidationErrors) -> Option<bool> {
    let value = flag(value, field::UPDATES_OPT_IN, errors)?;
    if value.is_none() {
        errors.push(field::UPDATES_OPT_IN, REQUIRED);
    }
    value
}

/// Non-members must agree to be invited; members may leave the box unset.
fn check_invite(
    membership: WhatsappMembership,
    value: Option<bool>,
    errors: &mut ValidationErrors,
) -> Option<bool> {
    match membership {
        WhatsappMembership::AlreadyMember => Some(value.unwrap_or(false)),
        WhatsappMembership::NotMember if value == Some(true) => Some(true),
        WhatsappMembership::NotMember => {
            errors.push(field::INVITE_OPT_IN, INVITE_REQUIRED);
            None
        }
    }
}

/// The ASCII digits of a phone number, punctuation and spaces dropped.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Parse `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Whole years between `date_of_birth` and `today`.
///
/// The year only counts once the birthday has been reached; a 29 February
/// birthday is reached on 1 March in non-leap years.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}
