//! Contact form and quick consultation leads.
//!
//! Both forms are validated, logged and acknowledged. Logging is their only
//! side effect; they never touch the content store.

use crate::i18n::{Language, LanguageStrings};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required contact fields are missing")]
    MissingContactFields,

    #[error("neither phone nor email was provided")]
    MissingPhoneOrEmail,

    #[error("email address is malformed")]
    InvalidEmail,
}

impl ValidationError {
    /// The message shown to the visitor.
    pub fn localized(self, strings: &LanguageStrings) -> &'static str {
        match self {
            ValidationError::MissingContactFields => strings.contact_required_fields,
            ValidationError::MissingPhoneOrEmail => strings.quick_consultation_required,
            ValidationError::InvalidEmail => strings.invalid_email,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Language for the response message; canonical if absent
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuickConsultationRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Response language: the explicit field, else the request headers' choice.
pub fn response_language(explicit: Option<&str>, negotiated: Language) -> Language {
    explicit
        .and_then(|code| Language::from_code(code).ok())
        .unwrap_or(negotiated)
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email))
}

/// Trimmed value, or `None` if absent or blank.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validate a contact form: name, email and phone are required.
pub fn validate_contact(request: &ContactRequest) -> Result<(), ValidationError> {
    let (Some(_), Some(email), Some(_)) = (
        present(&request.name),
        present(&request.email),
        present(&request.phone),
    ) else {
        return Err(ValidationError::MissingContactFields);
    };

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validate a quick consultation: phone or email, and a well-formed email
/// when one is given.
pub fn validate_quick_consultation(
    request: &QuickConsultationRequest,
) -> Result<(), ValidationError> {
    let phone = present(&request.phone);
    let email = present(&request.email);

    if phone.is_none() && email.is_none() {
        return Err(ValidationError::MissingPhoneOrEmail);
    }
    if let Some(email) = email {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
    }
    Ok(())
}

pub fn log_contact(request: &ContactRequest) {
    info!(
        contact_name = present(&request.name),
        email = present(&request.email),
        phone = present(&request.phone),
        company = present(&request.company),
        plan = present(&request.plan),
        lead_message = present(&request.message),
        timestamp = %Utc::now().to_rfc3339(),
        "New contact request"
    );
}

pub fn log_quick_consultation(request: &QuickConsultationRequest) {
    info!(
        phone = present(&request.phone),
        email = present(&request.email),
        source = "hero_cta_button",
        offer = "discount_20_percent_today",
        timestamp = %Utc::now().to_rfc3339(),
        "New quick consultation request"
    );
}
