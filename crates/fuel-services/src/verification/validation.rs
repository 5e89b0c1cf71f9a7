//! Request schemas for the verification endpoints.
//!
//! Bodies are deserialized loosely (every field optional) and then checked here
//! so that a single response can list every offending field.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{NationalId, RequestId, UserId};

pub const DEFAULT_REQUESTED_AMOUNT: f64 = 1000.0;

/// One failed rule, reported back to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid request ({} field error(s))", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

fn national_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[12]\d{9}$").expect("national id pattern compiles"))
}

/// Accepts any UUID notation and normalizes it to the lowercase hyphenated form.
pub fn parse_user_id(field: &str, raw: &str) -> Result<UserId, FieldError> {
    Uuid::parse_str(raw.trim())
        .map(|uuid| UserId(uuid.hyphenated().to_string()))
        .map_err(|_| FieldError::new(field, "user id must be a valid UUID"))
}

pub fn parse_national_id(field: &str, raw: &str) -> Result<NationalId, FieldError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() != 10 {
        return Err(FieldError::new(field, "national id must be exactly 10 digits"));
    }
    if !national_id_pattern().is_match(trimmed) {
        return Err(FieldError::new(
            field,
            "national id must contain only digits and start with 1 or 2",
        ));
    }
    Ok(NationalId(trimmed.to_string()))
}

fn required<'a>(
    field: &str,
    value: &'a Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match value.as_deref() {
        Some(raw) => Some(raw),
        None => {
            errors.push(FieldError::new(field, "field is required"));
            None
        }
    }
}

fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    result.map_err(|error| errors.push(error)).ok()
}

/// `{userId, nationalId}` as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectBody {
    pub user_id: Option<String>,
    pub national_id: Option<String>,
}

/// Validated customer reference used by every `{userId, nationalId}` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRequest {
    pub user_id: UserId,
    pub national_id: NationalId,
}

impl SubjectBody {
    pub fn validate(self) -> Result<SubjectRequest, ValidationErrors> {
        let mut errors = Vec::new();

        let user_id = required("userId", &self.user_id, &mut errors)
            .and_then(|raw| collect(parse_user_id("userId", raw), &mut errors));
        let national_id = required("nationalId", &self.national_id, &mut errors)
            .and_then(|raw| collect(parse_national_id("nationalId", raw), &mut errors));

        match (user_id, national_id) {
            (Some(user_id), Some(national_id)) if errors.is_empty() => Ok(SubjectRequest {
                user_id,
                national_id,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateBody {
    pub request_id: Option<String>,
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateRequest {
    pub request_id: RequestId,
    pub approved: bool,
}

impl SimulateBody {
    pub fn validate(self) -> Result<SimulateRequest, ValidationErrors> {
        let mut errors = Vec::new();

        let request_id = match self.request_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(RequestId(raw.to_string())),
            _ => {
                errors.push(FieldError::new("requestId", "request id is required"));
                None
            }
        };
        if self.approved.is_none() {
            errors.push(FieldError::new("approved", "field is required"));
        }

        match (request_id, self.approved) {
            (Some(request_id), Some(approved)) => Ok(SimulateRequest {
                request_id,
                approved,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditEvaluateBody {
    pub user_id: Option<String>,
    pub requested_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreditEvaluateRequest {
    pub user_id: UserId,
    pub requested_amount: f64,
}

impl CreditEvaluateBody {
    pub fn validate(self) -> Result<CreditEvaluateRequest, ValidationErrors> {
        let mut errors = Vec::new();

        let user_id = required("userId", &self.user_id, &mut errors)
            .and_then(|raw| collect(parse_user_id("userId", raw), &mut errors));

        let requested_amount = self.requested_amount.unwrap_or(DEFAULT_REQUESTED_AMOUNT);
        if !(requested_amount.is_finite() && requested_amount > 0.0) {
            errors.push(FieldError::new(
                "requestedAmount",
                "requested amount must be a positive number",
            ));
        }

        match user_id {
            Some(user_id) if errors.is_empty() => Ok(CreditEvaluateRequest {
                user_id,
                requested_amount,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "6f1c2b9e-8d4a-4c3e-9a57-0d2f1e6b7c80";

    #[test]
    fn national_id_must_be_ten_digits_starting_with_one_or_two() {
        assert!(parse_national_id("nationalId", "1234567890").is_ok());
        assert!(parse_national_id("nationalId", "2234567890").is_ok());

        let short = parse_national_id("nationalId", "123456789").unwrap_err();
        assert!(short.message.contains("exactly 10"));

        let wrong_prefix = parse_national_id("nationalId", "3234567890").unwrap_err();
        assert!(wrong_prefix.message.contains("start with 1 or 2"));

        assert!(parse_national_id("nationalId", "12345678a0").is_err());
    }

    #[test]
    fn user_ids_are_normalized() {
        let parsed = parse_user_id("userId", &USER.to_uppercase()).expect("uuid parses");
        assert_eq!(parsed, UserId(USER.to_string()));
        assert!(parse_user_id("userId", "user-1").is_err());
    }

    #[test]
    fn subject_body_reports_every_invalid_field() {
        let body = SubjectBody {
            user_id: Some("nope".to_string()),
            national_id: None,
        };

        let errors = body.validate().unwrap_err().errors;
        let fields: Vec<_> = errors.iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["userId", "nationalId"]);
    }

    #[test]
    fn credit_evaluation_defaults_requested_amount() {
        let request = CreditEvaluateBody {
            user_id: Some(USER.to_string()),
            requested_amount: None,
        }
        .validate()
        .expect("valid body");
        assert_eq!(request.requested_amount, DEFAULT_REQUESTED_AMOUNT);

        let negative = CreditEvaluateBody {
            user_id: Some(USER.to_string()),
            requested_amount: Some(-5.0),
        }
        .validate()
        .unwrap_err();
        assert_eq!(negative.errors[0].field, "requestedAmount");
    }

    #[test]
    fn simulate_body_requires_request_id_and_decision() {
        let errors = SimulateBody {
            request_id: Some("   ".to_string()),
            approved: None,
        }
        .validate()
        .unwrap_err()
        .errors;
        assert_eq!(errors.len(), 2);
    }
}
