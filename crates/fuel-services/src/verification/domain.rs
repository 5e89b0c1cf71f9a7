use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the customer being verified (UUID formatted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Ten digit Saudi national or resident id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId(pub String);

/// Identifier of a single Nafath confirmation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl NationalId {
    /// Digits of the id, used by the simulated providers to derive stable values.
    pub fn digits(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.chars().filter_map(|c| c.to_digit(10))
    }
}

/// Lifecycle of a Nafath confirmation: `pending -> waiting -> {verified | rejected | expired}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Pending,
    Waiting,
    Verified,
    Rejected,
    Expired,
}

impl IdentityStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Rejected | Self::Expired)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

/// Severity scale shared by every screening sub-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Politically exposed person classification reported by the screening provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PepExposure {
    /// Family member or close associate of a PEP.
    Associate,
    Domestic,
    SeniorForeign,
}

impl PepExposure {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            Self::Associate => RiskLevel::Medium,
            Self::Domestic => RiskLevel::High,
            Self::SeniorForeign => RiskLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Defaulter,
}

impl RiskCategory {
    /// Categories that are never approved for installment credit.
    pub const fn is_adverse(self) -> bool {
        matches!(self, Self::Poor | Self::Defaulter)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Defaulter => "defaulter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployerType {
    Government,
    SemiGovernment,
    PrivateLarge,
    PrivateSme,
    SelfEmployed,
    Freelancer,
    Unemployed,
}

impl EmployerType {
    /// Whether the type represents payroll employment reported through GOSI.
    pub const fn is_salaried(self) -> bool {
        matches!(
            self,
            Self::Government | Self::SemiGovernment | Self::PrivateLarge | Self::PrivateSme
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Government => "government",
            Self::SemiGovernment => "semi_government",
            Self::PrivateLarge => "private_large",
            Self::PrivateSme => "private_sme",
            Self::SelfEmployed => "self_employed",
            Self::Freelancer => "freelancer",
            Self::Unemployed => "unemployed",
        }
    }
}

/// Installment tier. Declared from lowest to highest so `Ord` follows the bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Blocked,
    Restricted,
    Standard,
    High,
    Premium,
}

impl PriorityLevel {
    pub const fn max_installment_months(self) -> u8 {
        match self {
            Self::Premium => 12,
            Self::High => 6,
            Self::Standard => 3,
            Self::Restricted => 1,
            Self::Blocked => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::High => "high",
            Self::Standard => "standard",
            Self::Restricted => "restricted",
            Self::Blocked => "blocked",
        }
    }
}

/// Hard veto recorded on a rating when screening matched a blocking list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VetoReason {
    SanctionsMatch,
    WantedListMatch,
}

/// Persisted Nafath confirmation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityVerification {
    pub request_id: RequestId,
    pub user_id: UserId,
    pub national_id: NationalId,
    pub transaction_id: String,
    pub random_code: String,
    pub status: IdentityStatus,
    pub verified_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age_verified: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl IdentityVerification {
    pub fn result(&self) -> IdentityResult {
        IdentityResult {
            request_id: self.request_id.clone(),
            user_id: self.user_id.clone(),
            status: self.status,
            verified: self.status == IdentityStatus::Verified,
            verified_name: self.verified_name.clone(),
            date_of_birth: self.date_of_birth,
            age_verified: self.age_verified,
            random_code: self.random_code.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Identity outcome returned to callers and consumed by the rating pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResult {
    pub request_id: RequestId,
    pub user_id: UserId,
    pub status: IdentityStatus,
    pub verified: bool,
    pub verified_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age_verified: bool,
    pub random_code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeVerification {
    pub age_verified: bool,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub id: String,
    pub user_id: UserId,
    pub national_id: NationalId,
    pub is_passed: bool,
    pub risk_level: RiskLevel,
    pub pep_status: bool,
    pub sanctions_match: bool,
    pub wanted_list_match: bool,
    pub checked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ComplianceResult {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Matches that force a blocked rating regardless of any other score.
    pub fn veto(&self) -> Option<VetoReason> {
        if self.sanctions_match {
            Some(VetoReason::SanctionsMatch)
        } else if self.wanted_list_match {
            Some(VetoReason::WantedListMatch)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReport {
    pub id: String,
    pub user_id: UserId,
    pub national_id: NationalId,
    pub score: u16,
    pub total_debts: f64,
    pub active_loans: u32,
    pub delayed_payments: u32,
    pub defaulted_loans: u32,
    pub credit_utilization: f64,
    pub risk_category: RiskCategory,
    pub recommended_limit: f64,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CreditReport {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Answer to a financing request for a specific amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDecision {
    pub approved: bool,
    pub max_amount: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultStatus {
    pub has_defaults: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentRecord {
    pub user_id: UserId,
    pub national_id: NationalId,
    pub employer_name: Option<String>,
    pub employer_type: EmployerType,
    pub monthly_salary: f64,
    pub is_verified: bool,
    pub gosi_registered: bool,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentPriority {
    pub employment_score: u8,
}

/// The single stored rating per customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRating {
    pub user_id: UserId,
    pub overall_score: u8,
    pub nafath_verified: bool,
    pub kyc_passed: bool,
    pub credit_approved: bool,
    pub age_verified: bool,
    pub is_employee: bool,
    pub identity_score: u8,
    pub employment_score: u8,
    pub credit_score: u8,
    pub compliance_score: u8,
    pub priority_level: PriorityLevel,
    pub recommended_credit_limit: f64,
    pub max_installment_months: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub veto: Option<VetoReason>,
    pub last_updated: DateTime<Utc>,
}

impl CustomerRating {
    pub fn eligibility(&self) -> EligibilityView {
        EligibilityView {
            eligible: self.priority_level != PriorityLevel::Blocked && self.kyc_passed,
            priority_level: self.priority_level,
            max_installment_months: self.max_installment_months,
            recommended_credit_limit: self.recommended_credit_limit,
        }
    }
}

/// Fast-path answer derived from the stored rating only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityView {
    pub eligible: bool,
    pub priority_level: PriorityLevel,
    pub max_installment_months: u8,
    pub recommended_credit_limit: f64,
}
