use chrono::{DateTime, Utc};

use super::domain::{
    ComplianceResult, CreditReport, CustomerRating, EmploymentRecord, IdentityVerification,
    RequestId, UserId,
};

/// Storage abstraction so the verification services can be exercised in isolation.
///
/// Every call is expected to be atomic on its own; the services never hold a
/// transaction across provider calls.
pub trait VerificationRepository: Send + Sync {
    fn insert_identity(
        &self,
        record: IdentityVerification,
    ) -> Result<IdentityVerification, RepositoryError>;
    fn update_identity(&self, record: IdentityVerification) -> Result<(), RepositoryError>;
    fn fetch_identity(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<IdentityVerification>, RepositoryError>;
    /// Most recently created request for the user, whatever its status.
    fn latest_identity_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityVerification>, RepositoryError>;

    fn insert_compliance(
        &self,
        record: ComplianceResult,
    ) -> Result<ComplianceResult, RepositoryError>;
    fn latest_compliance_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ComplianceResult>, RepositoryError>;

    /// Replaces the user's current report.
    fn save_credit_report(&self, report: CreditReport) -> Result<CreditReport, RepositoryError>;
    fn latest_credit_report_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CreditReport>, RepositoryError>;

    fn save_employment(&self, record: EmploymentRecord)
        -> Result<EmploymentRecord, RepositoryError>;
    fn fetch_employment(&self, user_id: &UserId)
        -> Result<Option<EmploymentRecord>, RepositoryError>;

    /// Insert or overwrite the single rating keyed by `rating.user_id`.
    fn upsert_rating(&self, rating: CustomerRating) -> Result<CustomerRating, RepositoryError>;
    fn fetch_rating(&self, user_id: &UserId) -> Result<Option<CustomerRating>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Time source for expiry windows and age calculation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
