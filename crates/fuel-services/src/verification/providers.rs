//! Outbound verification bureaus.
//!
//! Each sub-service reaches its external authority (Nafath, AML screening,
//! SIMAH, GOSI) through one of these traits. Calls are I/O bound and may
//! suspend; implementations must be shareable across requests.

mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{EmployerType, NationalId, PepExposure};

pub use simulated::{
    SimulatedCreditBureau, SimulatedGosiRegistry, SimulatedNafath, SimulatedScreening,
};

/// Ticket handed back when a confirmation prompt has been pushed to the user's device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationTicket {
    pub transaction_id: String,
    /// Number the user must pick in the Nafath app.
    pub random_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderConfirmation {
    Pending,
    Approved,
    Rejected,
}

/// Identity attributes released by Nafath after a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
}

/// Raw bureau figures before the risk category and limit are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BureauReport {
    pub score: u16,
    pub total_debts: f64,
    pub active_loans: u32,
    pub delayed_payments: u32,
    pub defaulted_loans: u32,
    pub credit_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentProfile {
    pub employer_name: String,
    pub employer_type: EmployerType,
    pub monthly_salary: f64,
    pub gosi_registered: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn request_confirmation(
        &self,
        national_id: &NationalId,
    ) -> Result<ConfirmationTicket, ProviderError>;
    async fn confirmation_status(
        &self,
        transaction_id: &str,
    ) -> Result<ProviderConfirmation, ProviderError>;
    async fn identity_profile(
        &self,
        national_id: &NationalId,
    ) -> Result<IdentityProfile, ProviderError>;
}

#[async_trait]
pub trait ComplianceProvider: Send + Sync {
    async fn screen_sanctions(&self, national_id: &NationalId) -> Result<bool, ProviderError>;
    async fn screen_pep(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<PepExposure>, ProviderError>;
    async fn screen_wanted_list(&self, national_id: &NationalId) -> Result<bool, ProviderError>;
}

#[async_trait]
pub trait CreditBureau: Send + Sync {
    async fn fetch_report(&self, national_id: &NationalId) -> Result<BureauReport, ProviderError>;
}

#[async_trait]
pub trait EmploymentRegistry: Send + Sync {
    /// `None` when the registry holds no active employment for the id.
    async fn lookup_employment(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<EmploymentProfile>, ProviderError>;
}

/// Failure talking to an external bureau.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {message}")]
    Unavailable {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

/// Bundle of bureau clients handed to the verification services.
#[derive(Clone)]
pub struct ProviderSet {
    pub identity: Arc<dyn IdentityProvider>,
    pub compliance: Arc<dyn ComplianceProvider>,
    pub credit: Arc<dyn CreditBureau>,
    pub employment: Arc<dyn EmploymentRegistry>,
}

impl ProviderSet {
    /// Deterministic stand-ins derived from the national id digits.
    pub fn simulated() -> Self {
        Self {
            identity: Arc::new(SimulatedNafath),
            compliance: Arc::new(SimulatedScreening),
            credit: Arc::new(SimulatedCreditBureau),
            employment: Arc::new(SimulatedGosiRegistry),
        }
    }
}
