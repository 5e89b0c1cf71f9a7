//! Customer verification and eligibility rating for fuel installment sales.
//!
//! Identity, compliance, credit, and employment checks each own their records
//! through the shared [`VerificationRepository`]; the rating service combines
//! them into one stored [`CustomerRating`] per customer.

pub mod compliance;
pub mod credit;
pub mod domain;
pub mod employment;
pub mod error;
pub mod identity;
pub mod providers;
pub mod rating;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use compliance::ComplianceScreeningService;
pub use credit::CreditAssessmentService;
pub use domain::{
    AgeVerification, ComplianceResult, CreditDecision, CreditReport, CustomerRating,
    DefaultStatus, EligibilityView, EmployerType, EmploymentPriority, EmploymentRecord,
    IdentityResult, IdentityStatus, IdentityVerification, NationalId, PepExposure, PriorityLevel,
    RequestId, RiskCategory, RiskLevel, UserId, VetoReason,
};
pub use employment::EmploymentVerificationService;
pub use error::VerificationError;
pub use identity::IdentityVerificationService;
pub use providers::{
    ComplianceProvider, CreditBureau, EmploymentRegistry, IdentityProvider, ProviderError,
    ProviderSet,
};
pub use rating::{CustomerRatingService, EvaluationStep, RatingPolicy};
pub use repository::{Clock, RepositoryError, SystemClock, VerificationRepository};
pub use router::verification_router;
pub use service::VerificationServices;
