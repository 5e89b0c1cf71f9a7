//! Customer verification and installment eligibility for the fuel-services backend.
//!
//! The crate hosts the identity, compliance, credit, and employment verification
//! services together with the rating pipeline that folds their outcomes into a
//! single stored [`verification::CustomerRating`]. HTTP wiring lives in
//! [`verification::router`]; the server binary only supplies storage and providers.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod verification;
