use axum::http::StatusCode;

use super::providers::ProviderError;
use super::repository::RepositoryError;

/// Error raised by the verification services and the rating pipeline.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("no credit report available for user {0}")]
    NoReportAvailable(String),
    #[error("verification simulation is disabled in this environment")]
    SimulationDisabled,
    #[error("customer evaluation timed out after {0}s")]
    TimedOut(u64),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("dependency failure: {0}")]
    Dependency(#[from] ProviderError),
}

impl VerificationError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } | Self::NoReportAvailable(_) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::SimulationDisabled => StatusCode::FORBIDDEN,
            Self::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Repository(_) | Self::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
