use std::sync::Arc;
use std::time::Duration;

use crate::config::VerificationConfig;

use super::compliance::ComplianceScreeningService;
use super::credit::CreditAssessmentService;
use super::employment::EmploymentVerificationService;
use super::identity::IdentityVerificationService;
use super::providers::ProviderSet;
use super::rating::{CustomerRatingService, RatingPolicy};
use super::repository::{Clock, VerificationRepository};

/// Every verification service wired to one repository, one clock, and one provider set.
pub struct VerificationServices<R> {
    identity: Arc<IdentityVerificationService<R>>,
    compliance: Arc<ComplianceScreeningService<R>>,
    credit: Arc<CreditAssessmentService<R>>,
    employment: Arc<EmploymentVerificationService<R>>,
    rating: Arc<CustomerRatingService<R>>,
    evaluation_timeout: Duration,
}

impl<R> VerificationServices<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        providers: ProviderSet,
        clock: Arc<dyn Clock>,
        config: &VerificationConfig,
        policy: RatingPolicy,
    ) -> Self {
        let identity = Arc::new(IdentityVerificationService::new(
            Arc::clone(&repository),
            providers.identity,
            Arc::clone(&clock),
            config,
        ));
        let compliance = Arc::new(ComplianceScreeningService::new(
            Arc::clone(&repository),
            providers.compliance,
            Arc::clone(&clock),
            config,
        ));
        let credit = Arc::new(CreditAssessmentService::new(
            Arc::clone(&repository),
            providers.credit,
            Arc::clone(&clock),
            config,
        ));
        let employment = Arc::new(EmploymentVerificationService::new(
            Arc::clone(&repository),
            providers.employment,
            Arc::clone(&clock),
        ));
        let rating = Arc::new(CustomerRatingService::new(
            repository,
            Arc::clone(&identity),
            Arc::clone(&compliance),
            Arc::clone(&credit),
            Arc::clone(&employment),
            clock,
            policy,
        ));

        Self {
            identity,
            compliance,
            credit,
            employment,
            rating,
            evaluation_timeout: Duration::from_secs(config.evaluation_timeout_secs),
        }
    }

    pub fn identity(&self) -> &IdentityVerificationService<R> {
        &self.identity
    }

    pub fn compliance(&self) -> &ComplianceScreeningService<R> {
        &self.compliance
    }

    pub fn credit(&self) -> &CreditAssessmentService<R> {
        &self.credit
    }

    pub fn employment(&self) -> &EmploymentVerificationService<R> {
        &self.employment
    }

    pub fn rating(&self) -> &CustomerRatingService<R> {
        &self.rating
    }

    /// Upper bound on a full customer evaluation made over HTTP.
    pub fn evaluation_timeout(&self) -> Duration {
        self.evaluation_timeout
    }
}
