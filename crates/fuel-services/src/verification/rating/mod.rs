//! Customer rating aggregation.
//!
//! An evaluation walks a fixed sequence of steps, each one calling a single
//! verification service and folding its answer into a shared context.
//! A compliance veto ends the walk early and stores a blocked rating.

mod config;
mod policy;
mod rules;

pub use config::RatingPolicy;
pub use policy::priority_for_score;
pub use rules::{combine, compliance_score, credit_score_from_bureau, identity_score, SubScores};

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::compliance::ComplianceScreeningService;
use super::credit::CreditAssessmentService;
use super::domain::{
    CustomerRating, EligibilityView, IdentityStatus, NationalId, PriorityLevel, UserId, VetoReason,
};
use super::employment::{employment_score, EmploymentVerificationService};
use super::error::VerificationError;
use super::identity::IdentityVerificationService;
use super::repository::{Clock, VerificationRepository};
use policy::{apply_identity_cap, recommended_credit_limit};

/// Stages of a full evaluation, run in [`EvaluationStep::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStep {
    Identity,
    Compliance,
    Credit,
    Employment,
}

impl EvaluationStep {
    pub const ORDER: [EvaluationStep; 4] = [
        EvaluationStep::Identity,
        EvaluationStep::Compliance,
        EvaluationStep::Credit,
        EvaluationStep::Employment,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Compliance => "compliance",
            Self::Credit => "credit",
            Self::Employment => "employment",
        }
    }
}

enum StepOutcome {
    Continue,
    Veto(VetoReason),
}

/// Facts gathered while the steps run.
#[derive(Debug, Default)]
struct EvaluationContext {
    nafath_verified: bool,
    age_verified: bool,
    identity_failed: bool,
    kyc_passed: bool,
    credit_approved: bool,
    is_employee: bool,
    report_limit: f64,
    monthly_salary: f64,
    scores: SubScores,
}

/// Combines the four verification services into a single stored rating.
pub struct CustomerRatingService<R> {
    repository: Arc<R>,
    identity: Arc<IdentityVerificationService<R>>,
    compliance: Arc<ComplianceScreeningService<R>>,
    credit: Arc<CreditAssessmentService<R>>,
    employment: Arc<EmploymentVerificationService<R>>,
    clock: Arc<dyn Clock>,
    policy: RatingPolicy,
}

impl<R> CustomerRatingService<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        identity: Arc<IdentityVerificationService<R>>,
        compliance: Arc<ComplianceScreeningService<R>>,
        credit: Arc<CreditAssessmentService<R>>,
        employment: Arc<EmploymentVerificationService<R>>,
        clock: Arc<dyn Clock>,
        policy: RatingPolicy,
    ) -> Self {
        Self {
            repository,
            identity,
            compliance,
            credit,
            employment,
            clock,
            policy,
        }
    }

    /// Run every step and upsert the resulting rating.
    pub async fn perform_full_evaluation(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<CustomerRating, VerificationError> {
        let mut context = EvaluationContext::default();

        for step in EvaluationStep::ORDER {
            debug!(user_id = %user_id, step = step.label(), "running evaluation step");
            let outcome = match step {
                EvaluationStep::Identity => {
                    self.identity_step(user_id, national_id, &mut context)
                        .await?
                }
                EvaluationStep::Compliance => {
                    self.compliance_step(user_id, national_id, &mut context)
                        .await?
                }
                EvaluationStep::Credit => {
                    self.credit_step(user_id, national_id, &mut context).await?
                }
                EvaluationStep::Employment => {
                    self.employment_step(user_id, national_id, &mut context)
                        .await?
                }
            };

            if let StepOutcome::Veto(reason) = outcome {
                return self.store_veto(user_id, &context, reason);
            }
        }

        self.store_rating(user_id, context)
    }

    pub fn get_rating(&self, user_id: &UserId) -> Result<CustomerRating, VerificationError> {
        self.repository
            .fetch_rating(user_id)?
            .ok_or_else(|| VerificationError::not_found("customer rating", user_id))
    }

    /// Answer from the stored rating alone; never reaches a provider.
    pub fn quick_eligibility_check(
        &self,
        user_id: &UserId,
    ) -> Result<EligibilityView, VerificationError> {
        Ok(self.get_rating(user_id)?.eligibility())
    }

    async fn identity_step(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
        context: &mut EvaluationContext,
    ) -> Result<StepOutcome, VerificationError> {
        if let Some(record) = self
            .identity
            .current_standing(user_id, national_id)
            .await?
        {
            match record.status {
                IdentityStatus::Verified => {
                    context.nafath_verified = true;
                    context.age_verified = self.identity.assess_age(&record).age_verified;
                }
                IdentityStatus::Rejected | IdentityStatus::Expired => {
                    context.identity_failed = true;
                }
                IdentityStatus::Pending | IdentityStatus::Waiting => {}
            }
        }
        context.scores.identity = identity_score(context.nafath_verified, context.age_verified);
        Ok(StepOutcome::Continue)
    }

    async fn compliance_step(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
        context: &mut EvaluationContext,
    ) -> Result<StepOutcome, VerificationError> {
        let result = self
            .compliance
            .current_or_refresh(user_id, national_id)
            .await?;

        if let Some(reason) = result.veto() {
            return Ok(StepOutcome::Veto(reason));
        }
        context.kyc_passed = result.is_passed;
        context.scores.compliance = compliance_score(&result);
        Ok(StepOutcome::Continue)
    }

    async fn credit_step(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
        context: &mut EvaluationContext,
    ) -> Result<StepOutcome, VerificationError> {
        let report = self.credit.get_credit_report(user_id, national_id).await?;

        context.scores.credit = credit_score_from_bureau(report.score);
        context.credit_approved = !report.risk_category.is_adverse()
            && report.defaulted_loans == 0
            && report.recommended_limit > 0.0;
        context.report_limit = report.recommended_limit;
        Ok(StepOutcome::Continue)
    }

    async fn employment_step(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
        context: &mut EvaluationContext,
    ) -> Result<StepOutcome, VerificationError> {
        let record = self
            .employment
            .verify_employment(user_id, national_id)
            .await?;

        context.scores.employment = employment_score(&record);
        context.is_employee = record.is_verified && record.employer_type.is_salaried();
        context.monthly_salary = record.monthly_salary;
        Ok(StepOutcome::Continue)
    }

    fn store_veto(
        &self,
        user_id: &UserId,
        context: &EvaluationContext,
        reason: VetoReason,
    ) -> Result<CustomerRating, VerificationError> {
        let rating = CustomerRating {
            user_id: user_id.clone(),
            overall_score: 0,
            nafath_verified: context.nafath_verified,
            kyc_passed: false,
            credit_approved: false,
            age_verified: context.age_verified,
            is_employee: false,
            identity_score: context.scores.identity,
            employment_score: 0,
            credit_score: 0,
            compliance_score: 0,
            priority_level: PriorityLevel::Blocked,
            recommended_credit_limit: 0.0,
            max_installment_months: PriorityLevel::Blocked.max_installment_months(),
            veto: Some(reason),
            last_updated: self.clock.now(),
        };
        let stored = self.repository.upsert_rating(rating)?;

        warn!(user_id = %user_id, veto = ?reason, "customer blocked by compliance veto");
        Ok(stored)
    }

    fn store_rating(
        &self,
        user_id: &UserId,
        context: EvaluationContext,
    ) -> Result<CustomerRating, VerificationError> {
        let scores = context.scores;
        let overall_score = combine(&scores, &self.policy);
        let priority_level =
            apply_identity_cap(priority_for_score(overall_score), context.identity_failed);
        let recommended_credit_limit = recommended_credit_limit(
            priority_level,
            context.report_limit,
            context.monthly_salary,
            &self.policy,
        );

        let rating = CustomerRating {
            user_id: user_id.clone(),
            overall_score,
            nafath_verified: context.nafath_verified,
            kyc_passed: context.kyc_passed,
            credit_approved: context.credit_approved,
            age_verified: context.age_verified,
            is_employee: context.is_employee,
            identity_score: scores.identity,
            employment_score: scores.employment,
            credit_score: scores.credit,
            compliance_score: scores.compliance,
            priority_level,
            recommended_credit_limit,
            max_installment_months: priority_level.max_installment_months(),
            veto: None,
            last_updated: self.clock.now(),
        };
        let stored = self.repository.upsert_rating(rating)?;

        info!(
            user_id = %user_id,
            overall_score,
            priority_level = priority_level.label(),
            recommended_credit_limit,
            "customer rating updated"
        );
        Ok(stored)
    }
}
