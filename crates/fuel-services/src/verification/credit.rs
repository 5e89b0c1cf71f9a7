use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::VerificationConfig;

use super::domain::{
    CreditDecision, CreditReport, DefaultStatus, NationalId, RiskCategory, UserId,
};
use super::error::VerificationError;
use super::providers::{BureauReport, CreditBureau};
use super::repository::{Clock, VerificationRepository};

/// Category derived from the bureau score; any defaulted loan forces `Defaulter`.
pub fn risk_category_for(score: u16, defaulted_loans: u32) -> RiskCategory {
    if defaulted_loans > 0 {
        return RiskCategory::Defaulter;
    }
    match score {
        750..=u16::MAX => RiskCategory::Excellent,
        680..=749 => RiskCategory::Good,
        600..=679 => RiskCategory::Fair,
        500..=599 => RiskCategory::Poor,
        _ => RiskCategory::Defaulter,
    }
}

/// Limit granted per category, halved for customers with repeated late payments.
pub fn recommended_limit_for(category: RiskCategory, delayed_payments: u32) -> f64 {
    let base = match category {
        RiskCategory::Excellent => 10_000.0,
        RiskCategory::Good => 6_000.0,
        RiskCategory::Fair => 3_000.0,
        RiskCategory::Poor => 1_000.0,
        RiskCategory::Defaulter => 0.0,
    };
    if delayed_payments > 2 {
        base / 2.0
    } else {
        base
    }
}

/// Apply the approval rule to a report for a requested amount.
pub fn decide(report: &CreditReport, requested_amount: f64) -> CreditDecision {
    let max_amount = if report.risk_category.is_adverse() || report.defaulted_loans > 0 {
        0.0
    } else {
        report.recommended_limit
    };

    let (approved, reason) = if report.defaulted_loans > 0 {
        (
            false,
            format!("{} defaulted loan(s) on record", report.defaulted_loans),
        )
    } else if report.risk_category.is_adverse() {
        (
            false,
            format!("risk category {} is not eligible", report.risk_category.label()),
        )
    } else if requested_amount > report.recommended_limit {
        (
            false,
            format!(
                "requested amount {requested_amount:.2} exceeds limit {:.2}",
                report.recommended_limit
            ),
        )
    } else {
        (true, "within recommended limit".to_string())
    };

    CreditDecision {
        approved,
        max_amount,
        reason,
    }
}

/// SIMAH-style credit report retrieval and affordability decisions.
pub struct CreditAssessmentService<R> {
    repository: Arc<R>,
    bureau: Arc<dyn CreditBureau>,
    clock: Arc<dyn Clock>,
    validity: Duration,
}

impl<R> CreditAssessmentService<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        bureau: Arc<dyn CreditBureau>,
        clock: Arc<dyn Clock>,
        config: &VerificationConfig,
    ) -> Self {
        Self {
            repository,
            bureau,
            clock,
            validity: Duration::days(config.credit_validity_days),
        }
    }

    /// Cached report while it is fresh, otherwise a new bureau pull.
    pub async fn get_credit_report(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<CreditReport, VerificationError> {
        let now = self.clock.now();
        if let Some(report) = self.repository.latest_credit_report_for(user_id)? {
            if !report.is_expired(now) && &report.national_id == national_id {
                debug!(user_id = %user_id, "serving cached credit report");
                return Ok(report);
            }
        }
        self.pull(user_id, national_id).await
    }

    pub async fn evaluate_credit_eligibility(
        &self,
        user_id: &UserId,
        requested_amount: f64,
    ) -> Result<CreditDecision, VerificationError> {
        let report = self.current_report(user_id).await?;
        let decision = decide(&report, requested_amount);
        info!(
            user_id = %user_id,
            requested_amount,
            approved = decision.approved,
            max_amount = decision.max_amount,
            "credit eligibility evaluated"
        );
        Ok(decision)
    }

    pub async fn has_defaulted_loans(
        &self,
        user_id: &UserId,
    ) -> Result<DefaultStatus, VerificationError> {
        let report = self.current_report(user_id).await?;
        Ok(DefaultStatus {
            has_defaults: report.defaulted_loans > 0,
        })
    }

    /// Stored report for the user, refreshed through the bureau when it has expired.
    async fn current_report(&self, user_id: &UserId) -> Result<CreditReport, VerificationError> {
        let report = self
            .repository
            .latest_credit_report_for(user_id)?
            .ok_or_else(|| VerificationError::NoReportAvailable(user_id.to_string()))?;

        if report.is_expired(self.clock.now()) {
            debug!(user_id = %user_id, "credit report expired; refreshing");
            return self.pull(user_id, &report.national_id).await;
        }
        Ok(report)
    }

    async fn pull(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<CreditReport, VerificationError> {
        let bureau = self.bureau.fetch_report(national_id).await?;
        let report = self.build_report(user_id, national_id, bureau);
        let stored = self.repository.save_credit_report(report)?;

        info!(
            user_id = %user_id,
            score = stored.score,
            risk_category = stored.risk_category.label(),
            recommended_limit = stored.recommended_limit,
            "credit report fetched"
        );
        Ok(stored)
    }

    fn build_report(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
        bureau: BureauReport,
    ) -> CreditReport {
        let now = self.clock.now();
        let risk_category = risk_category_for(bureau.score, bureau.defaulted_loans);
        CreditReport {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            national_id: national_id.clone(),
            score: bureau.score,
            total_debts: bureau.total_debts,
            active_loans: bureau.active_loans,
            delayed_payments: bureau.delayed_payments,
            defaulted_loans: bureau.defaulted_loans,
            credit_utilization: bureau.credit_utilization,
            risk_category,
            recommended_limit: recommended_limit_for(risk_category, bureau.delayed_payments),
            fetched_at: now,
            expires_at: now + self.validity,
        }
    }
}
