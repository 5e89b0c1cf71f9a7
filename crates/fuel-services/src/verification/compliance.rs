use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::VerificationConfig;

use super::domain::{ComplianceResult, NationalId, PepExposure, RiskLevel, UserId};
use super::error::VerificationError;
use super::providers::ComplianceProvider;
use super::repository::{Clock, VerificationRepository};

/// Raw hits collected from the three screening lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningHits {
    pub sanctions_match: bool,
    pub wanted_list_match: bool,
    pub pep: Option<PepExposure>,
}

/// Outcome of folding the sub-checks together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningVerdict {
    pub is_passed: bool,
    pub risk_level: RiskLevel,
}

impl ScreeningHits {
    fn pep_risk(&self) -> RiskLevel {
        self.pep
            .map(PepExposure::risk_level)
            .unwrap_or(RiskLevel::Low)
    }

    /// Risk is the highest severity among the sub-checks; a list match or a
    /// critical PEP exposure fails the check.
    pub fn verdict(&self) -> ScreeningVerdict {
        let sanctions = if self.sanctions_match {
            RiskLevel::Critical
        } else {
            RiskLevel::Low
        };
        let wanted = if self.wanted_list_match {
            RiskLevel::Critical
        } else {
            RiskLevel::Low
        };
        let pep = self.pep_risk();

        let risk_level = sanctions.max(wanted).max(pep);
        let is_passed =
            !self.sanctions_match && !self.wanted_list_match && pep != RiskLevel::Critical;

        ScreeningVerdict {
            is_passed,
            risk_level,
        }
    }
}

/// AML screening across sanctions, PEP, and wanted lists.
pub struct ComplianceScreeningService<R> {
    repository: Arc<R>,
    provider: Arc<dyn ComplianceProvider>,
    clock: Arc<dyn Clock>,
    validity: Duration,
}

impl<R> ComplianceScreeningService<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        provider: Arc<dyn ComplianceProvider>,
        clock: Arc<dyn Clock>,
        config: &VerificationConfig,
    ) -> Self {
        Self {
            repository,
            provider,
            clock,
            validity: Duration::days(config.compliance_validity_days),
        }
    }

    /// Run every screening list and persist a fresh record.
    pub async fn perform_full_check(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<ComplianceResult, VerificationError> {
        let hits = ScreeningHits {
            sanctions_match: self.provider.screen_sanctions(national_id).await?,
            pep: self.provider.screen_pep(national_id).await?,
            wanted_list_match: self.provider.screen_wanted_list(national_id).await?,
        };
        let verdict = hits.verdict();

        let now = self.clock.now();
        let record = ComplianceResult {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            national_id: national_id.clone(),
            is_passed: verdict.is_passed,
            risk_level: verdict.risk_level,
            pep_status: hits.pep.is_some(),
            sanctions_match: hits.sanctions_match,
            wanted_list_match: hits.wanted_list_match,
            checked_at: now,
            expires_at: now + self.validity,
        };
        let stored = self.repository.insert_compliance(record)?;

        if stored.is_passed {
            info!(
                user_id = %user_id,
                risk_level = stored.risk_level.label(),
                "compliance screening passed"
            );
        } else {
            warn!(
                user_id = %user_id,
                risk_level = stored.risk_level.label(),
                sanctions_match = stored.sanctions_match,
                wanted_list_match = stored.wanted_list_match,
                pep_status = stored.pep_status,
                "compliance screening failed"
            );
        }
        Ok(stored)
    }

    /// Newest unexpired record; expired or missing checks are reported as not found.
    pub fn get_last_check(&self, user_id: &UserId) -> Result<ComplianceResult, VerificationError> {
        let now = self.clock.now();
        self.repository
            .latest_compliance_for(user_id)?
            .filter(|record| !record.is_expired(now))
            .ok_or_else(|| VerificationError::not_found("compliance check", user_id))
    }

    /// Reuse an unexpired record or screen again.
    pub async fn current_or_refresh(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<ComplianceResult, VerificationError> {
        let now = self.clock.now();
        match self.repository.latest_compliance_for(user_id)? {
            Some(record) if !record.is_expired(now) && &record.national_id == national_id => {
                debug!(user_id = %user_id, "reusing compliance check");
                Ok(record)
            }
            _ => self.perform_full_check(user_id, national_id).await,
        }
    }
}
