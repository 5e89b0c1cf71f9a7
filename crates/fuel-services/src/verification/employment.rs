use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{EmployerType, EmploymentPriority, EmploymentRecord, NationalId, UserId};
use super::error::VerificationError;
use super::providers::EmploymentRegistry;
use super::repository::{Clock, VerificationRepository};

const UNVERIFIED_CAP: f64 = 30.0;
const UNREGISTERED_FACTOR: f64 = 0.8;

fn base_score(employer_type: EmployerType) -> f64 {
    match employer_type {
        EmployerType::Government => 95.0,
        EmployerType::SemiGovernment => 85.0,
        EmployerType::PrivateLarge => 75.0,
        EmployerType::PrivateSme => 60.0,
        EmployerType::SelfEmployed => 45.0,
        EmployerType::Freelancer => 35.0,
        EmployerType::Unemployed => 10.0,
    }
}

fn salary_adjustment(monthly_salary: f64) -> f64 {
    if monthly_salary >= 25_000.0 {
        5.0
    } else if monthly_salary >= 15_000.0 {
        3.0
    } else if monthly_salary >= 8_000.0 {
        0.0
    } else if monthly_salary >= 4_000.0 {
        -5.0
    } else {
        -10.0
    }
}

/// Priority score for an employment record, in `0..=100`.
pub fn employment_score(record: &EmploymentRecord) -> u8 {
    let mut score = base_score(record.employer_type);
    if record.employer_type.is_salaried() && !record.gosi_registered {
        score *= UNREGISTERED_FACTOR;
    }
    score += salary_adjustment(record.monthly_salary);
    if !record.is_verified {
        score = score.min(UNVERIFIED_CAP);
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// GOSI-backed employment confirmation.
pub struct EmploymentVerificationService<R> {
    repository: Arc<R>,
    registry: Arc<dyn EmploymentRegistry>,
    clock: Arc<dyn Clock>,
}

impl<R> EmploymentVerificationService<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        registry: Arc<dyn EmploymentRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            clock,
        }
    }

    /// Stored record for the same id, or a fresh registry lookup.
    pub async fn verify_employment(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<EmploymentRecord, VerificationError> {
        if let Some(record) = self.repository.fetch_employment(user_id)? {
            if &record.national_id == national_id {
                debug!(user_id = %user_id, "reusing employment record");
                return Ok(record);
            }
        }

        let now = self.clock.now();
        let record = match self.registry.lookup_employment(national_id).await? {
            Some(profile) => EmploymentRecord {
                user_id: user_id.clone(),
                national_id: national_id.clone(),
                employer_name: Some(profile.employer_name),
                employer_type: profile.employer_type,
                monthly_salary: profile.monthly_salary,
                is_verified: true,
                gosi_registered: profile.gosi_registered,
                verified_at: now,
            },
            None => EmploymentRecord {
                user_id: user_id.clone(),
                national_id: national_id.clone(),
                employer_name: None,
                employer_type: EmployerType::Unemployed,
                monthly_salary: 0.0,
                is_verified: false,
                gosi_registered: false,
                verified_at: now,
            },
        };
        let stored = self.repository.save_employment(record)?;

        info!(
            user_id = %user_id,
            employer_type = stored.employer_type.label(),
            gosi_registered = stored.gosi_registered,
            verified = stored.is_verified,
            "employment verified"
        );
        Ok(stored)
    }

    pub fn calculate_priority(
        &self,
        user_id: &UserId,
    ) -> Result<EmploymentPriority, VerificationError> {
        let record = self
            .repository
            .fetch_employment(user_id)?
            .ok_or_else(|| VerificationError::not_found("employment record", user_id))?;
        Ok(EmploymentPriority {
            employment_score: employment_score(&record),
        })
    }
}
