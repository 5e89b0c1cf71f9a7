use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::VerificationConfig;

use super::domain::{
    AgeVerification, IdentityResult, IdentityStatus, IdentityVerification, NationalId, RequestId,
    UserId,
};
use super::error::VerificationError;
use super::providers::{IdentityProvider, ProviderConfirmation};
use super::repository::{Clock, VerificationRepository};

/// Whole years between `date_of_birth` and `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Nafath-style national identity confirmation.
pub struct IdentityVerificationService<R> {
    repository: Arc<R>,
    provider: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    request_ttl: Duration,
    minimum_age: u32,
    simulation_enabled: bool,
}

impl<R> IdentityVerificationService<R>
where
    R: VerificationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        config: &VerificationConfig,
    ) -> Self {
        Self {
            repository,
            provider,
            clock,
            request_ttl: Duration::seconds(config.identity_request_ttl_secs),
            minimum_age: config.minimum_age,
            simulation_enabled: config.simulation_enabled,
        }
    }

    /// Push a confirmation prompt to the user and persist the request as `waiting`.
    pub async fn initiate(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<IdentityResult, VerificationError> {
        let now = self.clock.now();
        let pending = IdentityVerification {
            request_id: RequestId(Uuid::new_v4().to_string()),
            user_id: user_id.clone(),
            national_id: national_id.clone(),
            transaction_id: String::new(),
            random_code: String::new(),
            status: IdentityStatus::Pending,
            verified_name: None,
            date_of_birth: None,
            age_verified: false,
            created_at: now,
            expires_at: now + self.request_ttl,
            completed_at: None,
        };
        let mut record = self.repository.insert_identity(pending)?;

        let ticket = self
            .provider
            .request_confirmation(national_id)
            .await
            .map_err(|err| {
                warn!(request_id = %record.request_id, error = %err, "nafath request failed");
                err
            })?;

        record.transaction_id = ticket.transaction_id;
        record.random_code = ticket.random_code;
        record.status = IdentityStatus::Waiting;
        self.repository.update_identity(record.clone())?;

        info!(
            request_id = %record.request_id,
            user_id = %user_id,
            expires_at = %record.expires_at,
            "nafath confirmation requested"
        );
        Ok(record.result())
    }

    pub async fn check_status(
        &self,
        request_id: &RequestId,
    ) -> Result<IdentityResult, VerificationError> {
        let record = self.fetch(request_id)?;
        let record = self.refresh(record).await?;
        Ok(record.result())
    }

    /// Force a terminal outcome without the user's device. Only reachable when
    /// simulation is enabled in configuration.
    pub async fn simulate_confirmation(
        &self,
        request_id: &RequestId,
        approved: bool,
    ) -> Result<IdentityResult, VerificationError> {
        if !self.simulation_enabled {
            warn!(request_id = %request_id, "rejected simulated confirmation");
            return Err(VerificationError::SimulationDisabled);
        }

        let record = self.fetch(request_id)?;
        if record.status.is_terminal() {
            debug!(
                request_id = %request_id,
                status = record.status.label(),
                "request already finalized"
            );
            return Ok(record.result());
        }

        if self.clock.now() >= record.expires_at {
            return Ok(self.expire(record)?.result());
        }

        let record = self.complete(record, approved).await?;
        Ok(record.result())
    }

    /// Age derived from the user's latest request; zero until that request is verified.
    pub fn verify_age(&self, user_id: &UserId) -> Result<AgeVerification, VerificationError> {
        let record = self
            .repository
            .latest_identity_for(user_id)?
            .ok_or_else(|| VerificationError::not_found("identity verification", user_id))?;
        Ok(self.assess_age(&record))
    }

    /// Latest request for the user with expiry and provider state applied.
    /// A request made for another national id does not count.
    pub async fn current_standing(
        &self,
        user_id: &UserId,
        national_id: &NationalId,
    ) -> Result<Option<IdentityVerification>, VerificationError> {
        match self.repository.latest_identity_for(user_id)? {
            Some(record) if &record.national_id == national_id => {
                Ok(Some(self.refresh(record).await?))
            }
            Some(record) => {
                debug!(
                    user_id = %user_id,
                    request_id = %record.request_id,
                    "latest nafath request belongs to another national id"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn assess_age(&self, record: &IdentityVerification) -> AgeVerification {
        match (record.status, record.date_of_birth) {
            (IdentityStatus::Verified, Some(date_of_birth)) => {
                let age = age_on(date_of_birth, self.clock.now().date_naive());
                AgeVerification {
                    age_verified: age >= self.minimum_age,
                    age,
                }
            }
            _ => AgeVerification {
                age_verified: false,
                age: 0,
            },
        }
    }

    fn fetch(&self, request_id: &RequestId) -> Result<IdentityVerification, VerificationError> {
        self.repository
            .fetch_identity(request_id)?
            .ok_or_else(|| VerificationError::not_found("identity request", request_id))
    }

    async fn refresh(
        &self,
        record: IdentityVerification,
    ) -> Result<IdentityVerification, VerificationError> {
        if record.status.is_terminal() {
            return Ok(record);
        }
        if self.clock.now() >= record.expires_at {
            return self.expire(record);
        }
        if record.status == IdentityStatus::Pending {
            return Ok(record);
        }

        match self
            .provider
            .confirmation_status(&record.transaction_id)
            .await?
        {
            ProviderConfirmation::Pending => Ok(record),
            ProviderConfirmation::Approved => self.complete(record, true).await,
            ProviderConfirmation::Rejected => self.complete(record, false).await,
        }
    }

    fn expire(
        &self,
        mut record: IdentityVerification,
    ) -> Result<IdentityVerification, VerificationError> {
        record.status = IdentityStatus::Expired;
        record.completed_at = Some(self.clock.now());
        self.repository.update_identity(record.clone())?;
        info!(request_id = %record.request_id, "nafath request expired");
        Ok(record)
    }

    async fn complete(
        &self,
        mut record: IdentityVerification,
        approved: bool,
    ) -> Result<IdentityVerification, VerificationError> {
        let now = self.clock.now();

        if approved {
            let profile = self.provider.identity_profile(&record.national_id).await?;
            let age = age_on(profile.date_of_birth, now.date_naive());
            record.verified_name = Some(profile.full_name);
            record.date_of_birth = Some(profile.date_of_birth);
            record.age_verified = age >= self.minimum_age;
            record.status = IdentityStatus::Verified;
        } else {
            record.status = IdentityStatus::Rejected;
        }
        record.completed_at = Some(now);
        self.repository.update_identity(record.clone())?;

        info!(
            request_id = %record.request_id,
            user_id = %record.user_id,
            status = record.status.label(),
            age_verified = record.age_verified,
            "nafath request finalized"
        );
        Ok(record)
    }
}
