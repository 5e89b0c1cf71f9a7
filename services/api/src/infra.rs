use fuel_services::verification::{
    ComplianceResult, CreditReport, CustomerRating, EmploymentRecord, IdentityVerification,
    NationalId, RepositoryError, RequestId, UserId, VerificationRepository,
};
use fuel_services::verification::validation::{parse_national_id, parse_user_id};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Tables {
    identities: HashMap<RequestId, IdentityVerification>,
    identity_order: Vec<RequestId>,
    compliance: Vec<ComplianceResult>,
    credit_reports: HashMap<UserId, CreditReport>,
    employment: HashMap<UserId, EmploymentRecord>,
    ratings: HashMap<UserId, CustomerRating>,
}

/// Process-local storage for every verification record. One lock guards all
/// tables so each call is atomic.
#[derive(Default, Clone)]
pub struct InMemoryVerificationRepository {
    tables: Arc<Mutex<Tables>>,
}

impl VerificationRepository for InMemoryVerificationRepository {
    fn insert_identity(
        &self,
        record: IdentityVerification,
    ) -> Result<IdentityVerification, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if guard.identities.contains_key(&record.request_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.identity_order.push(record.request_id.clone());
        guard
            .identities
            .insert(record.request_id.clone(), record.clone());
        Ok(record)
    }

    fn update_identity(&self, record: IdentityVerification) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if guard.identities.contains_key(&record.request_id) {
            guard.identities.insert(record.request_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_identity(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<IdentityVerification>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.identities.get(request_id).cloned())
    }

    fn latest_identity_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityVerification>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard
            .identity_order
            .iter()
            .rev()
            .filter_map(|request_id| guard.identities.get(request_id))
            .find(|record| &record.user_id == user_id)
            .cloned())
    }

    fn insert_compliance(
        &self,
        record: ComplianceResult,
    ) -> Result<ComplianceResult, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.compliance.push(record.clone());
        Ok(record)
    }

    fn latest_compliance_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ComplianceResult>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard
            .compliance
            .iter()
            .rev()
            .find(|record| &record.user_id == user_id)
            .cloned())
    }

    fn save_credit_report(&self, report: CreditReport) -> Result<CreditReport, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard
            .credit_reports
            .insert(report.user_id.clone(), report.clone());
        Ok(report)
    }

    fn latest_credit_report_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CreditReport>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.credit_reports.get(user_id).cloned())
    }

    fn save_employment(
        &self,
        record: EmploymentRecord,
    ) -> Result<EmploymentRecord, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard
            .employment
            .insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_employment(
        &self,
        user_id: &UserId,
    ) -> Result<Option<EmploymentRecord>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.employment.get(user_id).cloned())
    }

    fn upsert_rating(&self, rating: CustomerRating) -> Result<CustomerRating, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.ratings.insert(rating.user_id.clone(), rating.clone());
        Ok(rating)
    }

    fn fetch_rating(&self, user_id: &UserId) -> Result<Option<CustomerRating>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.ratings.get(user_id).cloned())
    }
}

pub(crate) fn parse_national_id_arg(raw: &str) -> Result<NationalId, String> {
    parse_national_id("national-id", raw).map_err(|error| error.message)
}

pub(crate) fn parse_user_id_arg(raw: &str) -> Result<UserId, String> {
    parse_user_id("user-id", raw).map_err(|error| error.message)
}
