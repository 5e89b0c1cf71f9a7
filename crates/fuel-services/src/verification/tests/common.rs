use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::VerificationConfig;
use crate::verification::domain::{
    ComplianceResult, CreditReport, CustomerRating, EmployerType, EmploymentRecord,
    IdentityVerification, NationalId, PepExposure, RequestId, UserId,
};
use crate::verification::providers::{
    BureauReport, ComplianceProvider, ConfirmationTicket, CreditBureau, EmploymentProfile,
    EmploymentRegistry, IdentityProfile, IdentityProvider, ProviderConfirmation, ProviderError,
    ProviderSet,
};
use crate::verification::rating::RatingPolicy;
use crate::verification::repository::{Clock, RepositoryError, VerificationRepository};
use crate::verification::{verification_router, VerificationServices};

pub(super) const USER: &str = "0b8e4a52-3c1f-4f7d-9a26-6c2d8e1f4b90";
pub(super) const NATIONAL_ID: &str = "1234567890";

pub(super) fn user() -> UserId {
    UserId(USER.to_string())
}

pub(super) fn national_id() -> NationalId {
    NationalId(NATIONAL_ID.to_string())
}

pub(super) fn start_of_test() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Default)]
struct MemoryState {
    identities: Vec<IdentityVerification>,
    compliance: Vec<ComplianceResult>,
    credit: HashMap<UserId, CreditReport>,
    employment: HashMap<UserId, EmploymentRecord>,
    ratings: HashMap<UserId, CustomerRating>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn rating_count(&self) -> usize {
        self.state.lock().expect("repository mutex poisoned").ratings.len()
    }

    pub(super) fn compliance_count(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .compliance
            .len()
    }
}

impl VerificationRepository for MemoryRepository {
    fn insert_identity(
        &self,
        record: IdentityVerification,
    ) -> Result<IdentityVerification, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard
            .identities
            .iter()
            .any(|stored| stored.request_id == record.request_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.identities.push(record.clone());
        Ok(record)
    }

    fn update_identity(&self, record: IdentityVerification) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let slot = guard
            .identities
            .iter_mut()
            .find(|stored| stored.request_id == record.request_id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record;
        Ok(())
    }

    fn fetch_identity(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<IdentityVerification>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .identities
            .iter()
            .find(|stored| &stored.request_id == request_id)
            .cloned())
    }

    fn latest_identity_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityVerification>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .identities
            .iter()
            .rev()
            .find(|stored| &stored.user_id == user_id)
            .cloned())
    }

    fn insert_compliance(
        &self,
        record: ComplianceResult,
    ) -> Result<ComplianceResult, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.compliance.push(record.clone());
        Ok(record)
    }

    fn latest_compliance_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ComplianceResult>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .compliance
            .iter()
            .rev()
            .find(|stored| &stored.user_id == user_id)
            .cloned())
    }

    fn save_credit_report(&self, report: CreditReport) -> Result<CreditReport, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.credit.insert(report.user_id.clone(), report.clone());
        Ok(report)
    }

    fn latest_credit_report_for(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CreditReport>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.credit.get(user_id).cloned())
    }

    fn save_employment(
        &self,
        record: EmploymentRecord,
    ) -> Result<EmploymentRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.employment.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_employment(
        &self,
        user_id: &UserId,
    ) -> Result<Option<EmploymentRecord>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.employment.get(user_id).cloned())
    }

    fn upsert_rating(&self, rating: CustomerRating) -> Result<CustomerRating, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.ratings.insert(rating.user_id.clone(), rating.clone());
        Ok(rating)
    }

    fn fetch_rating(&self, user_id: &UserId) -> Result<Option<CustomerRating>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.ratings.get(user_id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl VerificationRepository for UnavailableRepository {
    fn insert_identity(
        &self,
        _record: IdentityVerification,
    ) -> Result<IdentityVerification, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_identity(&self, _record: IdentityVerification) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_identity(
        &self,
        _request_id: &RequestId,
    ) -> Result<Option<IdentityVerification>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_identity_for(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<IdentityVerification>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_compliance(
        &self,
        _record: ComplianceResult,
    ) -> Result<ComplianceResult, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_compliance_for(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<ComplianceResult>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_credit_report(&self, _report: CreditReport) -> Result<CreditReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_credit_report_for(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<CreditReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_employment(
        &self,
        _record: EmploymentRecord,
    ) -> Result<EmploymentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_employment(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<EmploymentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert_rating(&self, _rating: CustomerRating) -> Result<CustomerRating, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_rating(&self, _user_id: &UserId) -> Result<Option<CustomerRating>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Manually advanced time source.
pub(super) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(super) fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) struct StubIdentity {
    pub(super) confirmation: Mutex<ProviderConfirmation>,
    pub(super) date_of_birth: Mutex<NaiveDate>,
    pub(super) calls: AtomicUsize,
}

impl Default for StubIdentity {
    fn default() -> Self {
        Self {
            confirmation: Mutex::new(ProviderConfirmation::Pending),
            date_of_birth: Mutex::new(NaiveDate::from_ymd_opt(1990, 5, 1).expect("valid date")),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubIdentity {
    pub(super) fn confirm(&self, confirmation: ProviderConfirmation) {
        *self.confirmation.lock().expect("stub mutex poisoned") = confirmation;
    }

    pub(super) fn born_on(&self, date_of_birth: NaiveDate) {
        *self.date_of_birth.lock().expect("stub mutex poisoned") = date_of_birth;
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn request_confirmation(
        &self,
        _national_id: &NationalId,
    ) -> Result<ConfirmationTicket, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ConfirmationTicket {
            transaction_id: "txn-1".to_string(),
            random_code: "42".to_string(),
        })
    }

    async fn confirmation_status(
        &self,
        _transaction_id: &str,
    ) -> Result<ProviderConfirmation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .confirmation
            .lock()
            .expect("stub mutex poisoned")
            .clone())
    }

    async fn identity_profile(
        &self,
        _national_id: &NationalId,
    ) -> Result<IdentityProfile, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(IdentityProfile {
            full_name: "Faisal Al-Harbi".to_string(),
            date_of_birth: *self.date_of_birth.lock().expect("stub mutex poisoned"),
        })
    }
}

#[derive(Default)]
pub(super) struct StubScreening {
    pub(super) sanctions: Mutex<bool>,
    pub(super) wanted: Mutex<bool>,
    pub(super) pep: Mutex<Option<PepExposure>>,
    pub(super) calls: AtomicUsize,
}

impl StubScreening {
    pub(super) fn flag_sanctions(&self) {
        *self.sanctions.lock().expect("stub mutex poisoned") = true;
    }

    pub(super) fn flag_wanted(&self) {
        *self.wanted.lock().expect("stub mutex poisoned") = true;
    }

    pub(super) fn expose(&self, pep: PepExposure) {
        *self.pep.lock().expect("stub mutex poisoned") = Some(pep);
    }
}

#[async_trait]
impl ComplianceProvider for StubScreening {
    async fn screen_sanctions(&self, _national_id: &NationalId) -> Result<bool, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.sanctions.lock().expect("stub mutex poisoned"))
    }

    async fn screen_pep(
        &self,
        _national_id: &NationalId,
    ) -> Result<Option<PepExposure>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.pep.lock().expect("stub mutex poisoned"))
    }

    async fn screen_wanted_list(&self, _national_id: &NationalId) -> Result<bool, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.wanted.lock().expect("stub mutex poisoned"))
    }
}

pub(super) fn bureau_report(score: u16) -> BureauReport {
    BureauReport {
        score,
        total_debts: 4_500.0,
        active_loans: 1,
        delayed_payments: 0,
        defaulted_loans: 0,
        credit_utilization: 0.2,
    }
}

pub(super) struct StubBureau {
    pub(super) report: Mutex<Result<BureauReport, ProviderError>>,
    pub(super) calls: AtomicUsize,
}

impl Default for StubBureau {
    fn default() -> Self {
        Self {
            report: Mutex::new(Ok(bureau_report(750))),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubBureau {
    pub(super) fn returns(&self, report: BureauReport) {
        *self.report.lock().expect("stub mutex poisoned") = Ok(report);
    }

    pub(super) fn fails(&self) {
        *self.report.lock().expect("stub mutex poisoned") = Err(ProviderError::Unavailable {
            provider: "simah",
            message: "connection reset".to_string(),
        });
    }
}

#[async_trait]
impl CreditBureau for StubBureau {
    async fn fetch_report(&self, _national_id: &NationalId) -> Result<BureauReport, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.report.lock().expect("stub mutex poisoned").clone()
    }
}

pub(super) fn government_profile(monthly_salary: f64) -> EmploymentProfile {
    EmploymentProfile {
        employer_name: "Ministry of Energy".to_string(),
        employer_type: EmployerType::Government,
        monthly_salary,
        gosi_registered: true,
    }
}

pub(super) struct StubRegistry {
    pub(super) profile: Mutex<Option<EmploymentProfile>>,
    pub(super) calls: AtomicUsize,
}

impl Default for StubRegistry {
    fn default() -> Self {
        Self {
            profile: Mutex::new(Some(government_profile(12_000.0))),
            calls: AtomicUsize::new(0),
        }
    }
}

impl StubRegistry {
    pub(super) fn returns(&self, profile: Option<EmploymentProfile>) {
        *self.profile.lock().expect("stub mutex poisoned") = profile;
    }
}

#[async_trait]
impl EmploymentRegistry for StubRegistry {
    async fn lookup_employment(
        &self,
        _national_id: &NationalId,
    ) -> Result<Option<EmploymentProfile>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.profile.lock().expect("stub mutex poisoned").clone())
    }
}

/// Services wired to in-memory storage, a fixed clock, and counting stubs.
pub(super) struct Harness {
    pub(super) services: Arc<VerificationServices<MemoryRepository>>,
    pub(super) repository: Arc<MemoryRepository>,
    pub(super) clock: Arc<FixedClock>,
    pub(super) identity: Arc<StubIdentity>,
    pub(super) screening: Arc<StubScreening>,
    pub(super) bureau: Arc<StubBureau>,
    pub(super) registry: Arc<StubRegistry>,
}

impl Harness {
    pub(super) fn provider_calls(&self) -> usize {
        self.identity.calls.load(Ordering::SeqCst)
            + self.screening.calls.load(Ordering::SeqCst)
            + self.bureau.calls.load(Ordering::SeqCst)
            + self.registry.calls.load(Ordering::SeqCst)
    }

    pub(super) fn router(&self) -> Router {
        verification_router(Arc::clone(&self.services))
    }

    /// Drive a Nafath request for the default user to the given outcome.
    pub(super) async fn confirm_identity(&self, approved: bool) -> RequestId {
        let initiated = self
            .services
            .identity()
            .initiate(&user(), &national_id())
            .await
            .expect("initiate succeeds");
        self.services
            .identity()
            .simulate_confirmation(&initiated.request_id, approved)
            .await
            .expect("simulation succeeds");
        initiated.request_id
    }
}

pub(super) fn harness() -> Harness {
    harness_with(VerificationConfig::default())
}

pub(super) fn harness_with(config: VerificationConfig) -> Harness {
    let repository = Arc::new(MemoryRepository::default());
    let clock = Arc::new(FixedClock::new(start_of_test()));
    let identity = Arc::new(StubIdentity::default());
    let screening = Arc::new(StubScreening::default());
    let bureau = Arc::new(StubBureau::default());
    let registry = Arc::new(StubRegistry::default());

    let providers = ProviderSet {
        identity: identity.clone(),
        compliance: screening.clone(),
        credit: bureau.clone(),
        employment: registry.clone(),
    };
    let services = Arc::new(VerificationServices::new(
        repository.clone(),
        providers,
        clock.clone(),
        &config,
        RatingPolicy::default(),
    ));

    Harness {
        services,
        repository,
        clock,
        identity,
        screening,
        bureau,
        registry,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
