//! Deterministic bureau stand-ins.
//!
//! Every value is derived from the national id digits so repeated calls for the
//! same id always agree. Suffix conventions used by demos and tests:
//!
//! | suffix | effect |
//! | --- | --- |
//! | `999` | sanctions match |
//! | `888` | wanted-list match |
//! | `77` | senior foreign PEP |
//! | `7` | domestic PEP |
//! | `5` | PEP associate |

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::{
    BureauReport, ComplianceProvider, ConfirmationTicket, CreditBureau, EmploymentProfile,
    EmploymentRegistry, IdentityProfile, IdentityProvider, ProviderConfirmation, ProviderError,
};
use crate::verification::domain::{EmployerType, NationalId, PepExposure};

const GIVEN_NAMES: [&str; 10] = [
    "Abdullah", "Fahad", "Noura", "Sara", "Khalid", "Reem", "Turki", "Lama", "Faisal", "Hessa",
];
const FAMILY_NAMES: [&str; 5] = ["Al-Qahtani", "Al-Otaibi", "Al-Harbi", "Al-Shehri", "Al-Dosari"];

fn digits(national_id: &NationalId) -> Result<[u32; 10], ProviderError> {
    let collected: Vec<u32> = national_id.digits().collect();
    collected
        .try_into()
        .map_err(|_| ProviderError::InvalidResponse {
            provider: "simulator",
            message: format!("national id {national_id} is not ten digits"),
        })
}

fn pair(high: u32, low: u32) -> u32 {
    high * 10 + low
}

/// Nafath stand-in. Confirmations stay pending until forced through the simulate path.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedNafath;

#[async_trait]
impl IdentityProvider for SimulatedNafath {
    async fn request_confirmation(
        &self,
        national_id: &NationalId,
    ) -> Result<ConfirmationTicket, ProviderError> {
        let d = digits(national_id)?;
        let sum: u32 = d.iter().sum();
        Ok(ConfirmationTicket {
            transaction_id: Uuid::new_v4().to_string(),
            random_code: format!("{:02}", sum % 100),
        })
    }

    async fn confirmation_status(
        &self,
        _transaction_id: &str,
    ) -> Result<ProviderConfirmation, ProviderError> {
        Ok(ProviderConfirmation::Pending)
    }

    async fn identity_profile(
        &self,
        national_id: &NationalId,
    ) -> Result<IdentityProfile, ProviderError> {
        let d = digits(national_id)?;
        // A 9 in the second position produces a minor.
        let year = if d[1] == 9 {
            2010 + (d[3] % 5) as i32
        } else {
            1965 + (pair(d[2], d[3]) % 40) as i32
        };
        let month = pair(d[4], d[5]) % 12 + 1;
        let day = pair(d[6], d[7]) % 28 + 1;
        let date_of_birth =
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                ProviderError::InvalidResponse {
                    provider: "nafath",
                    message: format!("derived invalid birth date {year}-{month}-{day}"),
                }
            })?;

        let given = GIVEN_NAMES[d[9] as usize % GIVEN_NAMES.len()];
        let family = FAMILY_NAMES[d[8] as usize % FAMILY_NAMES.len()];

        Ok(IdentityProfile {
            full_name: format!("{given} {family}"),
            date_of_birth,
        })
    }
}

/// AML screening stand-in covering sanctions, PEP, and wanted lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedScreening;

#[async_trait]
impl ComplianceProvider for SimulatedScreening {
    async fn screen_sanctions(&self, national_id: &NationalId) -> Result<bool, ProviderError> {
        digits(national_id)?;
        Ok(national_id.0.ends_with("999"))
    }

    async fn screen_pep(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<PepExposure>, ProviderError> {
        digits(national_id)?;
        let exposure = if national_id.0.ends_with("77") {
            Some(PepExposure::SeniorForeign)
        } else if national_id.0.ends_with('7') {
            Some(PepExposure::Domestic)
        } else if national_id.0.ends_with('5') {
            Some(PepExposure::Associate)
        } else {
            None
        };
        Ok(exposure)
    }

    async fn screen_wanted_list(&self, national_id: &NationalId) -> Result<bool, ProviderError> {
        digits(national_id)?;
        Ok(national_id.0.ends_with("888"))
    }
}

/// SIMAH stand-in producing scores between 400 and 850.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedCreditBureau;

#[async_trait]
impl CreditBureau for SimulatedCreditBureau {
    async fn fetch_report(&self, national_id: &NationalId) -> Result<BureauReport, ProviderError> {
        let d = digits(national_id)?;
        let seed = d[6] * 1000 + d[7] * 100 + d[8] * 10 + d[9];
        let score = (400 + seed % 451) as u16;

        let active_loans = seed % 3;
        let delayed_payments = if score < 600 { seed % 4 } else { 0 };
        let defaulted_loans = u32::from(score < 480);
        let credit_utilization = if active_loans > 0 {
            f64::from(seed % 70) / 100.0
        } else {
            0.0
        };

        Ok(BureauReport {
            score,
            total_debts: f64::from(active_loans) * 4_500.0,
            active_loans,
            delayed_payments,
            defaulted_loans,
            credit_utilization,
        })
    }
}

/// GOSI stand-in. Residents (ids starting with 2) are never government employees.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedGosiRegistry;

#[async_trait]
impl EmploymentRegistry for SimulatedGosiRegistry {
    async fn lookup_employment(
        &self,
        national_id: &NationalId,
    ) -> Result<Option<EmploymentProfile>, ProviderError> {
        let d = digits(national_id)?;
        let employer_type = match d[8] {
            0..=2 if d[0] == 1 => EmployerType::Government,
            0..=2 => EmployerType::PrivateLarge,
            3 => EmployerType::SemiGovernment,
            4 | 5 => EmployerType::PrivateLarge,
            6 => EmployerType::PrivateSme,
            7 => EmployerType::SelfEmployed,
            8 => EmployerType::Freelancer,
            _ => return Ok(None),
        };

        let employer_name = match employer_type {
            EmployerType::Government => "Ministry of Energy",
            EmployerType::SemiGovernment => "Saudi Electricity Company",
            EmployerType::PrivateLarge => "Gulf Logistics Group",
            EmployerType::PrivateSme => "Najd Auto Services",
            EmployerType::SelfEmployed => "Own establishment",
            EmployerType::Freelancer => "Freelance permit",
            EmployerType::Unemployed => "",
        };

        Ok(Some(EmploymentProfile {
            employer_name: employer_name.to_string(),
            employer_type,
            monthly_salary: f64::from(4_000 + pair(d[6], d[7]) * 300),
            gosi_registered: employer_type.is_salaried(),
        }))
    }
}
