use chrono::Duration;

use super::common::*;
use crate::verification::domain::{PepExposure, RiskLevel};
use crate::verification::VerificationError;

#[tokio::test]
async fn clean_customer_passes_with_low_risk() {
    let harness = harness();

    let result = harness
        .services
        .compliance()
        .perform_full_check(&user(), &national_id())
        .await
        .expect("screening succeeds");

    assert!(result.is_passed);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(!result.pep_status);
    assert_eq!(result.expires_at, start_of_test() + Duration::days(30));
}

#[tokio::test]
async fn domestic_pep_passes_with_high_risk() {
    let harness = harness();
    harness.screening.expose(PepExposure::Domestic);

    let result = harness
        .services
        .compliance()
        .perform_full_check(&user(), &national_id())
        .await
        .expect("screening succeeds");

    assert!(result.is_passed);
    assert!(result.pep_status);
    assert_eq!(result.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn wanted_list_match_fails_the_check() {
    let harness = harness();
    harness.screening.flag_wanted();

    let result = harness
        .services
        .compliance()
        .perform_full_check(&user(), &national_id())
        .await
        .expect("screening succeeds");

    assert!(!result.is_passed);
    assert!(result.wanted_list_match);
    assert_eq!(result.risk_level, RiskLevel::Critical);
}

#[tokio::test]
async fn last_check_expires_after_validity_window() {
    let harness = harness();
    harness
        .services
        .compliance()
        .perform_full_check(&user(), &national_id())
        .await
        .expect("screening succeeds");

    assert!(harness.services.compliance().get_last_check(&user()).is_ok());

    harness.clock.advance(Duration::days(30));
    match harness.services.compliance().get_last_check(&user()) {
        Err(VerificationError::NotFound { .. }) => {}
        other => panic!("expected expired check to be hidden, got {other:?}"),
    }
}

#[tokio::test]
async fn current_or_refresh_reuses_fresh_records() {
    let harness = harness();
    let compliance = harness.services.compliance();

    let first = compliance
        .current_or_refresh(&user(), &national_id())
        .await
        .expect("screening succeeds");
    let second = compliance
        .current_or_refresh(&user(), &national_id())
        .await
        .expect("screening succeeds");
    assert_eq!(first.id, second.id);
    assert_eq!(harness.repository.compliance_count(), 1);

    harness.clock.advance(Duration::days(31));
    let refreshed = compliance
        .current_or_refresh(&user(), &national_id())
        .await
        .expect("screening succeeds");
    assert_ne!(refreshed.id, first.id);
    assert_eq!(harness.repository.compliance_count(), 2);
}
