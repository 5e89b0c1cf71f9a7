use super::super::domain::{ComplianceResult, RiskLevel};
use super::config::RatingPolicy;

/// Per-area scores feeding the weighted total, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubScores {
    pub identity: u8,
    pub compliance: u8,
    pub credit: u8,
    pub employment: u8,
}

pub fn credit_score_from_bureau(score: u16) -> u8 {
    match score {
        800..=u16::MAX => 100,
        750..=799 => 90,
        700..=749 => 80,
        650..=699 => 70,
        600..=649 => 55,
        550..=599 => 40,
        500..=549 => 25,
        _ => 10,
    }
}

pub fn compliance_score(result: &ComplianceResult) -> u8 {
    if !result.is_passed {
        return 0;
    }
    match result.risk_level {
        RiskLevel::Low => 100,
        RiskLevel::Medium => 75,
        RiskLevel::High => 50,
        RiskLevel::Critical => 0,
    }
}

pub fn identity_score(verified: bool, age_verified: bool) -> u8 {
    if verified && age_verified {
        100
    } else {
        40
    }
}

/// Weighted total rounded to the nearest integer.
pub fn combine(scores: &SubScores, policy: &RatingPolicy) -> u8 {
    let total = f64::from(scores.credit) * policy.credit_weight
        + f64::from(scores.employment) * policy.employment_weight
        + f64::from(scores.compliance) * policy.compliance_weight
        + f64::from(scores.identity) * policy.identity_weight;
    total.round().clamp(0.0, 100.0) as u8
}
