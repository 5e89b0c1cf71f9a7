use super::super::domain::PriorityLevel;
use super::config::RatingPolicy;

pub fn priority_for_score(overall_score: u8) -> PriorityLevel {
    match overall_score {
        85..=u8::MAX => PriorityLevel::Premium,
        65..=84 => PriorityLevel::High,
        40..=64 => PriorityLevel::Standard,
        20..=39 => PriorityLevel::Restricted,
        _ => PriorityLevel::Blocked,
    }
}

/// Customers whose identity confirmation failed never rank above `Restricted`.
pub(crate) fn apply_identity_cap(level: PriorityLevel, identity_failed: bool) -> PriorityLevel {
    if identity_failed {
        level.min(PriorityLevel::Restricted)
    } else {
        level
    }
}

pub(crate) fn recommended_credit_limit(
    level: PriorityLevel,
    report_limit: f64,
    monthly_salary: f64,
    policy: &RatingPolicy,
) -> f64 {
    if level == PriorityLevel::Blocked {
        return 0.0;
    }
    report_limit
        .min(monthly_salary * policy.salary_limit_ratio)
        .max(0.0)
}
