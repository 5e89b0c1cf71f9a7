use serde::{Deserialize, Serialize};

/// Weights and ratios applied when combining the sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPolicy {
    pub credit_weight: f64,
    pub employment_weight: f64,
    pub compliance_weight: f64,
    pub identity_weight: f64,
    /// Share of monthly salary usable as a credit line.
    pub salary_limit_ratio: f64,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self {
            credit_weight: 0.35,
            employment_weight: 0.25,
            compliance_weight: 0.20,
            identity_weight: 0.20,
            salary_limit_ratio: 0.5,
        }
    }
}
