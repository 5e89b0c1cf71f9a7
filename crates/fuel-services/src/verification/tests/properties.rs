use proptest::prelude::*;

use crate::verification::rating::{
    combine, credit_score_from_bureau, priority_for_score, RatingPolicy, SubScores,
};

fn sub_scores() -> impl Strategy<Value = SubScores> {
    (0u8..=100, 0u8..=100, 0u8..=100, 0u8..=100).prop_map(
        |(identity, compliance, credit, employment)| SubScores {
            identity,
            compliance,
            credit,
            employment,
        },
    )
}

proptest! {
    #[test]
    fn overall_score_stays_within_bounds(scores in sub_scores()) {
        let overall = combine(&scores, &RatingPolicy::default());
        prop_assert!(overall <= 100);
    }

    #[test]
    fn priority_never_drops_as_score_rises(low in 0u8..=100, high in 0u8..=100) {
        prop_assume!(low <= high);
        prop_assert!(priority_for_score(low) <= priority_for_score(high));
    }

    #[test]
    fn better_bureau_scores_never_lower_credit_score(score in 300u16..=900, bump in 0u16..=200) {
        let higher = score.saturating_add(bump);
        prop_assert!(credit_score_from_bureau(score) <= credit_score_from_bureau(higher));
    }
}
