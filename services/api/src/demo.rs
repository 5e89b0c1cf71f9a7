use crate::infra::{parse_national_id_arg, parse_user_id_arg, InMemoryVerificationRepository};
use clap::Args;
use fuel_services::config::VerificationConfig;
use fuel_services::error::AppError;
use fuel_services::verification::{
    CustomerRating, NationalId, ProviderSet, RatingPolicy, SystemClock, UserId,
    VerificationServices,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Ten digit national or resident id. Suffixes 999 and 888 trigger screening matches.
    #[arg(long, value_parser = parse_national_id_arg)]
    pub(crate) national_id: NationalId,
    /// Customer UUID. A fixed demo id is used when omitted.
    #[arg(long, value_parser = parse_user_id_arg)]
    pub(crate) user_id: Option<UserId>,
    /// Approve the Nafath confirmation before scoring.
    #[arg(long)]
    pub(crate) approve_identity: bool,
}

const DEMO_USER_ID: &str = "00000000-0000-4000-8000-000000000001";

pub(crate) async fn run_evaluation(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        national_id,
        user_id,
        approve_identity,
    } = args;
    let user_id = user_id.unwrap_or_else(|| UserId(DEMO_USER_ID.to_string()));

    let services = VerificationServices::new(
        Arc::new(InMemoryVerificationRepository::default()),
        ProviderSet::simulated(),
        Arc::new(SystemClock),
        &VerificationConfig::default(),
        RatingPolicy::default(),
    );

    println!("Customer verification for {national_id}");

    if approve_identity {
        let initiated = services.identity().initiate(&user_id, &national_id).await?;
        println!(
            "- nafath request {} sent (code {})",
            initiated.request_id, initiated.random_code
        );
        let confirmed = services
            .identity()
            .simulate_confirmation(&initiated.request_id, true)
            .await?;
        println!(
            "- identity {} as {}",
            confirmed.status.label(),
            confirmed.verified_name.as_deref().unwrap_or("unknown")
        );
    } else {
        println!("- identity not confirmed (pass --approve-identity to simulate approval)");
    }

    let rating = services
        .rating()
        .perform_full_evaluation(&user_id, &national_id)
        .await?;
    render_rating(&rating);
    Ok(())
}

fn render_rating(rating: &CustomerRating) {
    if let Some(veto) = rating.veto {
        println!("\nBlocked by compliance veto: {veto:?}");
    }

    println!(
        "\nOverall score {} -> {} ({} month installments)",
        rating.overall_score,
        rating.priority_level.label(),
        rating.max_installment_months
    );
    println!(
        "- identity {:>3} | compliance {:>3} | credit {:>3} | employment {:>3}",
        rating.identity_score, rating.compliance_score, rating.credit_score, rating.employment_score
    );
    println!(
        "- nafath verified: {} | age verified: {} | kyc passed: {} | credit approved: {} | employee: {}",
        rating.nafath_verified,
        rating.age_verified,
        rating.kyc_passed,
        rating.credit_approved,
        rating.is_employee
    );
    println!(
        "- recommended credit limit: {:.2} SAR",
        rating.recommended_credit_limit
    );

    let eligibility = rating.eligibility();
    println!(
        "Eligible for installments: {}",
        if eligibility.eligible { "yes" } else { "no" }
    );
}
