use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::domain::{RequestId, UserId};
use super::error::VerificationError;
use super::repository::VerificationRepository;
use super::service::VerificationServices;
use super::validation::{
    parse_user_id, CreditEvaluateBody, FieldError, SimulateBody, SubjectBody, ValidationErrors,
};

type Services<R> = State<Arc<VerificationServices<R>>>;

/// Router builder exposing the identity, compliance, credit, employment, and rating endpoints.
pub fn verification_router<R>(services: Arc<VerificationServices<R>>) -> Router
where
    R: VerificationRepository + 'static,
{
    Router::new()
        .route("/api/verification/nafath/initiate", post(initiate_handler::<R>))
        .route(
            "/api/verification/nafath/status/:request_id",
            get(identity_status_handler::<R>),
        )
        .route("/api/verification/nafath/simulate", post(simulate_handler::<R>))
        .route("/api/verification/age/:user_id", get(age_handler::<R>))
        .route(
            "/api/verification/compliance/check",
            post(compliance_check_handler::<R>),
        )
        .route(
            "/api/verification/compliance/:user_id",
            get(last_compliance_handler::<R>),
        )
        .route("/api/verification/credit/report", post(credit_report_handler::<R>))
        .route(
            "/api/verification/credit/evaluate",
            post(credit_evaluate_handler::<R>),
        )
        .route(
            "/api/verification/credit/defaults/:user_id",
            get(credit_defaults_handler::<R>),
        )
        .route(
            "/api/verification/employment/verify",
            post(employment_verify_handler::<R>),
        )
        .route(
            "/api/verification/employment/priority/:user_id",
            get(employment_priority_handler::<R>),
        )
        .route(
            "/api/verification/customer/evaluate",
            post(customer_evaluate_handler::<R>),
        )
        .route(
            "/api/verification/customer/rating/:user_id",
            get(customer_rating_handler::<R>),
        )
        .route(
            "/api/verification/customer/eligibility/:user_id",
            get(customer_eligibility_handler::<R>),
        )
        .with_state(services)
}

pub(crate) fn validation_response(errors: ValidationErrors) -> Response {
    let payload = json!({
        "error": "invalid request",
        "details": errors.errors,
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) fn rejection_response(rejection: JsonRejection) -> Response {
    validation_response(FieldError::new("body", rejection.body_text()).into())
}

pub(crate) fn error_response(error: VerificationError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        warn!(error = %error, "verification request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, VerificationError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

fn path_user(raw: &str) -> Result<UserId, Response> {
    parse_user_id("userId", raw).map_err(|error| validation_response(error.into()))
}

macro_rules! validated {
    ($body:expr) => {
        match $body {
            Ok(Json(body)) => match body.validate() {
                Ok(request) => request,
                Err(errors) => return validation_response(errors),
            },
            Err(rejection) => return rejection_response(rejection),
        }
    };
}

macro_rules! path_user {
    ($raw:expr) => {
        match path_user(&$raw) {
            Ok(user_id) => user_id,
            Err(response) => return response,
        }
    };
}

pub(crate) async fn initiate_handler<R>(
    State(services): Services<R>,
    body: Result<Json<SubjectBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let result = services
        .identity()
        .initiate(&request.user_id, &request.national_id)
        .await;
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn identity_status_handler<R>(
    State(services): Services<R>,
    Path(request_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request_id = RequestId(request_id);
    respond(
        StatusCode::OK,
        services.identity().check_status(&request_id).await,
    )
}

pub(crate) async fn simulate_handler<R>(
    State(services): Services<R>,
    body: Result<Json<SimulateBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let result = services
        .identity()
        .simulate_confirmation(&request.request_id, request.approved)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn age_handler<R>(
    State(services): Services<R>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let user_id = path_user!(user_id);
    respond(StatusCode::OK, services.identity().verify_age(&user_id))
}

pub(crate) async fn compliance_check_handler<R>(
    State(services): Services<R>,
    body: Result<Json<SubjectBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let result = services
        .compliance()
        .perform_full_check(&request.user_id, &request.national_id)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn last_compliance_handler<R>(
    State(services): Services<R>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let user_id = path_user!(user_id);
    respond(StatusCode::OK, services.compliance().get_last_check(&user_id))
}

pub(crate) async fn credit_report_handler<R>(
    State(services): Services<R>,
    body: Result<Json<SubjectBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let result = services
        .credit()
        .get_credit_report(&request.user_id, &request.national_id)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn credit_evaluate_handler<R>(
    State(services): Services<R>,
    body: Result<Json<CreditEvaluateBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let result = services
        .credit()
        .evaluate_credit_eligibility(&request.user_id, request.requested_amount)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn credit_defaults_handler<R>(
    State(services): Services<R>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let user_id = path_user!(user_id);
    respond(
        StatusCode::OK,
        services.credit().has_defaulted_loans(&user_id).await,
    )
}

pub(crate) async fn employment_verify_handler<R>(
    State(services): Services<R>,
    body: Result<Json<SubjectBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let result = services
        .employment()
        .verify_employment(&request.user_id, &request.national_id)
        .await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn employment_priority_handler<R>(
    State(services): Services<R>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let user_id = path_user!(user_id);
    respond(
        StatusCode::OK,
        services.employment().calculate_priority(&user_id),
    )
}

pub(crate) async fn customer_evaluate_handler<R>(
    State(services): Services<R>,
    body: Result<Json<SubjectBody>, JsonRejection>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let request = validated!(body);
    let limit = services.evaluation_timeout();
    let evaluation = services
        .rating()
        .perform_full_evaluation(&request.user_id, &request.national_id);

    let result = match tokio::time::timeout(limit, evaluation).await {
        Ok(result) => result,
        Err(_) => Err(VerificationError::TimedOut(limit.as_secs())),
    };
    respond(StatusCode::OK, result)
}

pub(crate) async fn customer_rating_handler<R>(
    State(services): Services<R>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let user_id = path_user!(user_id);
    respond(StatusCode::OK, services.rating().get_rating(&user_id))
}

pub(crate) async fn customer_eligibility_handler<R>(
    State(services): Services<R>,
    Path(user_id): Path<String>,
) -> Response
where
    R: VerificationRepository + 'static,
{
    let user_id = path_user!(user_id);
    respond(
        StatusCode::OK,
        services.rating().quick_eligibility_check(&user_id),
    )
}
