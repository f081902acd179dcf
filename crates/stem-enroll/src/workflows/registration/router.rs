use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::directory::ReferenceDirectory;
use super::domain::ApplicantId;
use super::service::{RegistrationService, StepFields, SubmissionError};
use super::state::RegistrationForm;
use super::store::RegistrationStore;

/// Router exposing the two-operation contract: step submission and final
/// submission. The form travels in the request and response bodies; the
/// service keeps no session state.
pub fn registration_router<S, D>(service: Arc<RegistrationService<S, D>>) -> Router
where
    S: RegistrationStore + 'static,
    D: ReferenceDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/registration/steps/:step",
            post(step_handler::<S, D>),
        )
        .route("/api/v1/registration/submit", post(submit_handler::<S, D>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    #[serde(default)]
    form: RegistrationForm,
    fields: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct StepResponse {
    form: RegistrationForm,
    advance: bool,
    errors: Vec<String>,
}

pub(crate) async fn step_handler<S, D>(
    State(service): State<Arc<RegistrationService<S, D>>>,
    Path(step): Path<u8>,
    axum::Json(request): axum::Json<StepRequest>,
) -> Response
where
    S: RegistrationStore + 'static,
    D: ReferenceDirectory + 'static,
{
    let fields = match step {
        1 => serde_json::from_value(request.fields).map(StepFields::One),
        2 => serde_json::from_value(request.fields).map(StepFields::Two),
        3 => serde_json::from_value(request.fields).map(StepFields::Three),
        _ => {
            let payload = json!({ "error": format!("unknown step {step}") });
            return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
        }
    };

    let fields = match fields {
        Ok(fields) => fields,
        Err(error) => {
            let payload = json!({ "error": format!("invalid fields for step {step}: {error}") });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.submit_step(request.form, fields).await {
        Ok((form, outcome)) => {
            // Duplicate email gets its own status so callers can branch to
            // a log-in / different-email path.
            let status = if outcome.duplicate_email() {
                StatusCode::CONFLICT
            } else {
                StatusCode::OK
            };
            let body = StepResponse {
                form,
                advance: outcome.advance,
                errors: outcome.errors(),
            };
            (status, axum::Json(body)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    form: RegistrationForm,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    form: RegistrationForm,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    applicant_id: Option<ApplicantId>,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    support_notice: Option<String>,
}

pub(crate) async fn submit_handler<S, D>(
    State(service): State<Arc<RegistrationService<S, D>>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    S: RegistrationStore + 'static,
    D: ReferenceDirectory + 'static,
{
    let (form, result) = service.submit_final(request.form).await;

    match result {
        Ok(receipt) => {
            let body = SubmitResponse {
                form,
                success: true,
                applicant_id: Some(receipt.applicant_id),
                errors: Vec::new(),
                support_notice: None,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(SubmissionError::Invalid(issues)) => {
            let body = SubmitResponse {
                form,
                success: false,
                applicant_id: None,
                errors: issues.iter().map(ToString::to_string).collect(),
                support_notice: None,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
        }
        Err(SubmissionError::BasicRecordSaved { support }) => {
            let error = SubmissionError::BasicRecordSaved {
                support: support.clone(),
            };
            let body = SubmitResponse {
                form,
                success: false,
                applicant_id: None,
                errors: vec![error.to_string()],
                support_notice: Some(support),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
        Err(other) => {
            let body = SubmitResponse {
                form,
                success: false,
                applicant_id: None,
                errors: vec![other.to_string()],
                support_notice: None,
            };
            (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response()
        }
    }
}
