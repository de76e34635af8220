use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::assembler::AssemblyError;
use super::domain::{ApplicationId, ApplicationSubmission, FileRef};
use super::repository::{ApplicationRepository, FileStore, RepositoryError};
use super::service::{IntakeError, IntakeService};

/// Router builder exposing the intake endpoints.
pub fn intake_router<R, F>(service: Arc<IntakeService<R, F>>) -> Router
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            post(submit_handler::<R, F>).get(list_handler::<R, F>),
        )
        .route(
            "/api/applications/extract-ocr",
            post(extract_handler::<R, F>),
        )
        .route(
            "/api/applications/:application_id",
            get(application_handler::<R, F>),
        )
        .route(
            "/api/applications/:application_id/download",
            get(download_handler::<R, F>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtractRequest {
    #[serde(default)]
    pub(crate) document: Option<FileRef>,
}

pub(crate) async fn submit_handler<R, F>(
    State(service): State<Arc<IntakeService<R, F>>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match tokio::task::spawn_blocking(move || service.submit(submission)).await {
        Ok(Ok(receipt)) => {
            let payload = json!({
                "success": true,
                "data": receipt.application,
                "message": "Application submitted successfully",
                "verificationDetails": receipt.verification_details,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(%join_error, "submission worker aborted");
            server_error()
        }
    }
}

pub(crate) async fn list_handler<R, F>(State(service): State<Arc<IntakeService<R, F>>>) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.list() {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_handler<R, F>(
    State(service): State<Arc<IntakeService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn download_handler<R, F>(
    State(service): State<Arc<IntakeService<R, F>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    let id = ApplicationId(application_id);
    match service.download_card(&id) {
        Ok(artifact) => {
            let disposition = format!(
                "attachment; filename=bharat-peak-card-{}.{}",
                id.0, artifact.file_extension
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, artifact.content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                artifact.bytes,
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn extract_handler<R, F>(
    State(service): State<Arc<IntakeService<R, F>>>,
    Json(request): Json<ExtractRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    F: FileStore + 'static,
{
    match tokio::task::spawn_blocking(move || service.extract_document(request.document)).await {
        Ok(Ok(verification)) => {
            let payload = json!({
                "success": true,
                "extractedData": verification.extracted,
                "isVerified": verification.is_verified,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(%join_error, "extraction worker aborted");
            server_error()
        }
    }
}

fn error_response(error: IntakeError) -> Response {
    let (status, payload) = match &error {
        IntakeError::Assembly(rejection @ AssemblyError::NameMismatch { .. }) => (
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "message": rejection.title(),
                "error": rejection.to_string(),
            }),
        ),
        IntakeError::Assembly(rejection @ AssemblyError::DocumentInvalid { details }) => (
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "message": rejection.title(),
                "error": rejection.to_string(),
                "verificationDetails": details,
            }),
        ),
        IntakeError::IncompleteSubmission { .. } => (
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "message": "Invalid Submission",
                "error": error.to_string(),
            }),
        ),
        IntakeError::MissingDocument => (
            StatusCode::BAD_REQUEST,
            json!({ "message": "No document uploaded" }),
        ),
        IntakeError::PaymentRequired => (
            StatusCode::BAD_REQUEST,
            json!({ "message": "Payment required to download card." }),
        ),
        IntakeError::VerificationFailed => (
            StatusCode::BAD_REQUEST,
            json!({ "message": "Verification failed. Cannot generate card." }),
        ),
        IntakeError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({ "message": "Application not found" }),
        ),
        IntakeError::Repository(_) | IntakeError::Render(_) => {
            error!(%error, "intake request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Server Error", "error": error.to_string() }),
            )
        }
    };

    (status, Json(payload)).into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Server Error" })),
    )
        .into_response()
}
