//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Domain errors from the processing
//! crate convert into `AppError` here so they render consistently (status,
//! body, logging).

use axum::{
    extract::{multipart::MultipartError, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vidpress_core::{AppError, ErrorMetadata, LogLevel, PlanError};
use vidpress_processing::{AdmissionError, PipelineError};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Wait 30-60 seconds and retry")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from vidpress-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError(err.into())
    }
}

impl From<PlanError> for HttpAppError {
    fn from(err: PlanError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        let app = match err {
            PipelineError::Probe(msg) => AppError::MetadataProbe(msg),
            PipelineError::Plan(e) => e.into(),
            PipelineError::Encode(msg) => AppError::Compression(msg),
            PipelineError::Thumbnail(msg) => AppError::Thumbnail(msg),
            PipelineError::Archive(msg) => AppError::Archive(msg),
            PipelineError::Timeout { stage, seconds } => AppError::ToolTimeout {
                operation: stage.to_string(),
                seconds,
            },
            PipelineError::Io { stage, source } => {
                AppError::Internal(format!("IO error during {}: {}", stage, source))
            }
        };
        HttpAppError(app)
    }
}

impl From<AdmissionError> for HttpAppError {
    fn from(err: AdmissionError) -> Self {
        HttpAppError(AppError::ServerBusy(format!(
            "Server is busy compressing other videos ({})",
            err
        )))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// The detail-free body of an error response, attached as a response
/// extension whenever the rendered body carries diagnostics.
#[derive(Debug, Clone)]
pub struct RedactedErrorBody(pub ErrorResponse);

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let redacted = ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        if app_error.is_sensitive() {
            return (status, Json(redacted)).into_response();
        }

        let detailed = ErrorResponse {
            details: Some(app_error.detailed_message()),
            error_type: Some(app_error.error_type().to_string()),
            ..redacted.clone()
        };
        let mut response = (status, Json(detailed)).into_response();
        response.extensions_mut().insert(RedactedErrorBody(redacted));
        response
    }
}

/// Production middleware: swap detailed error bodies for their redacted form.
pub async fn redact_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let redacted = response.extensions().get::<RedactedErrorBody>().cloned();
    match redacted {
        Some(RedactedErrorBody(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidpress_core::PipelineStage;

    fn status_of(err: impl Into<HttpAppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn pipeline_errors_map_to_statuses() {
        assert_eq!(
            status_of(PipelineError::Probe("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PipelineError::Plan(PlanError::InvalidDuration(0.0))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(PipelineError::Encode("bad".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PipelineError::Timeout {
                stage: PipelineStage::Transcoding,
                seconds: 600
            }),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn admission_errors_are_service_unavailable() {
        assert_eq!(
            status_of(AdmissionError::Saturated { slots: 2 }),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn detailed_errors_carry_a_redacted_copy() {
        let response =
            HttpAppError(AppError::InvalidInput("quality out of range".into())).into_response();
        let RedactedErrorBody(body) = response
            .extensions()
            .get::<RedactedErrorBody>()
            .cloned()
            .unwrap();
        assert_eq!(body.error, "quality out of range");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
    }

    #[test]
    fn sensitive_errors_never_carry_details() {
        let response = HttpAppError(AppError::Compression("x264 crashed".into())).into_response();
        assert!(response.extensions().get::<RedactedErrorBody>().is_none());
    }

    #[test]
    fn timeout_names_the_stage() {
        let HttpAppError(app) = PipelineError::Timeout {
            stage: PipelineStage::Probing,
            seconds: 30,
        }
        .into();
        assert_eq!(app.client_message(), "probing did not finish within 30s");
    }
}
