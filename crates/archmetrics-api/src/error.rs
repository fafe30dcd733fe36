use archmetrics_core::ArchMetricsError;
use archmetrics_github::GitHubError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    ArchMetrics(#[from] ArchMetricsError),
}

impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        ApiError::ArchMetrics(err.into())
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ArchMetrics(err) => match err {
                ArchMetricsError::MissingCredential { .. }
                | ArchMetricsError::MalformedArchitecture(_)
                | ArchMetricsError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
                ArchMetricsError::OrganizationNotFound { .. } => StatusCode::NOT_FOUND,
                ArchMetricsError::Http { .. }
                | ArchMetricsError::Transport(_)
                | ArchMetricsError::Fetch(_) => StatusCode::BAD_GATEWAY,
                ArchMetricsError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                ArchMetricsError::Export(_)
                | ArchMetricsError::Io(_)
                | ArchMetricsError::Serialization(_)
                | ArchMetricsError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
