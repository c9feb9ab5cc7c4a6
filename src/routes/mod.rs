//! HTTP route handlers
//!
//! ## Endpoints
//!
//! - `GET /health`, `/healthz` - liveness and build info
//! - `GET /api/resources[?category=]`, `/api/announcements`, `/api/events` - public reads
//! - `POST /api/contact` - contact form
//! - `/dashboard/*` - signed-in staff views and mutations
//! - `POST /auth/*` - sign in, sign out, password recovery
//!
//! Handlers take an [`ApiRequest`] whose body has already been read, so they
//! can be driven without a socket.

pub mod auth_routes;
pub mod dashboard;
pub mod health;
pub mod public;

pub use health::{health_check, HealthResponse};

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::actions::ActionResult;
use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::types::AppError;

pub type FullBody = Full<Bytes>;

/// A request with its body collected
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub if_none_match: Option<String>,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: None,
            authorization: None,
            if_none_match: None,
            body: Bytes::new(),
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.authorization = Some(format!("Bearer {}", token));
        self
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Bytes::from(serde_json::to_vec(body).unwrap_or_default());
        self
    }

    /// Caller resolved from the Authorization header
    pub fn current_user(&self, state: &AppState) -> CurrentUser {
        CurrentUser::resolve(&state.jwt, self.authorization.as_deref())
    }

    /// Deserialize the JSON body, or a 400 response
    #[allow(clippy::result_large_err)]
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Response<FullBody>> {
        serde_json::from_slice(&self.body).map_err(|e| app_error_response(AppError::from(e)))
    }
}

/// Dispatch a collected request to its handler
pub async fn route(state: &AppState, req: ApiRequest) -> Response<FullBody> {
    let path = req.path.clone();

    match (&req.method, path.as_str()) {
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => health_check(state),

        (&Method::OPTIONS, _) => preflight_response(),

        (_, p) if p.starts_with("/api/") => public::handle_public_request(state, &req, p).await,

        (_, p) if p == "/dashboard" || p.starts_with("/dashboard/") => {
            dashboard::handle_dashboard_request(state, &req, p).await
        }

        (_, p) if p.starts_with("/auth/") => auth_routes::handle_auth_request(state, &req, p).await,

        _ => not_found_response(&path),
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub fn bytes_response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<FullBody> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    bytes_response(status, "application/json", Bytes::from(json))
}

pub fn error_response(status: StatusCode, error: &str, code: Option<&str>) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
        },
    )
}

/// JSON error body for an [`AppError`]. Server-side failures are logged
/// with their full detail; the caller only sees the public message.
pub fn app_error_response(err: AppError) -> Response<FullBody> {
    if err.is_server_error() {
        error!(code = err.code(), "Request failed: {}", err);
    }
    let code = err.code();
    let (status, message) = err.into_status_code_and_body();
    error_response(status, &message, Some(code))
}

pub fn not_found_response(path: &str) -> Response<FullBody> {
    app_error_response(AppError::NotFound(path.to_string()))
}

pub fn method_not_allowed() -> Response<FullBody> {
    app_error_response(AppError::MethodNotAllowed)
}

/// 200 with `{"success":true}` or 400 with `{"error":...}`
pub fn action_response(result: &ActionResult) -> Response<FullBody> {
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    json_response(status, result)
}

fn preflight_response() -> Response<FullBody> {
    let mut response = bytes_response(StatusCode::NO_CONTENT, "text/plain", Bytes::new());
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, PATCH, DELETE, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Authorization, Content-Type, If-None-Match"),
    );
    response
}
