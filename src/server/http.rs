//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Request bodies are
//! collected up front and handed to [`routes::route`].

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{AUTHORIZATION, IF_NONE_MATCH};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::actions::{AuthActions, ContentActions};
use crate::auth::JwtValidator;
use crate::cache::{self, PageCache};
use crate::config::Args;
use crate::routes::{self, ApiRequest};
use crate::types::AppError;

/// Where content rows live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    MongoDb,
    Memory,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MongoDb => "mongodb",
            Self::Memory => "memory",
        }
    }
}

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Validates session tokens on incoming requests
    pub jwt: JwtValidator,
    pub content: ContentActions,
    pub auth: AuthActions,
    /// Rendered dashboard surfaces
    pub cache: Arc<PageCache>,
    pub storage: StorageMode,
}

impl AppState {
    pub fn new(
        args: Args,
        jwt: JwtValidator,
        content: ContentActions,
        auth: AuthActions,
        cache: Arc<PageCache>,
        storage: StorageMode,
    ) -> Self {
        Self {
            args,
            jwt,
            content,
            auth,
            cache,
            storage,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), AppError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("CommonGround listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - local auth provider, in-memory fallbacks");
    }

    cache::spawn_cleanup_task(Arc::clone(&state.cache));
    info!(
        "Page cache enabled (max {} entries)",
        state.cache.config().max_entries
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

fn header_string(req: &Request<Incoming>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Collect the body and route
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let query = req.uri().query().map(str::to_string);
    let authorization = header_string(&req, AUTHORIZATION);
    let if_none_match = header_string(&req, IF_NONE_MATCH);

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Request body error: {}", e);
            return Ok(routes::error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
                Some("INVALID_BODY"),
            ));
        }
    };

    let api_request = ApiRequest {
        method,
        path,
        query,
        authorization,
        if_none_match,
        body,
    };

    Ok(routes::route(&state, api_request).await)
}
