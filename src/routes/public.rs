//! Public site reads and the contact form
//!
//! - `GET /api/resources[?category=Food]` - active resources
//! - `GET /api/announcements` - active announcements
//! - `GET /api/events` - upcoming events
//! - `POST /api/contact` - contact form submission

use hyper::{Method, Response, StatusCode};
use serde::Deserialize;

use super::{
    action_response, app_error_response, json_response, method_not_allowed, not_found_response,
    ApiRequest, FullBody,
};
use crate::db::StoreError;
use crate::models::{NewContactSubmission, ResourceCategory};
use crate::server::AppState;
use crate::types::AppError;

#[derive(Debug, Default, Deserialize)]
struct ResourceQuery {
    category: Option<String>,
}

/// Parse `?category=` into a category filter; blank means no filter
fn parse_category(query: Option<&str>) -> Result<Option<ResourceCategory>, AppError> {
    let params: ResourceQuery = match query {
        Some(q) => serde_urlencoded::from_str(q)?,
        None => ResourceQuery::default(),
    };

    match params.category.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Ok(Some(raw.parse::<ResourceCategory>()?)),
    }
}

fn list_response<T: serde::Serialize>(result: Result<Vec<T>, StoreError>) -> Response<FullBody> {
    match result {
        Ok(rows) => json_response(StatusCode::OK, &rows),
        Err(err) => app_error_response(err.into()),
    }
}

pub async fn handle_public_request(
    state: &AppState,
    req: &ApiRequest,
    path: &str,
) -> Response<FullBody> {
    let repo = state.content.repository();

    match (&req.method, path) {
        (&Method::GET, "/api/resources") => match parse_category(req.query.as_deref()) {
            Ok(category) => list_response(repo.get_active_resources(category).await),
            Err(err) => app_error_response(err),
        },
        (&Method::GET, "/api/announcements") => {
            list_response(repo.get_active_announcements().await)
        }
        (&Method::GET, "/api/events") => list_response(repo.get_upcoming_events().await),
        (&Method::POST, "/api/contact") => match req.json::<NewContactSubmission>() {
            Ok(input) => action_response(&state.content.submit_contact_form(input).await),
            Err(response) => response,
        },
        (_, "/api/resources" | "/api/announcements" | "/api/events" | "/api/contact") => {
            method_not_allowed()
        }
        _ => not_found_response(path),
    }
}
