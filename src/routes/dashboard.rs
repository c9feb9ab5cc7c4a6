//! Staff dashboard endpoints
//!
//! ## Endpoints
//!
//! - `GET /dashboard` - overview of all three content lists (cached)
//! - `GET /dashboard/{kind}` - full list for one content type, rendered per request
//! - `GET /dashboard/{kind}/{id}` - single row
//! - `POST /dashboard/{kind}` - create
//! - `PATCH /dashboard/{kind}/{id}` - partial update
//! - `DELETE /dashboard/{kind}/{id}` - delete
//!
//! `{kind}` is `resources`, `announcements` or `events`.
//!
//! ## Authentication
//!
//! Every endpoint requires a valid session token. Demo accounts may read;
//! their mutations are refused by the action layer.

use bytes::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL, ETAG};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use super::{
    action_response, app_error_response, bytes_response, method_not_allowed, not_found_response,
    ApiRequest, FullBody,
};
use crate::auth::CurrentUser;
use crate::cache::{CacheEntry, DASHBOARD_PATH};
use crate::content::ContentRepository;
use crate::db::{StoreError, StoreResult};
use crate::models::{
    Announcement, AnnouncementPatch, ContentKind, Event, EventPatch, NewAnnouncement, NewEvent,
    NewResource, Resource, ResourcePatch,
};
use crate::server::AppState;
use crate::types::AppError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardOverview {
    resource_count: usize,
    announcement_count: usize,
    event_count: usize,
    resources: Vec<Resource>,
    announcements: Vec<Announcement>,
    events: Vec<Event>,
}

fn to_json<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StoreError::Codec(e.to_string()))
}

async fn render_overview(repo: &ContentRepository) -> StoreResult<Vec<u8>> {
    let (resources, announcements, events) = futures::try_join!(
        repo.get_all_resources(),
        repo.get_all_announcements(),
        repo.get_all_events()
    )?;

    to_json(&DashboardOverview {
        resource_count: resources.len(),
        announcement_count: announcements.len(),
        event_count: events.len(),
        resources,
        announcements,
        events,
    })
}

async fn render_list(repo: &ContentRepository, kind: ContentKind) -> StoreResult<Vec<u8>> {
    match kind {
        ContentKind::Resources => to_json(&repo.get_all_resources().await?),
        ContentKind::Announcements => to_json(&repo.get_all_announcements().await?),
        ContentKind::Events => to_json(&repo.get_all_events().await?),
    }
}

async fn render_item(repo: &ContentRepository, kind: ContentKind, id: &str) -> StoreResult<Vec<u8>> {
    match kind {
        ContentKind::Resources => to_json(&repo.get_resource_by_id(id).await?),
        ContentKind::Announcements => to_json(&repo.get_announcement_by_id(id).await?),
        ContentKind::Events => to_json(&repo.get_event_by_id(id).await?),
    }
}

fn page_response(entry: &CacheEntry, if_none_match: Option<&str>) -> Response<FullBody> {
    let mut response = if if_none_match == Some(entry.etag.as_str()) {
        bytes_response(StatusCode::NOT_MODIFIED, "application/json", Bytes::new())
    } else {
        bytes_response(
            StatusCode::OK,
            "application/json",
            Bytes::from(entry.data.clone()),
        )
    };

    let headers = response.headers_mut();
    if let Ok(etag) = HeaderValue::from_str(&entry.etag) {
        headers.insert(ETAG, etag);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("private, no-cache"));
    response
}

/// Serve `path` from the page cache, rendering it on a miss.
/// `render` is only polled on a miss.
///
/// The result is cached only if `path` was not invalidated while rendering;
/// otherwise it is served once and the next request renders again.
async fn cached_view<F>(state: &AppState, req: &ApiRequest, path: &str, render: F) -> Response<FullBody>
where
    F: Future<Output = StoreResult<Vec<u8>>>,
{
    let entry = match state.cache.get(path) {
        Some(entry) => entry,
        None => {
            let generation = state.cache.generation(path);
            match render.await {
                Ok(data) => state.cache.set_if_current(path, data, generation),
                Err(err) => return app_error_response(err.into()),
            }
        }
    };
    page_response(&entry, req.if_none_match.as_deref())
}

/// Render without caching. Still carries an ETag for conditional requests.
async fn fresh_view<F>(req: &ApiRequest, render: F) -> Response<FullBody>
where
    F: Future<Output = StoreResult<Vec<u8>>>,
{
    match render.await {
        Ok(data) => page_response(
            &CacheEntry::new(data, Duration::ZERO),
            req.if_none_match.as_deref(),
        ),
        Err(err) => app_error_response(err.into()),
    }
}

async fn create(state: &AppState, req: &ApiRequest, user: &CurrentUser, kind: ContentKind) -> Response<FullBody> {
    let actions = &state.content;
    let result = match kind {
        ContentKind::Resources => match req.json::<NewResource>() {
            Ok(input) => actions.create_resource(user, input).await,
            Err(response) => return response,
        },
        ContentKind::Announcements => match req.json::<NewAnnouncement>() {
            Ok(input) => actions.create_announcement(user, input).await,
            Err(response) => return response,
        },
        ContentKind::Events => match req.json::<NewEvent>() {
            Ok(input) => actions.create_event(user, input).await,
            Err(response) => return response,
        },
    };
    action_response(&result)
}

async fn update(
    state: &AppState,
    req: &ApiRequest,
    user: &CurrentUser,
    kind: ContentKind,
    id: &str,
) -> Response<FullBody> {
    let actions = &state.content;
    let result = match kind {
        ContentKind::Resources => match req.json::<ResourcePatch>() {
            Ok(patch) => actions.update_resource(user, id, patch).await,
            Err(response) => return response,
        },
        ContentKind::Announcements => match req.json::<AnnouncementPatch>() {
            Ok(patch) => actions.update_announcement(user, id, patch).await,
            Err(response) => return response,
        },
        ContentKind::Events => match req.json::<EventPatch>() {
            Ok(patch) => actions.update_event(user, id, patch).await,
            Err(response) => return response,
        },
    };
    action_response(&result)
}

async fn delete(state: &AppState, user: &CurrentUser, kind: ContentKind, id: &str) -> Response<FullBody> {
    let actions = &state.content;
    let result = match kind {
        ContentKind::Resources => actions.delete_resource(user, id).await,
        ContentKind::Announcements => actions.delete_announcement(user, id).await,
        ContentKind::Events => actions.delete_event(user, id).await,
    };
    action_response(&result)
}

pub async fn handle_dashboard_request(
    state: &AppState,
    req: &ApiRequest,
    path: &str,
) -> Response<FullBody> {
    let user = req.current_user(state);
    if !user.is_authenticated() {
        return app_error_response(AppError::NoSession);
    }

    let repo = state.content.repository();
    let subpath = path.strip_prefix(DASHBOARD_PATH).unwrap_or("");
    let segments: Vec<&str> = subpath.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return match req.method {
            Method::GET => cached_view(state, req, DASHBOARD_PATH, render_overview(repo)).await,
            _ => method_not_allowed(),
        };
    }

    let Some(kind) = ContentKind::from_segment(segments[0]) else {
        return not_found_response(path);
    };

    match (&req.method, &segments[1..]) {
        (&Method::GET, []) => fresh_view(req, render_list(repo, kind)).await,
        (&Method::POST, []) => create(state, req, &user, kind).await,
        (&Method::GET, [id]) => match render_item(repo, kind, id).await {
            Ok(json) => bytes_response(StatusCode::OK, "application/json", Bytes::from(json)),
            Err(err) => app_error_response(err.into()),
        },
        (&Method::PATCH, [id]) => update(state, req, &user, kind, id).await,
        (&Method::DELETE, [id]) => delete(state, &user, kind, id).await,
        (_, [] | [_]) => method_not_allowed(),
        _ => not_found_response(path),
    }
}
