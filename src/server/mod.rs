//! JSON API server over the content store

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::{BlogPost, ContactSubmission, NewContact, NewPost, PostPatch, SiteSetting};
use crate::store::{ContentStore, DashboardStats, StoreError};

/// Header carrying the caller's user id for admin routes
pub const USER_HEADER: &str = "x-user-id";

/// Server state
struct ServerState {
    store: ContentStore,
}

type SharedState = Arc<ServerState>;

/// Errors returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),
}

type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Store(err) => {
                let status = match err {
                    StoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                    StoreError::Transport(_) => StatusCode::BAD_GATEWAY,
                    StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "Store error");
                }
                (status, err.code(), err.to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

/// Build the API router around a store
pub fn router(store: ContentStore) -> Router {
    let state = Arc::new(ServerState { store });

    Router::new()
        .route("/api/health", get(health))
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/slug/:slug", get(get_post_by_slug))
        .route(
            "/api/posts/:id",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/api/posts/:id/publish", post(publish_post))
        .route("/api/settings", get(list_settings))
        .route("/api/settings/:key", get(get_setting).put(update_setting))
        .route("/api/contact", get(list_contacts).post(submit_contact))
        .route("/api/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start(store: ContentStore, ip: &str, port: u16) -> Result<()> {
    let mode = store.mode();
    let app = router(store);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Content API running at http://{}:{} ({} mode)", ip, port, mode);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn user_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Resolve the caller and make sure they hold the admin role
async fn require_admin(state: &ServerState, headers: &HeaderMap) -> ApiResult<String> {
    let user = user_id(headers)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", USER_HEADER)))?;
    if !state.store.check_admin_role(user).await {
        tracing::warn!("Rejected non-admin user {}", user);
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }
    Ok(user.to_string())
}

async fn is_admin(state: &ServerState, headers: &HeaderMap) -> bool {
    match user_id(headers) {
        Some(user) => state.store.check_admin_role(user).await,
        None => false,
    }
}

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "mode": state.store.mode() }))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    all: bool,
}

async fn list_posts(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<BlogPost>>> {
    if query.all {
        require_admin(&state, &headers).await?;
    }
    Ok(Json(state.store.list_posts(query.all).await?))
}

async fn get_post_by_slug(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<BlogPost>> {
    if let Some(post) = state.store.get_post_by_slug(&slug).await? {
        // Drafts are only visible to admins
        if post.is_published() || is_admin(&state, &headers).await {
            return Ok(Json(post));
        }
    }
    Err(ApiError::NotFound(format!("No post with slug '{}'", slug)))
}

async fn get_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<BlogPost>> {
    require_admin(&state, &headers).await?;
    state
        .store
        .get_post_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No post with id '{}'", id)))
}

async fn create_post(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(new): Json<NewPost>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    let user = require_admin(&state, &headers).await?;
    let post = state.store.create_post_as(new, Some(user)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<PostPatch>,
) -> ApiResult<Json<BlogPost>> {
    require_admin(&state, &headers).await?;
    Ok(Json(state.store.update_post(&id, patch).await?))
}

async fn publish_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<BlogPost>> {
    require_admin(&state, &headers).await?;
    Ok(Json(state.store.publish_post(&id).await?))
}

async fn delete_post(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    require_admin(&state, &headers).await?;
    state.store.delete_post(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_settings(State(state): State<SharedState>) -> ApiResult<Json<Vec<SiteSetting>>> {
    Ok(Json(state.store.list_settings().await?))
}

#[derive(Debug, Serialize)]
struct SettingValue {
    key: String,
    value: Option<String>,
}

async fn get_setting(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> ApiResult<Json<SettingValue>> {
    let value = state.store.get_setting(&key).await?;
    Ok(Json(SettingValue { key, value }))
}

#[derive(Debug, Deserialize)]
struct SettingBody {
    value: String,
}

async fn update_setting(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SettingBody>,
) -> ApiResult<StatusCode> {
    require_admin(&state, &headers).await?;
    state.store.update_setting(&key, &body.value).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_contact(
    State(state): State<SharedState>,
    Json(input): Json<NewContact>,
) -> ApiResult<(StatusCode, Json<ContactSubmission>)> {
    let submission = state.store.submit_contact(input).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

async fn list_contacts(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ContactSubmission>>> {
    require_admin(&state, &headers).await?;
    Ok(Json(state.store.list_contacts().await?))
}

async fn stats(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Json<DashboardStats>> {
    require_admin(&state, &headers).await?;
    Ok(Json(state.store.dashboard_stats().await?))
}
