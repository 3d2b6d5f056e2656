//! Remote backend over a hosted PostgREST endpoint
//!
//! Every operation becomes one request against `{url}/rest/v1/{table}`.
//! Responses are translated into [`StoreError`] in [`classify`], so callers
//! see the same error kinds as with the local backend.

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{StoreError, StoreResult};
use crate::content::{
    BlogPost, ContactDraft, ContactSubmission, PostPatch, SiteSetting, UserRole,
};

const POSTS_TABLE: &str = "blog_posts";
const SETTINGS_TABLE: &str = "site_settings";
const ROLES_TABLE: &str = "user_roles";
const CONTACTS_TABLE: &str = "contact_submissions";

/// Characters left readable in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*')
    .remove(b',')
    .remove(b'~');

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// A PostgREST filter/order query
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.params
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params
            .push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_string(), n.to_string()));
        self
    }

    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_VALUE),
                    utf8_percent_encode(v, QUERY_VALUE)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Error body returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct BackendError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Map a failed response onto the store's error kinds.
///
/// - `23505` (unique violation) and other constraint failures, or HTTP 409,
///   become [`StoreError::Validation`].
/// - Everything else is [`StoreError::Transport`].
pub fn classify(status: u16, body: &str) -> StoreError {
    let parsed: BackendError = serde_json::from_str(body).unwrap_or_default();
    let mut message = parsed
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    if let Some(details) = parsed.details.filter(|d| !d.trim().is_empty()) {
        message = format!("{} ({})", message, details);
    }

    match parsed.code.as_deref() {
        Some("23505") => StoreError::Validation(format!("Duplicate value: {}", message)),
        Some("23502") | Some("23514") | Some("22P02") => StoreError::Validation(message),
        _ if status == 409 => StoreError::Validation(message),
        _ => StoreError::Transport(format!("HTTP {}: {}", status, message)),
    }
}

/// Decode a JSON array of rows; an empty body is an empty result
pub fn decode_rows<T: DeserializeOwned>(body: &str) -> StoreResult<Vec<T>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body)
        .map_err(|e| StoreError::Transport(format!("Unexpected response body: {}", e)))
}

#[derive(Debug, Deserialize)]
struct SettingValue {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct SettingUpdate<'a> {
    value: &'a str,
    updated_at: DateTime<Utc>,
}

/// Backend talking to the hosted database
pub struct RemoteStore {
    client: reqwest::Client,
    rest_url: String,
}

impl RemoteStore {
    /// Build a client for `url` authenticating with `api_key`
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> StoreResult<Self> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| {
            StoreError::Validation(format!("Invalid API key: {}", e))
        };

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(invalid)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            rest_url: rest_url(url),
        })
    }

    fn url(&self, table: &str, query: &Query) -> String {
        let query = query.to_query_string();
        if query.is_empty() {
            format!("{}/{}", self.rest_url, table)
        } else {
            format!("{}/{}?{}", self.rest_url, table, query)
        }
    }

    async fn rows<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<Vec<T>> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = classify(status.as_u16(), &body);
            tracing::warn!("Remote request failed: {}", err);
            return Err(err);
        }
        decode_rows(&body)
    }

    async fn fetch<T: DeserializeOwned>(&self, table: &str, query: &Query) -> StoreResult<Vec<T>> {
        tracing::debug!("GET {} {}", table, query.to_query_string());
        let response = self.client.get(self.url(table, query)).send().await?;
        Self::rows(response).await
    }

    async fn insert<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &B,
    ) -> StoreResult<Vec<T>> {
        tracing::debug!("POST {}", table);
        let response = self
            .client
            .post(self.url(table, &Query::new()))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn modify<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &Query,
        body: &B,
    ) -> StoreResult<Vec<T>> {
        tracing::debug!("PATCH {} {}", table, query.to_query_string());
        let response = self
            .client
            .patch(self.url(table, query))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn remove(&self, table: &str, query: &Query) -> StoreResult<()> {
        tracing::debug!("DELETE {} {}", table, query.to_query_string());
        let response = self.client.delete(self.url(table, query)).send().await?;
        Self::rows::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn list_posts(&self, include_all: bool) -> StoreResult<Vec<BlogPost>> {
        let mut query = Query::new().select("*").order("created_at", false);
        if !include_all {
            query = query.eq("status", "published");
        }
        self.fetch(POSTS_TABLE, &query).await
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        let query = Query::new().select("*").eq("slug", slug).limit(1);
        Ok(self.fetch(POSTS_TABLE, &query).await?.into_iter().next())
    }

    pub async fn get_post_by_id(&self, id: &str) -> StoreResult<Option<BlogPost>> {
        let query = Query::new().select("*").eq("id", id).limit(1);
        Ok(self.fetch(POSTS_TABLE, &query).await?.into_iter().next())
    }

    pub async fn insert_post(&self, post: BlogPost) -> StoreResult<BlogPost> {
        self.insert::<BlogPost, _>(POSTS_TABLE, &[&post])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Transport("Insert returned no rows".to_string()))
    }

    pub async fn update_post(
        &self,
        id: &str,
        patch: PostPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<BlogPost> {
        let body = patch_body(&patch, now)?;
        let query = Query::new().eq("id", id);
        self.modify::<BlogPost, _>(POSTS_TABLE, &query, &body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found("Post", id))
    }

    pub async fn delete_post(&self, id: &str) -> StoreResult<()> {
        self.remove(POSTS_TABLE, &Query::new().eq("id", id)).await
    }

    pub async fn list_settings(&self) -> StoreResult<Vec<SiteSetting>> {
        let query = Query::new().select("*").order("key", true);
        self.fetch(SETTINGS_TABLE, &query).await
    }

    pub async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let query = Query::new().select("value").eq("key", key).limit(1);
        let rows: Vec<SettingValue> = self.fetch(SETTINGS_TABLE, &query).await?;
        Ok(rows.into_iter().next().and_then(|row| row.value))
    }

    pub async fn update_setting(
        &self,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let query = Query::new().eq("key", key);
        let body = SettingUpdate {
            value,
            updated_at: now,
        };
        let rows: Vec<serde_json::Value> = self.modify(SETTINGS_TABLE, &query, &body).await?;
        if rows.is_empty() {
            return Err(StoreError::not_found("Setting", key));
        }
        Ok(())
    }

    pub async fn insert_contact(&self, draft: ContactDraft) -> StoreResult<ContactSubmission> {
        self.insert::<ContactSubmission, _>(CONTACTS_TABLE, &[&draft])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Transport("Insert returned no rows".to_string()))
    }

    pub async fn list_contacts(&self) -> StoreResult<Vec<ContactSubmission>> {
        let query = Query::new().select("*").order("created_at", false);
        self.fetch(CONTACTS_TABLE, &query).await
    }

    /// A backend failure counts as "not an admin"
    pub async fn check_admin_role(&self, user_id: &str) -> bool {
        let query = Query::new()
            .select("*")
            .eq("user_id", user_id)
            .eq("role", "admin")
            .limit(1);
        match self.fetch::<UserRole>(ROLES_TABLE, &query).await {
            Ok(rows) => !rows.is_empty(),
            Err(e) => {
                tracing::error!("Error checking admin role for {}: {}", user_id, e);
                false
            }
        }
    }

    pub async fn get_user_roles(&self, user_id: &str) -> StoreResult<Vec<UserRole>> {
        let query = Query::new().select("*").eq("user_id", user_id);
        self.fetch(ROLES_TABLE, &query).await
    }
}

/// `{base}/rest/v1` without a doubled slash
fn rest_url(base: &str) -> String {
    format!("{}/rest/v1", base.trim().trim_end_matches('/'))
}

/// JSON body for a post PATCH: the present fields plus a fresh `updated_at`
fn patch_body(patch: &PostPatch, now: DateTime<Utc>) -> StoreResult<serde_json::Value> {
    let mut body = serde_json::to_value(patch)
        .map_err(|e| StoreError::Validation(format!("Unserializable update: {}", e)))?;
    if let serde_json::Value::Object(map) = &mut body {
        map.insert("updated_at".to_string(), serde_json::json!(now));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{NewPost, PostStatus};
    use axum::http::{HeaderMap as RequestHeaders, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use chrono::TimeZone;
    use serde_json::{json, Value};

    /// Serve `app` on an ephemeral port and point a store at it
    async fn stub_backend(app: Router) -> RemoteStore {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RemoteStore::new(&format!("http://{}", addr), "key", Duration::from_secs(5)).unwrap()
    }

    fn sample_post() -> BlogPost {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        NewPost::new("Hello World").into_post("p1".to_string(), now, None)
    }

    #[test]
    fn test_query_string() {
        let query = Query::new()
            .select("*")
            .eq("status", "published")
            .order("created_at", false)
            .limit(1);
        assert_eq!(
            query.to_query_string(),
            "select=*&status=eq.published&order=created_at.desc&limit=1"
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let query = Query::new().eq("slug", "a b&c=d");
        assert_eq!(query.to_query_string(), "slug=eq.a%20b%26c%3Dd");
    }

    #[test]
    fn test_rest_url() {
        assert_eq!(rest_url("https://abc.supabase.co/"), "https://abc.supabase.co/rest/v1");
        assert_eq!(rest_url(" https://abc.supabase.co"), "https://abc.supabase.co/rest/v1");
    }

    #[test]
    fn test_table_url() {
        let store =
            RemoteStore::new("https://abc.supabase.co", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(
            store.url(POSTS_TABLE, &Query::new().eq("id", "42")),
            "https://abc.supabase.co/rest/v1/blog_posts?id=eq.42"
        );
        assert_eq!(
            store.url(CONTACTS_TABLE, &Query::new()),
            "https://abc.supabase.co/rest/v1/contact_submissions"
        );
    }

    #[test]
    fn test_invalid_api_key() {
        let err = RemoteStore::new("https://x.co", "bad\nkey", Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn test_classify_unique_violation() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"blog_posts_slug_key\"","details":"Key (slug)=(hello) already exists.","hint":null}"#;
        match classify(409, body) {
            StoreError::Validation(msg) => {
                assert!(msg.contains("blog_posts_slug_key"));
                assert!(msg.contains("already exists"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_transport() {
        assert!(matches!(
            classify(500, "upstream exploded"),
            StoreError::Transport(msg) if msg == "HTTP 500: upstream exploded"
        ));
        assert!(matches!(
            classify(401, r#"{"code":"PGRST301","message":"JWT expired"}"#),
            StoreError::Transport(msg) if msg.contains("JWT expired")
        ));
    }

    #[test]
    fn test_decode_rows() {
        let rows: Vec<SettingValue> = decode_rows(r#"[{"value":"x"},{"value":null}]"#).unwrap();
        assert_eq!(rows[0].value.as_deref(), Some("x"));
        assert_eq!(rows[1].value, None);

        let empty: Vec<SettingValue> = decode_rows("").unwrap();
        assert!(empty.is_empty());

        assert!(matches!(
            decode_rows::<SettingValue>("<html>"),
            Err(StoreError::Transport(_))
        ));
    }

    #[test]
    fn test_patch_body_adds_updated_at() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let patch = PostPatch {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let body = patch_body(&patch, now).unwrap();
        assert_eq!(body["status"], "published");
        assert_eq!(body["updated_at"], serde_json::json!(now));
        assert!(body.get("title").is_none());
    }

    #[tokio::test]
    async fn test_sends_credentials_and_decodes_rows() {
        let row = serde_json::to_value(sample_post()).unwrap();
        let app = Router::new().route(
            "/rest/v1/blog_posts",
            get(move |headers: RequestHeaders| {
                let row = row.clone();
                async move {
                    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
                    let authorized = header("apikey") == Some("key")
                        && header("authorization") == Some("Bearer key");
                    if authorized {
                        (StatusCode::OK, Json(json!([row])))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({"message": "no key"})))
                    }
                }
            }),
        );
        let store = stub_backend(app).await;

        let posts = store.list_posts(true).await.unwrap();
        assert_eq!(posts, vec![sample_post()]);
    }

    #[tokio::test]
    async fn test_update_with_no_matching_row_is_not_found() {
        let app = Router::new()
            .route(
                "/rest/v1/blog_posts",
                axum::routing::patch(|| async { Json(json!([])) }),
            )
            .route(
                "/rest/v1/site_settings",
                axum::routing::patch(|| async { Json(json!([])) }),
            );
        let store = stub_backend(app).await;
        let now = Utc::now();

        let patch = PostPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let err = store.update_post("missing", patch, now).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Post", ref key } if key == "missing"));

        let err = store.update_setting("nope", "v", now).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Setting", ref key } if key == "nope"));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_validation() {
        let app = Router::new().route(
            "/rest/v1/blog_posts",
            axum::routing::post(|Json(rows): Json<Value>| async move {
                assert_eq!(rows[0]["slug"], "hello-world");
                (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "code": "23505",
                        "message": "duplicate key value violates unique constraint \"blog_posts_slug_key\"",
                        "details": "Key (slug)=(hello-world) already exists.",
                    })),
                )
            }),
        );
        let store = stub_backend(app).await;

        let err = store.insert_post(sample_post()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref msg) if msg.contains("already exists")));
    }

    #[tokio::test]
    async fn test_admin_check_failure_is_not_admin() {
        let app = Router::new().route(
            "/rest/v1/user_roles",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable") }),
        );
        let store = stub_backend(app).await;

        assert!(!store.check_admin_role("u1").await);
        assert!(matches!(
            store.get_user_roles("u1").await,
            Err(StoreError::Transport(_))
        ));
    }
}
