//! Content store facade
//!
//! [`ContentStore`] is the single seam for reading and writing posts,
//! settings and contact submissions. It wraps a [`Backend`] that is resolved
//! once from configuration and never changes for the life of the store.

mod error;
pub mod local;
pub mod remote;

pub use error::{StoreError, StoreResult};
pub use local::{LocalOptions, LocalStore};
pub use remote::RemoteStore;

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::content::{
    BlogPost, ContactSubmission, NewContact, NewPost, PostPatch, PostStatus, SiteSetting,
    UserRole,
};
use crate::storage::LocalStorage;

/// Which backend a store talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Local,
    Remote,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Local => f.write_str("local"),
            Mode::Remote => f.write_str("remote"),
        }
    }
}

/// The persistence strategy behind the facade
pub enum Backend {
    Local(LocalStore),
    Remote(RemoteStore),
}

impl Backend {
    /// Pick the backend for a configuration.
    ///
    /// Remote mode needs both a URL and an API key; anything less falls back
    /// to local storage under `data_dir` (relative to `base_dir`).
    pub fn from_config(config: &SiteConfig, base_dir: &Path) -> StoreResult<Self> {
        match config.remote.credentials() {
            Some((url, api_key)) => {
                tracing::info!("Using remote content backend at {}", url);
                let timeout = Duration::from_secs(config.remote.timeout_secs);
                Ok(Backend::Remote(RemoteStore::new(url, api_key, timeout)?))
            }
            None => {
                let data_dir = base_dir.join(&config.data_dir);
                tracing::info!("Using local content backend in {:?}", data_dir);
                if config.local_admin {
                    tracing::warn!("local_admin is enabled: every user is treated as an admin");
                }
                let storage = LocalStorage::open(&data_dir)?;
                let options = LocalOptions {
                    seed_posts: config.seed_posts,
                    local_admin: config.local_admin,
                };
                Ok(Backend::Local(LocalStore::new(storage, options)))
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Backend::Local(_) => Mode::Local,
            Backend::Remote(_) => Mode::Remote,
        }
    }
}

/// Post and contact counts for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_posts: usize,
    pub published_posts: usize,
    pub draft_posts: usize,
    pub contacts: usize,
}

/// Uniform CRUD interface over either backend
pub struct ContentStore {
    backend: Backend,
}

impl ContentStore {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Resolve the backend from configuration and wrap it
    pub fn open(config: &SiteConfig, base_dir: &Path) -> StoreResult<Self> {
        Ok(Self::new(Backend::from_config(config, base_dir)?))
    }

    pub fn mode(&self) -> Mode {
        self.backend.mode()
    }

    /// Posts newest first; drafts only when `include_all`
    pub async fn list_posts(&self, include_all: bool) -> StoreResult<Vec<BlogPost>> {
        match &self.backend {
            Backend::Local(store) => store.list_posts(include_all).await,
            Backend::Remote(store) => store.list_posts(include_all).await,
        }
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        match &self.backend {
            Backend::Local(store) => store.get_post_by_slug(slug).await,
            Backend::Remote(store) => store.get_post_by_slug(slug).await,
        }
    }

    pub async fn get_post_by_id(&self, id: &str) -> StoreResult<Option<BlogPost>> {
        match &self.backend {
            Backend::Local(store) => store.get_post_by_id(id).await,
            Backend::Remote(store) => store.get_post_by_id(id).await,
        }
    }

    /// Create a post with a fresh id and timestamps.
    ///
    /// The slug is derived from the title unless one was supplied. A slug
    /// already in use fails with [`StoreError::Validation`].
    pub async fn create_post(&self, new: NewPost) -> StoreResult<BlogPost> {
        self.create_post_as(new, None).await
    }

    /// Like [`create_post`](Self::create_post), recording the creating user
    pub async fn create_post_as(
        &self,
        new: NewPost,
        created_by: Option<String>,
    ) -> StoreResult<BlogPost> {
        if new.resolved_slug().is_empty() {
            return Err(StoreError::Validation(
                "Could not derive a slug from the title; supply one explicitly".to_string(),
            ));
        }

        let post = new.into_post(Uuid::new_v4().to_string(), Utc::now(), created_by);
        tracing::info!("Creating post {} ({})", post.slug, post.status);

        match &self.backend {
            Backend::Local(store) => store.insert_post(post).await,
            Backend::Remote(store) => store.insert_post(post).await,
        }
    }

    /// Merge `patch` into the post and refresh `updated_at`
    pub async fn update_post(&self, id: &str, mut patch: PostPatch) -> StoreResult<BlogPost> {
        if let Some(slug) = patch.slug.take() {
            let slug = slug.trim();
            if slug.is_empty() {
                return Err(StoreError::Validation("Slug cannot be empty".to_string()));
            }
            patch.slug = Some(slug.to_string());
        }

        tracing::debug!("Updating post {}", id);
        let now = Utc::now();
        match &self.backend {
            Backend::Local(store) => store.update_post(id, patch, now).await,
            Backend::Remote(store) => store.update_post(id, patch, now).await,
        }
    }

    /// Mark a post published as of now
    pub async fn publish_post(&self, id: &str) -> StoreResult<BlogPost> {
        tracing::info!("Publishing post {}", id);
        self.update_post(id, PostPatch::publish(Utc::now())).await
    }

    /// Permanently remove a post; absent ids are not an error
    pub async fn delete_post(&self, id: &str) -> StoreResult<()> {
        tracing::info!("Deleting post {}", id);
        match &self.backend {
            Backend::Local(store) => store.delete_post(id).await,
            Backend::Remote(store) => store.delete_post(id).await,
        }
    }

    /// All settings ordered by key
    pub async fn list_settings(&self) -> StoreResult<Vec<SiteSetting>> {
        match &self.backend {
            Backend::Local(store) => store.list_settings().await,
            Backend::Remote(store) => store.list_settings().await,
        }
    }

    pub async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        match &self.backend {
            Backend::Local(store) => store.get_setting(key).await,
            Backend::Remote(store) => store.get_setting(key).await,
        }
    }

    /// Set the value of an existing setting row
    pub async fn update_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        tracing::info!("Updating setting {}", key);
        let now = Utc::now();
        match &self.backend {
            Backend::Local(store) => store.update_setting(key, value, now).await,
            Backend::Remote(store) => store.update_setting(key, value, now).await,
        }
    }

    /// Validate and append a contact form submission
    pub async fn submit_contact(&self, input: NewContact) -> StoreResult<ContactSubmission> {
        let draft = input.validate().map_err(StoreError::Validation)?;
        tracing::info!("New contact submission from {}", draft.email);
        match &self.backend {
            Backend::Local(store) => store.insert_contact(draft).await,
            Backend::Remote(store) => store.insert_contact(draft).await,
        }
    }

    /// Contact submissions newest first
    pub async fn list_contacts(&self) -> StoreResult<Vec<ContactSubmission>> {
        match &self.backend {
            Backend::Local(store) => store.list_contacts().await,
            Backend::Remote(store) => store.list_contacts().await,
        }
    }

    /// Whether `user_id` may use the admin surface
    pub async fn check_admin_role(&self, user_id: &str) -> bool {
        match &self.backend {
            Backend::Local(store) => store.check_admin_role(user_id),
            Backend::Remote(store) => store.check_admin_role(user_id).await,
        }
    }

    pub async fn get_user_roles(&self, user_id: &str) -> StoreResult<Vec<UserRole>> {
        match &self.backend {
            Backend::Local(store) => Ok(store.get_user_roles(user_id)),
            Backend::Remote(store) => store.get_user_roles(user_id).await,
        }
    }

    pub async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        let posts = self.list_posts(true).await?;
        let published_posts = posts
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .count();
        let contacts = self.list_contacts().await?.len();
        Ok(DashboardStats {
            total_posts: posts.len(),
            published_posts,
            draft_posts: posts.len() - published_posts,
            contacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local_store(tmp: &TempDir) -> ContentStore {
        let storage = LocalStorage::open(tmp.path()).unwrap();
        let options = LocalOptions {
            seed_posts: false,
            local_admin: true,
        };
        ContentStore::new(Backend::Local(LocalStore::new(storage, options)))
    }

    fn hello_world() -> NewPost {
        NewPost {
            title: "Hello World".to_string(),
            excerpt: "e".to_string(),
            content: "c".to_string(),
            category: "General".to_string(),
            author: "A".to_string(),
            read_time: "1 min".to_string(),
            status: PostStatus::Draft,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_draft_then_publish_scenario() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);

        let created = store.create_post(hello_world()).await.unwrap();
        assert_eq!(created.slug, "hello-world");
        assert_eq!(created.status, PostStatus::Draft);
        assert!(!created.id.is_empty());
        assert_eq!(store.list_posts(true).await.unwrap().len(), 1);
        assert!(store.list_posts(false).await.unwrap().is_empty());

        let patch = PostPatch {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let updated = store.update_post(&created.id, patch).await.unwrap();
        assert_eq!(store.list_posts(false).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_created_post_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);
        let created = store.create_post(hello_world()).await.unwrap();

        let fetched = store.get_post_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.as_ref(), Some(&created));
        let by_slug = store.get_post_by_slug("hello-world").await.unwrap();
        assert_eq!(by_slug, fetched);
        assert!(store.get_post_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_title_only_changes_title() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);
        let created = store.create_post(hello_world()).await.unwrap();

        let patch = PostPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update_post(&created.id, patch).await.unwrap();

        assert!(updated.updated_at > created.updated_at);
        let mut expected = created.clone();
        expected.title = "Renamed".to_string();
        expected.updated_at = updated.updated_at;
        assert_eq!(updated, expected);
    }

    #[tokio::test]
    async fn test_newest_first_and_filtering() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);

        let first = store.create_post(NewPost::new("First")).await.unwrap();
        let mut second = NewPost::new("Second");
        second.status = PostStatus::Published;
        let second = store.create_post(second).await.unwrap();

        let all = store.list_posts(true).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);
        let published = store.list_posts(false).await.unwrap();
        assert_eq!(published, vec![second]);
        assert!(published.iter().all(|p| p.id != first.id));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);
        let created = store.create_post(hello_world()).await.unwrap();

        store.delete_post(&created.id).await.unwrap();
        assert!(store.get_post_by_id(&created.id).await.unwrap().is_none());
        store.delete_post(&created.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_explicit_slug() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);

        let mut a = NewPost::new("A");
        a.slug = Some("shared".to_string());
        let mut b = NewPost::new("B");
        b.slug = Some("shared".to_string());

        let kept = store.create_post(a).await.unwrap();
        let err = store.create_post(b).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.list_posts(true).await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn test_rejects_untitled_post() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);
        let err = store.create_post(NewPost::new("  ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejects_title_without_slug_characters() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);

        let err = store.create_post(NewPost::new("مرحبا بكم")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref msg) if msg.contains("supply one")));
        let err = store.create_post(NewPost::new("!!!")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(ref msg) if msg.contains("supply one")));
        assert!(store.list_posts(true).await.unwrap().is_empty());

        let mut arabic = NewPost::new("مرحبا بكم");
        arabic.slug = Some("welcome".to_string());
        let created = store.create_post(arabic).await.unwrap();
        assert_eq!(created.slug, "welcome");
    }

    #[tokio::test]
    async fn test_update_trims_slug() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);
        let created = store.create_post(hello_world()).await.unwrap();

        let patch = PostPatch {
            slug: Some("  renamed  ".to_string()),
            ..Default::default()
        };
        let updated = store.update_post(&created.id, patch).await.unwrap();
        assert_eq!(updated.slug, "renamed");
        assert!(store.get_post_by_slug("renamed").await.unwrap().is_some());

        let patch = PostPatch {
            slug: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_post(&created.id, patch).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_sets_timestamp() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);
        let created = store.create_post(hello_world()).await.unwrap();
        assert!(created.published_at.is_none());

        let published = store.publish_post(&created.id).await.unwrap();
        assert!(published.is_published());
        assert!(published.published_at.is_some());

        let err = store.publish_post("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_settings_through_facade() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);

        let keys: Vec<_> = store
            .list_settings()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        store
            .update_setting("whatsapp_number", "+97400000000")
            .await
            .unwrap();
        assert_eq!(
            store.get_setting("whatsapp_number").await.unwrap().as_deref(),
            Some("+97400000000")
        );
        assert_eq!(store.get_setting("nope").await.unwrap(), None);
        assert!(matches!(
            store.update_setting("nope", "x").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_contact_validation_and_stats() {
        let tmp = TempDir::new().unwrap();
        let store = local_store(&tmp);

        let bad = NewContact {
            email: "nope".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            store.submit_contact(bad).await,
            Err(StoreError::Validation(_))
        ));

        let good = NewContact {
            name: "Omar".to_string(),
            email: "omar@example.com".to_string(),
            message: "Looking for management of two flats".to_string(),
            ..Default::default()
        };
        store.submit_contact(good).await.unwrap();
        store.create_post(hello_world()).await.unwrap();

        let stats = store.dashboard_stats().await.unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_posts: 1,
                published_posts: 0,
                draft_posts: 1,
                contacts: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_mode_from_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        let store = ContentStore::open(&config, tmp.path()).unwrap();
        assert_eq!(store.mode(), Mode::Local);
        assert!(!store.check_admin_role("anyone").await);

        config.remote.url = Some("https://abc.supabase.co".to_string());
        assert_eq!(
            ContentStore::open(&config, tmp.path()).unwrap().mode(),
            Mode::Local
        );

        config.remote.api_key = Some("anon-key".to_string());
        assert_eq!(
            ContentStore::open(&config, tmp.path()).unwrap().mode(),
            Mode::Remote
        );
    }
}
