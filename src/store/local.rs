//! Local fallback backend
//!
//! Collections live in memory behind a mutex, indexed by id and slug, and are
//! written back whole to [`LocalStorage`] after every mutation. A mutation is
//! applied to a copy first and only replaces the in-memory state once the
//! write has succeeded.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use crate::content::seed::seed_posts;
use crate::content::{
    next_timestamp, BlogPost, ContactDraft, ContactSubmission, PostPatch, Role, SiteSetting,
    UserRole, DEFAULT_SETTINGS,
};
use crate::storage::LocalStorage;

/// Storage key for blog posts
pub const POSTS_KEY: &str = "admin_blog_posts";
/// Storage key for site settings
pub const SETTINGS_KEY: &str = "admin_site_settings";
/// Storage key for contact submissions
pub const CONTACTS_KEY: &str = "admin_contact_submissions";

/// Behaviour switches for the local backend
#[derive(Debug, Clone, Copy)]
pub struct LocalOptions {
    /// Seed the example posts when no post data exists yet
    pub seed_posts: bool,
    /// Treat every user as an admin
    pub local_admin: bool,
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self {
            seed_posts: true,
            local_admin: false,
        }
    }
}

/// Posts in listing order, with a slug lookup
#[derive(Debug, Clone, Default)]
struct PostIndex {
    by_id: IndexMap<String, BlogPost>,
    by_slug: HashMap<String, String>,
}

impl PostIndex {
    fn from_posts(posts: Vec<BlogPost>) -> Self {
        let mut index = Self::default();
        for post in posts {
            index.by_slug.insert(post.slug.clone(), post.id.clone());
            index.by_id.insert(post.id.clone(), post);
        }
        index
    }

    fn get(&self, id: &str) -> Option<&BlogPost> {
        self.by_id.get(id)
    }

    fn get_by_slug(&self, slug: &str) -> Option<&BlogPost> {
        self.by_slug.get(slug).and_then(|id| self.by_id.get(id))
    }

    /// Whether `slug` belongs to a post other than `id`
    fn slug_taken(&self, slug: &str, id: Option<&str>) -> bool {
        match self.by_slug.get(slug) {
            Some(owner) => Some(owner.as_str()) != id,
            None => false,
        }
    }

    fn insert_front(&mut self, post: BlogPost) {
        self.by_slug.insert(post.slug.clone(), post.id.clone());
        self.by_id.shift_insert(0, post.id.clone(), post);
    }

    /// Replace an existing post in place
    fn replace(&mut self, post: BlogPost) {
        if let Some(old) = self.by_id.get(&post.id) {
            if old.slug != post.slug {
                self.by_slug.remove(&old.slug);
            }
        }
        self.by_slug.insert(post.slug.clone(), post.id.clone());
        self.by_id.insert(post.id.clone(), post);
    }

    fn remove(&mut self, id: &str) -> Option<BlogPost> {
        let post = self.by_id.shift_remove(id)?;
        if self.by_slug.get(&post.slug).map(String::as_str) == Some(id) {
            self.by_slug.remove(&post.slug);
        }
        Some(post)
    }

    fn to_vec(&self) -> Vec<&BlogPost> {
        self.by_id.values().collect()
    }
}

#[derive(Debug)]
struct Collections {
    posts: PostIndex,
    settings: BTreeMap<String, SiteSetting>,
    contacts: Vec<ContactSubmission>,
}

/// Backend persisting to a local data directory
pub struct LocalStore {
    storage: LocalStorage,
    options: LocalOptions,
    state: Mutex<Option<Collections>>,
}

impl LocalStore {
    pub fn new(storage: LocalStorage, options: LocalOptions) -> Self {
        Self {
            storage,
            options,
            state: Mutex::new(None),
        }
    }

    /// Read every collection, seeding the ones that were never written
    fn load(&self) -> StoreResult<Collections> {
        let now = Utc::now();

        let posts = match self.storage.load_json::<Vec<BlogPost>>(POSTS_KEY)? {
            Some(posts) => posts,
            None if self.options.seed_posts => {
                let seeded = seed_posts(now);
                self.storage.save_json(POSTS_KEY, &seeded)?;
                tracing::info!("Seeded local store with {} example posts", seeded.len());
                seeded
            }
            None => Vec::new(),
        };

        let settings = match self.storage.load_json::<Vec<SiteSetting>>(SETTINGS_KEY)? {
            Some(settings) => settings,
            None => {
                let seeded: Vec<SiteSetting> = DEFAULT_SETTINGS
                    .iter()
                    .map(|(key, description)| SiteSetting::seeded(key, description, now))
                    .collect();
                self.storage.save_json(SETTINGS_KEY, &seeded)?;
                tracing::info!("Seeded local store with {} settings", seeded.len());
                seeded
            }
        };

        let contacts = self
            .storage
            .load_json::<Vec<ContactSubmission>>(CONTACTS_KEY)?
            .unwrap_or_default();

        tracing::debug!(
            "Loaded local store: {} posts, {} settings, {} contacts",
            posts.len(),
            settings.len(),
            contacts.len()
        );

        Ok(Collections {
            posts: PostIndex::from_posts(posts),
            settings: settings.into_iter().map(|s| (s.key.clone(), s)).collect(),
            contacts,
        })
    }

    fn loaded<'a>(&self, slot: &'a mut Option<Collections>) -> StoreResult<&'a mut Collections> {
        match slot.take() {
            Some(state) => Ok(slot.insert(state)),
            None => Ok(slot.insert(self.load()?)),
        }
    }

    fn commit_posts(&self, state: &mut Collections, next: PostIndex) -> StoreResult<()> {
        self.storage.save_json(POSTS_KEY, &next.to_vec())?;
        state.posts = next;
        Ok(())
    }

    pub async fn list_posts(&self, include_all: bool) -> StoreResult<Vec<BlogPost>> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;
        let mut posts: Vec<BlogPost> = state
            .posts
            .by_id
            .values()
            .filter(|p| include_all || p.is_published())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;
        Ok(state.posts.get_by_slug(slug).cloned())
    }

    pub async fn get_post_by_id(&self, id: &str) -> StoreResult<Option<BlogPost>> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;
        Ok(state.posts.get(id).cloned())
    }

    pub async fn insert_post(&self, post: BlogPost) -> StoreResult<BlogPost> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;

        if state.posts.slug_taken(&post.slug, None) {
            return Err(StoreError::Validation(format!(
                "A post with slug '{}' already exists",
                post.slug
            )));
        }

        let mut next = state.posts.clone();
        next.insert_front(post.clone());
        self.commit_posts(state, next)?;
        Ok(post)
    }

    pub async fn update_post(
        &self,
        id: &str,
        patch: PostPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<BlogPost> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;

        let mut post = state
            .posts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Post", id))?;

        if let Some(slug) = &patch.slug {
            if state.posts.slug_taken(slug, Some(id)) {
                return Err(StoreError::Validation(format!(
                    "A post with slug '{}' already exists",
                    slug
                )));
            }
        }

        let previous = post.updated_at;
        patch.apply(&mut post);
        post.updated_at = next_timestamp(previous, now);

        let mut next = state.posts.clone();
        next.replace(post.clone());
        self.commit_posts(state, next)?;
        Ok(post)
    }

    pub async fn delete_post(&self, id: &str) -> StoreResult<()> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;

        if state.posts.get(id).is_none() {
            return Ok(());
        }
        let mut next = state.posts.clone();
        next.remove(id);
        self.commit_posts(state, next)
    }

    pub async fn list_settings(&self) -> StoreResult<Vec<SiteSetting>> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;
        Ok(state.settings.values().cloned().collect())
    }

    pub async fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;
        Ok(state.settings.get(key).and_then(|s| s.value.clone()))
    }

    pub async fn update_setting(
        &self,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;

        let mut setting = state
            .settings
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Setting", key))?;
        setting.value = Some(value.to_string());
        setting.updated_at = next_timestamp(setting.updated_at, now);

        let mut next = state.settings.clone();
        next.insert(key.to_string(), setting);
        self.storage
            .save_json(SETTINGS_KEY, &next.values().collect::<Vec<_>>())?;
        state.settings = next;
        Ok(())
    }

    pub async fn insert_contact(&self, draft: ContactDraft) -> StoreResult<ContactSubmission> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;

        let submission = draft.into_submission(Uuid::new_v4().to_string(), Utc::now());
        let mut next = Vec::with_capacity(state.contacts.len() + 1);
        next.push(submission.clone());
        next.extend(state.contacts.iter().cloned());
        self.storage.save_json(CONTACTS_KEY, &next)?;
        state.contacts = next;
        Ok(submission)
    }

    pub async fn list_contacts(&self) -> StoreResult<Vec<ContactSubmission>> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard)?;
        let mut contacts = state.contacts.clone();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    pub fn check_admin_role(&self, user_id: &str) -> bool {
        tracing::debug!(
            "Local admin check for {}: {}",
            user_id,
            self.options.local_admin
        );
        self.options.local_admin
    }

    pub fn get_user_roles(&self, user_id: &str) -> Vec<UserRole> {
        if !self.options.local_admin {
            return Vec::new();
        }
        vec![UserRole {
            id: "local-admin-role".to_string(),
            user_id: user_id.to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        }]
    }
}
