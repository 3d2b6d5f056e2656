//! Blog post models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::slug::slugify;

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!(
                "Unknown status: {}. Available: draft, published",
                other
            )),
        }
    }
}

/// A blog post as persisted by either backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Opaque unique identifier
    pub id: String,

    /// URL-safe unique name
    pub slug: String,

    /// Post title
    pub title: String,

    /// Short teaser shown on listing pages
    pub excerpt: String,

    /// Full HTML content
    pub content: String,

    /// Cover image
    #[serde(default)]
    pub image_url: Option<String>,

    /// Free-text category label
    pub category: String,

    /// Display name of the author
    pub author: String,

    /// Human-readable read time, e.g. "5 min read"
    pub read_time: String,

    /// Draft or published
    pub status: PostStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Who created the post (user id, `system` for seeds)
    #[serde(default)]
    pub created_by: Option<String>,
}

impl BlogPost {
    /// Whether the public site should show this post
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// Fields supplied by an author when creating a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPost {
    /// Explicit slug; derived from the title when absent or blank
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: String,
    pub author: String,
    pub read_time: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Create a draft with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// The slug this post will be stored under
    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&self.title),
        }
    }

    /// Build the full record with a fresh identity and timestamps
    pub fn into_post(self, id: String, now: DateTime<Utc>, created_by: Option<String>) -> BlogPost {
        let slug = self.resolved_slug();
        BlogPost {
            id,
            slug,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            image_url: self.image_url,
            category: self.category,
            author: self.author,
            read_time: self.read_time,
            status: self.status,
            created_at: now,
            updated_at: now,
            published_at: self.published_at,
            created_by,
        }
    }
}

/// A partial update; `None` leaves the field untouched.
///
/// The nullable columns use a double option so that `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub published_at: Option<Option<DateTime<Utc>>>,
}

/// Distinguish an explicit `null` from a missing field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        *self == PostPatch::default()
    }

    /// Patch that publishes a post as of `now`
    pub fn publish(now: DateTime<Utc>) -> Self {
        Self {
            status: Some(PostStatus::Published),
            published_at: Some(Some(now)),
            ..Default::default()
        }
    }

    /// Merge the present fields into `post`. Timestamps are left to the caller.
    pub fn apply(self, post: &mut BlogPost) {
        if let Some(slug) = self.slug {
            post.slug = slug;
        }
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(image_url) = self.image_url {
            post.image_url = image_url;
        }
        if let Some(category) = self.category {
            post.category = category;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
        if let Some(read_time) = self.read_time {
            post.read_time = read_time;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(published_at) = self.published_at {
            post.published_at = published_at;
        }
    }
}

/// Next value for an `updated_at` column: `now`, unless the clock has not
/// moved past `previous`, in which case one microsecond after it.
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> BlogPost {
        let now = Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap();
        NewPost {
            title: "Hello World".to_string(),
            excerpt: "e".to_string(),
            content: "c".to_string(),
            category: "General".to_string(),
            author: "A".to_string(),
            read_time: "1 min".to_string(),
            ..Default::default()
        }
        .into_post("id-1".to_string(), now, None)
    }

    #[test]
    fn test_into_post_derives_slug() {
        let post = sample();
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_blank_slug_is_derived() {
        let mut new = NewPost::new("Qatar Rentals 2026");
        new.slug = Some("   ".to_string());
        assert_eq!(new.resolved_slug(), "qatar-rentals-2026");

        new.slug = Some("custom".to_string());
        assert_eq!(new.resolved_slug(), "custom");
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut post = sample();
        let before = post.clone();
        PostPatch {
            title: Some("New".to_string()),
            ..Default::default()
        }
        .apply(&mut post);

        assert_eq!(post.title, "New");
        assert_eq!(post.slug, before.slug);
        assert_eq!(post.excerpt, before.excerpt);
        assert_eq!(post.status, before.status);
    }

    #[test]
    fn test_patch_null_clears_image() {
        let mut post = sample();
        post.image_url = Some("https://example.com/a.jpg".to_string());

        let patch: PostPatch = serde_json::from_str(r#"{"image_url": null}"#).unwrap();
        assert_eq!(patch.image_url, Some(None));
        patch.apply(&mut post);
        assert_eq!(post.image_url, None);

        let patch: PostPatch = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(patch.image_url, None);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = PostPatch {
            status: Some(PostStatus::Published),
            image_url: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "published", "image_url": null})
        );
    }

    #[test]
    fn test_next_timestamp_is_strictly_later() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert!(next_timestamp(t, t) > t);
        assert!(next_timestamp(t, t - Duration::seconds(5)) > t);
        let later = t + Duration::seconds(1);
        assert_eq!(next_timestamp(t, later), later);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Published".parse::<PostStatus>(), Ok(PostStatus::Published));
        assert!("archived".parse::<PostStatus>().is_err());
    }
}
