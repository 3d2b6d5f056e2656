//! Blog post commands

use anyhow::{Context, Result};
use clap::Args;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::PathBuf;

use crate::content::{BlogPost, NewPost, PostPatch, PostStatus};
use crate::store::ContentStore;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

const DEFAULT_AUTHOR: &str = "YouFirst Team";
const DEFAULT_CATEGORY: &str = "General";
const WORDS_PER_MINUTE: usize = 200;

/// Post fields accepted on the command line
#[derive(Debug, Clone, Default, Args)]
pub struct PostFields {
    /// Post title
    #[arg(long)]
    pub title: Option<String>,

    /// URL slug (derived from the title when omitted)
    #[arg(long)]
    pub slug: Option<String>,

    /// Short teaser
    #[arg(long)]
    pub excerpt: Option<String>,

    /// Inline HTML content
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,

    /// Read HTML content from a file
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Category label
    #[arg(long)]
    pub category: Option<String>,

    /// Author name
    #[arg(long)]
    pub author: Option<String>,

    /// Read time label, e.g. "5 min read"
    #[arg(long)]
    pub read_time: Option<String>,

    /// Cover image URL
    #[arg(long)]
    pub image: Option<String>,

    /// draft or published
    #[arg(long)]
    pub status: Option<PostStatus>,
}

impl PostFields {
    fn resolve_content(&self) -> Result<Option<String>> {
        match (&self.content, &self.content_file) {
            (Some(content), _) => Ok(Some(content.clone())),
            (None, Some(path)) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read content from {:?}", path))?;
                Ok(Some(content))
            }
            (None, None) => Ok(None),
        }
    }

    /// Fields for a new post, filling the editor's defaults
    pub fn into_new_post(self) -> Result<NewPost> {
        let content = self.resolve_content()?.unwrap_or_default();
        let title = match self.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => anyhow::bail!("A title is required (--title)"),
        };
        let read_time = self
            .read_time
            .unwrap_or_else(|| estimate_read_time(&content));

        Ok(NewPost {
            slug: self.slug,
            title,
            excerpt: self.excerpt.unwrap_or_default(),
            content,
            image_url: self.image,
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            author: self.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            read_time,
            status: self.status.unwrap_or_default(),
            published_at: None,
        })
    }

    /// Only the fields given on the command line
    pub fn into_patch(self) -> Result<PostPatch> {
        let content = self.resolve_content()?;
        let patch = PostPatch {
            slug: self.slug,
            title: self.title,
            excerpt: self.excerpt,
            content,
            image_url: self
                .image
                .map(|url| if url.is_empty() { None } else { Some(url) }),
            category: self.category,
            author: self.author,
            read_time: self.read_time,
            status: self.status,
            published_at: None,
        };
        if patch.is_empty() {
            anyhow::bail!("Nothing to update: pass at least one field");
        }
        Ok(patch)
    }
}

/// "N min read" from the word count of HTML content (at least one minute)
pub fn estimate_read_time(content: &str) -> String {
    let text = TAG.replace_all(content, " ");
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

fn print_post_line(post: &BlogPost) {
    println!(
        "  {} [{}] {} ({}) {}",
        post.created_at.format("%Y-%m-%d"),
        post.status,
        post.title,
        post.slug,
        post.id
    );
}

/// List posts, newest first
pub async fn list(store: &ContentStore, all: bool) -> Result<()> {
    let posts = store.list_posts(all).await?;
    println!("Posts ({}):", posts.len());
    for post in &posts {
        print_post_line(post);
    }
    Ok(())
}

/// Show a single post by slug
pub async fn show(store: &ContentStore, slug: &str) -> Result<()> {
    let post = store
        .get_post_by_slug(slug)
        .await?
        .with_context(|| format!("No post with slug '{}'", slug))?;
    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}

pub async fn create(store: &ContentStore, fields: PostFields, publish: bool) -> Result<()> {
    let mut new = fields.into_new_post()?;
    if publish {
        new.status = PostStatus::Published;
        new.published_at = Some(chrono::Utc::now());
    }
    let post = store.create_post(new).await?;
    println!("Created: {} ({})", post.slug, post.id);
    Ok(())
}

pub async fn update(store: &ContentStore, id: &str, fields: PostFields) -> Result<()> {
    let patch = fields.into_patch()?;
    let post = store.update_post(id, patch).await?;
    println!("Updated: {} ({})", post.slug, post.id);
    Ok(())
}

pub async fn publish(store: &ContentStore, id: &str) -> Result<()> {
    let post = store.publish_post(id).await?;
    println!("Published: {} ({})", post.slug, post.id);
    Ok(())
}

pub async fn delete(store: &ContentStore, id: &str) -> Result<()> {
    store.delete_post(id).await?;
    println!("Deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_read_time() {
        assert_eq!(estimate_read_time(""), "1 min read");
        let long = format!("<p>{}</p>", "word ".repeat(401));
        assert_eq!(estimate_read_time(&long), "3 min read");
    }

    #[test]
    fn test_new_post_defaults() {
        let fields = PostFields {
            title: Some("Service Charges Explained".to_string()),
            content: Some("<p>short</p>".to_string()),
            ..Default::default()
        };
        let new = fields.into_new_post().unwrap();
        assert_eq!(new.author, DEFAULT_AUTHOR);
        assert_eq!(new.category, DEFAULT_CATEGORY);
        assert_eq!(new.read_time, "1 min read");
        assert_eq!(new.status, PostStatus::Draft);
        assert_eq!(new.resolved_slug(), "service-charges-explained");
    }

    #[test]
    fn test_new_post_requires_title() {
        assert!(PostFields::default().into_new_post().is_err());
    }

    #[test]
    fn test_patch_from_fields() {
        assert!(PostFields::default().into_patch().is_err());

        let patch = PostFields {
            image: Some(String::new()),
            status: Some(PostStatus::Published),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.image_url, Some(None));
        assert_eq!(patch.status, Some(PostStatus::Published));
        assert!(patch.title.is_none());
    }

    #[test]
    fn test_content_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("body.html");
        fs::write(&path, "<p>from file</p>").unwrap();

        let fields = PostFields {
            title: Some("T".to_string()),
            content_file: Some(path),
            ..Default::default()
        };
        assert_eq!(fields.into_new_post().unwrap().content, "<p>from file</p>");
    }
}
