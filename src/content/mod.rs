//! Content module - posts, settings, contact submissions and roles

mod contact;
mod post;
mod role;
pub mod seed;
mod setting;
pub mod slug;

pub use contact::{ContactDraft, ContactSubmission, NewContact};
pub use post::{next_timestamp, BlogPost, NewPost, PostPatch, PostStatus};
pub use role::{Role, UserRole};
pub use setting::{SettingGroup, SiteSetting, DEFAULT_SETTINGS};
pub use slug::slugify;
