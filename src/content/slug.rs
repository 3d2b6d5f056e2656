//! Slug derivation

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEPARATOR_RUN: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a URL slug from a title.
///
/// The title is lowercased, every run of characters outside `[a-z0-9]` becomes
/// a single `-`, and leading/trailing separators are dropped.
///
/// # Examples
/// ```ignore
/// slugify("Hello, World!") // -> "hello-world"
/// ```
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    SEPARATOR_RUN
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}
