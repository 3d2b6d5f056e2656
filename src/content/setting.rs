//! Site settings (key/value configuration rows)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single configurable value shown on the public site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSetting {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl SiteSetting {
    /// An empty row for a known key
    pub fn seeded(key: &str, description: &str, now: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            description: Some(description.to_string()),
            updated_at: now,
            updated_by: None,
        }
    }

    pub fn group(&self) -> SettingGroup {
        SettingGroup::of(&self.key)
    }
}

/// Rows every installation starts with
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("company_address", "Office address shown in the footer"),
    ("contact_email", "Public contact email address"),
    ("contact_phone", "Public contact phone number"),
    ("facebook_url", "Facebook page URL"),
    ("instagram_url", "Instagram profile URL"),
    ("linkedin_url", "LinkedIn page URL"),
    ("twitter_url", "Twitter/X profile URL"),
    ("whatsapp_number", "WhatsApp number for the chat button"),
];

/// How the admin settings page groups keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingGroup {
    Contact,
    Social,
    Other,
}

impl SettingGroup {
    pub fn of(key: &str) -> Self {
        match key {
            "whatsapp_number" | "contact_email" | "contact_phone" | "company_address" => {
                SettingGroup::Contact
            }
            "facebook_url" | "instagram_url" | "linkedin_url" | "twitter_url" => {
                SettingGroup::Social
            }
            _ => SettingGroup::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingGroup::Contact => "Contact",
            SettingGroup::Social => "Social",
            SettingGroup::Other => "Other",
        }
    }
}
