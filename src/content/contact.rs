//! Contact form submissions

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MAX_NAME: usize = 100;
const MAX_EMAIL: usize = 255;
const MAX_PHONE: usize = 20;
const MAX_MESSAGE: usize = 2000;

/// A stored inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Raw form input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Optional inquiry category, prefixed to the message
    pub inquiry_type: Option<String>,
    pub message: String,
}

/// Validated, normalized submission ready to insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactDraft {
    pub fn into_submission(self, id: String, now: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
            created_at: now,
        }
    }
}

impl NewContact {
    /// Trim and check every field, reporting all problems at once
    pub fn validate(self) -> Result<ContactDraft, String> {
        let mut problems = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            problems.push("Name is required".to_string());
        } else if name.chars().count() > MAX_NAME {
            problems.push(format!("Name must be less than {} characters", MAX_NAME));
        }

        let email = self.email.trim().to_string();
        if !EMAIL.is_match(&email) {
            problems.push("Invalid email address".to_string());
        } else if email.chars().count() > MAX_EMAIL {
            problems.push(format!("Email must be less than {} characters", MAX_EMAIL));
        }

        let phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if let Some(phone) = &phone {
            if phone.chars().count() > MAX_PHONE {
                problems.push(format!("Phone must be less than {} characters", MAX_PHONE));
            }
        }

        let body = self.message.trim();
        if body.is_empty() {
            problems.push("Message is required".to_string());
        } else if body.chars().count() > MAX_MESSAGE {
            problems.push(format!(
                "Message must be less than {} characters",
                MAX_MESSAGE
            ));
        }

        if !problems.is_empty() {
            return Err(problems.join("; "));
        }

        let message = match self.inquiry_type.as_deref().map(str::trim) {
            Some(kind) if !kind.is_empty() => format!("[{}] {}", kind, body),
            _ => body.to_string(),
        };

        Ok(ContactDraft {
            name,
            email,
            phone,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewContact {
        NewContact {
            name: "  Sara  ".to_string(),
            email: "sara@example.com".to_string(),
            phone: Some("   ".to_string()),
            inquiry_type: Some("Leasing".to_string()),
            message: " I have a villa in Lusail. ".to_string(),
        }
    }

    #[test]
    fn test_validate_normalizes() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.name, "Sara");
        assert_eq!(draft.phone, None);
        assert_eq!(draft.message, "[Leasing] I have a villa in Lusail.");
    }

    #[test]
    fn test_validate_collects_problems() {
        let err = NewContact {
            name: String::new(),
            email: "not-an-email".to_string(),
            phone: Some("1".repeat(21)),
            inquiry_type: None,
            message: String::new(),
        }
        .validate()
        .unwrap_err();

        assert!(err.contains("Name is required"));
        assert!(err.contains("Invalid email address"));
        assert!(err.contains("Phone must be less than 20"));
        assert!(err.contains("Message is required"));
    }

    #[test]
    fn test_message_length_limit() {
        let mut input = form();
        input.message = "x".repeat(2001);
        assert!(input.validate().is_err());
    }
}
