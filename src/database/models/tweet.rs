use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Tweet {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub location: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTweet {
    pub author: String,
    pub content: String,
    pub location: Option<String>,
    pub source: Option<String>,
    /// Defaults to the insertion time. Imported tweets keep their original date.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTweet {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            location: None,
            source: None,
            created_at: None,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut field_errors = HashMap::new();
        check_text(&mut field_errors, "author", Some(&self.author), 64);
        check_text(&mut field_errors, "content", Some(&self.content), 280);
        check_text(&mut field_errors, "location", self.location.as_deref(), 100);
        check_text(&mut field_errors, "source", self.source.as_deref(), 100);

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(field_errors)
        }
    }
}

fn check_text(errors: &mut HashMap<String, String>, field: &str, value: Option<&str>, max_len: usize) {
    let Some(value) = value else { return };
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "Must not be empty".to_string());
    } else if value.chars().count() > max_len {
        errors.insert(field.to_string(), format!("Must be at most {} characters", max_len));
    }
}
