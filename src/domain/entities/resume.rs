use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::{
    option_fields::OptionField,
    project::{validate_optional_title, validate_required_field},
};

const MAX_TITLE_LENGTH: u64 = 200;
pub const DEFAULT_RESUME_TITLE: &str = "Resume";

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Resume {
    pub id: i64,
    pub title: String,
    /// Storage key of the uploaded PDF.
    pub file: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Resume {
    pub fn file_key(&self) -> Option<&str> {
        Some(self.file.as_str()).filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ResumeInsert {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    #[validate(length(min = 1))]
    pub file: String,
    pub is_active: bool,
}

/// Admin listing filter: case-insensitive title search and the active flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl ResumeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn with_active(mut self, is_active: Option<bool>) -> Self {
        self.is_active = is_active;
        self
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeStatusResponse {
    pub available: bool,
    pub title: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl ResumeStatusResponse {
    pub fn unavailable() -> Self {
        ResumeStatusResponse {
            available: false,
            title: None,
            uploaded_at: None,
            url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDownloadResponse {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAdminResponse {
    pub id: i64,
    pub title: String,
    pub file: String,
    pub url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Resume {
    pub fn to_admin_response(&self, url: Option<String>) -> ResumeAdminResponse {
        ResumeAdminResponse {
            id: self.id,
            title: self.title.clone(),
            file: self.file.clone(),
            url,
            uploaded_at: self.uploaded_at,
            is_active: self.is_active,
        }
    }
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, MultipartForm)]
pub struct ResumeUpload {
    #[multipart(limit = "10MB")]
    pub file: TempFile,

    pub title: Option<Text<String>>,

    pub is_active: Option<Text<bool>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateResumeRequest {
    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH),
        custom(function = "validate_optional_title")
    )]
    pub title: OptionField<String>,

    #[validate(custom(function = "validate_required_field"))]
    pub is_active: OptionField<bool>,
}
