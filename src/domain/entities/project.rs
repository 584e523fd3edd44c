use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::option_fields::OptionField;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 200;
const MAX_SHORT_DESCRIPTION_LENGTH: u64 = 300;
const MAX_URL_LENGTH: u64 = 200;
const MAX_TECHNOLOGIES_LENGTH: u64 = 500;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    /// Storage key of the attached image, if any.
    pub image: Option<String>,
    pub technologies: String,
    pub featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProjectInsert {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH), custom(function = "validate_title"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,

    #[validate(length(max = MAX_SHORT_DESCRIPTION_LENGTH))]
    pub short_description: String,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_url"))]
    pub github_url: Option<String>,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_url"))]
    pub live_url: Option<String>,

    #[validate(length(max = MAX_TECHNOLOGIES_LENGTH))]
    pub technologies: String,

    pub featured: bool,

    #[validate(range(min = 0, message = "Order must be zero or greater"))]
    pub display_order: i32,
}

/// Query shape understood by the record store. Results always come back in
/// the default project order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub featured_only: bool,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl ProjectFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn featured() -> Self {
        ProjectFilter { featured_only: true, ..Self::default() }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetailResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image: Option<String>,
    pub technologies: String,
    pub technology_list: Vec<String>,
    pub featured: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub id: i64,
    pub title: String,
    pub short_description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image: Option<String>,
    pub technology_list: Vec<String>,
    pub featured: bool,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH),
        custom(function = "validate_optional_title")
    )]
    pub title: OptionField<String>,

    #[validate(
        length(min = 1, message = "Description cannot be empty"),
        custom(function = "validate_required_field")
    )]
    pub description: OptionField<String>,

    #[validate(length(max = MAX_SHORT_DESCRIPTION_LENGTH))]
    pub short_description: OptionField<String>,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_optional_url_field"))]
    pub github_url: OptionField<String>,

    #[validate(length(max = MAX_URL_LENGTH), custom(function = "validate_optional_url_field"))]
    pub live_url: OptionField<String>,

    #[validate(length(max = MAX_TECHNOLOGIES_LENGTH))]
    pub technologies: OptionField<String>,

    #[validate(custom(function = "validate_required_field"))]
    pub featured: OptionField<bool>,

    #[validate(custom(function = "validate_optional_order"))]
    pub order: OptionField<i32>,
}

impl UpdateProjectRequest {
    /// Blank URL strings clear the link rather than failing validation.
    pub fn normalized(mut self) -> Self {
        self.github_url = normalize_url_field(self.github_url);
        self.live_url = normalize_url_field(self.live_url);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_unchanged()
            && self.description.is_unchanged()
            && self.short_description.is_unchanged()
            && self.github_url.is_unchanged()
            && self.live_url.is_unchanged()
            && self.technologies.is_unchanged()
            && self.featured.is_unchanged()
            && self.order.is_unchanged()
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if (parsed.scheme() == "http" || parsed.scheme() == "https") && parsed.host().is_some() {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().len() != title.len() {
        return Err(new_validation_error("title_whitespace", "Title must not have leading or trailing whitespace"));
    }
    Ok(())
}

pub fn validate_optional_title(value: &OptionField<String>) -> Result<(), ValidationError> {
    match value {
        OptionField::SetToValue(title) => validate_title(title),
        OptionField::SetToNull => Err(new_validation_error("field_required", "This field cannot be null")),
        OptionField::Unchanged => Ok(()),
    }
}

pub fn validate_required_field<T>(value: &OptionField<T>) -> Result<(), ValidationError> {
    if value.is_set_to_null() {
        return Err(new_validation_error("field_required", "This field cannot be null"));
    }
    Ok(())
}

pub fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(url) = value {
        validate_url(url)?;
    }
    Ok(())
}

pub fn validate_optional_order(value: &OptionField<i32>) -> Result<(), ValidationError> {
    match value {
        OptionField::SetToValue(order) if *order < 0 => {
            Err(new_validation_error("order_negative", "Order must be zero or greater"))
        }
        OptionField::SetToNull => Err(new_validation_error("field_required", "This field cannot be null")),
        _ => Ok(()),
    }
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

fn normalize_url_field(field: OptionField<String>) -> OptionField<String> {
    match field {
        OptionField::SetToValue(url) if url.trim().is_empty() => OptionField::SetToNull,
        OptionField::SetToValue(url) => OptionField::SetToValue(url.trim().to_string()),
        other => other,
    }
}

/// Splits the stored comma-separated technologies into display items.
pub fn split_technologies(technologies: &str) -> Vec<String> {
    technologies
        .split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .map(str::to_string)
        .collect()
}

// ───── Conversions ──────────────────────────────────────────────────

impl TryFrom<NewProjectRequest> for ProjectInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewProjectRequest) -> Result<Self, Self::Error> {
        let insert = ProjectInsert {
            title: value.title,
            description: value.description,
            short_description: value.short_description,
            github_url: normalize_url(value.github_url),
            live_url: normalize_url(value.live_url),
            technologies: value.technologies,
            featured: value.featured,
            display_order: value.order,
        };

        insert.validate()?;
        Ok(insert)
    }
}

impl Project {
    pub fn technology_list(&self) -> Vec<String> {
        split_technologies(&self.technologies)
    }

    /// The stored image key, ignoring blank values.
    pub fn image_key(&self) -> Option<&str> {
        self.image.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn to_detail_response(&self, image_url: Option<String>) -> ProjectDetailResponse {
        ProjectDetailResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            short_description: self.short_description.clone(),
            github_url: self.github_url.clone(),
            live_url: self.live_url.clone(),
            image: image_url,
            technologies: self.technologies.clone(),
            technology_list: self.technology_list(),
            featured: self.featured,
            order: self.display_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn to_list_response(&self, image_url: Option<String>) -> ProjectListResponse {
        ProjectListResponse {
            id: self.id,
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            github_url: self.github_url.clone(),
            live_url: self.live_url.clone(),
            image: image_url,
            technology_list: self.technology_list(),
            featured: self.featured,
        }
    }
}
