use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Number of projects shown on the homepage.
pub const FEATURED_PROJECTS_LIMIT: i64 = 3;

/// Filename the frontend offers when the active resume is downloaded.
pub const RESUME_DOWNLOAD_FILENAME: &str = "Siri_Tech_Resume.pdf";

pub const PROJECT_IMAGE_DIR: &str = "projects";
pub const RESUME_DIR: &str = "resume";
