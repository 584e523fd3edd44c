pub mod extractors;
pub mod projects;
pub mod resume;
