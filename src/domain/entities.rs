pub mod admin_site;
pub mod media;
pub mod option_fields;
pub mod project;
pub mod resume;
pub mod stats;
