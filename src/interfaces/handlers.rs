pub mod admin;
pub mod home;
pub mod projects;
pub mod resume;
pub mod system;
