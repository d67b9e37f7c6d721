pub mod admin;
pub mod content_config;
pub mod content_log;
pub mod login_log;
pub mod registration;
