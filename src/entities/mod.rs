pub mod prelude;

pub mod admins;
pub mod content_config;
pub mod content_logs;
pub mod login_logs;
pub mod registrations;
