pub use super::admins::Entity as Admins;
pub use super::content_config::Entity as ContentConfig;
pub use super::content_logs::Entity as ContentLogs;
pub use super::login_logs::Entity as LoginLogs;
pub use super::registrations::Entity as Registrations;
