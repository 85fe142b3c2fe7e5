pub mod config;
pub mod config_commands;
pub mod errors;
pub mod lifecycle;
pub mod session_core;
pub mod token;

pub use config::{AppConfig, ConfigOverrides};
pub use errors::AppError;
pub use lifecycle::SessionLifecycle;
pub use session_core::Session;
pub use token::TokenAuthority;

/// Trait for application states (upload/share) used by the runtime and auth
pub trait TransferState: Clone + Send + Sync + 'static {
    // Session access for authentication and URL generation
    fn session(&self) -> &Session;

    // URL path segment for the landing page: "upload" or "share"
    fn service_path(&self) -> &'static str;
    fn is_receiving(&self) -> bool;
}
