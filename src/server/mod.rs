// Submodules
mod api;
pub mod auth;
pub mod routes;
pub mod runtime;

// Public API (what main.rs imports)
pub use api::{
    new_session, prepare_upload_dir, start_receive_server, start_share_server, ServerInstance,
};
