pub mod archive;
pub mod handlers;
mod items;
mod state;

pub use items::{prepare_share_items, ShareBundle, ShareError, ShareItem};
pub use state::SendAppState;
