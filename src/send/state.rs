use crate::common::{Session, TransferState};
use crate::send::items::ShareItem;
use std::sync::Arc;

/// Send-specific application state
/// Passed to all share handlers via Axum State extractor
#[derive(Clone)]
pub struct SendAppState {
    pub session: Session,
    items: Arc<Vec<ShareItem>>,
}

impl SendAppState {
    pub fn new(session: Session, items: Vec<ShareItem>) -> Self {
        Self {
            session,
            items: Arc::new(items),
        }
    }

    pub fn items(&self) -> &[ShareItem] {
        &self.items
    }

    pub fn get_item(&self, index: usize) -> Option<&ShareItem> {
        self.items.get(index)
    }
}

impl TransferState for SendAppState {
    fn session(&self) -> &Session {
        &self.session
    }

    fn service_path(&self) -> &'static str {
        "share"
    }

    fn is_receiving(&self) -> bool {
        false
    }
}
