use crate::common::{Session, TransferState};
use std::path::PathBuf;
use std::sync::Arc;

/// Receive-specific application state
/// Passed to all upload handlers via Axum State extractor
#[derive(Clone)]
pub struct ReceiveAppState {
    pub session: Session,
    destination: Arc<PathBuf>,
}

impl ReceiveAppState {
    pub fn new(session: Session, destination: PathBuf) -> Self {
        Self {
            session,
            destination: Arc::new(destination),
        }
    }

    pub fn destination(&self) -> &PathBuf {
        &self.destination
    }
}

impl TransferState for ReceiveAppState {
    fn session(&self) -> &Session {
        &self.session
    }

    fn service_path(&self) -> &'static str {
        "upload"
    }

    fn is_receiving(&self) -> bool {
        true
    }
}
