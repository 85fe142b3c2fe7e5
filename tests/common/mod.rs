#![allow(dead_code)]

pub mod config_test_utils;
pub mod http;

use qrdrop::common::{Session, SessionLifecycle};
use qrdrop::receive::ReceiveAppState;
use qrdrop::send::{SendAppState, ShareItem};
use qrdrop::server::routes;
use axum::Router;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const BODY_LIMIT: usize = 16 * 1024 * 1024;
pub const TEST_GRACE: Duration = Duration::from_millis(20);

pub fn setup_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

pub fn test_session(exit_on_transfer: bool) -> Session {
    Session::start(
        chrono::Duration::minutes(15),
        SessionLifecycle::with_grace(exit_on_transfer, TEST_GRACE),
    )
}

//===========
// App Factories
//===========
pub fn create_receive_test_app(output_dir: PathBuf, exit_on_transfer: bool) -> (Router, Session) {
    let session = test_session(exit_on_transfer);
    let state = ReceiveAppState::new(session.clone(), output_dir);
    let app = routes::create_receive_router(&state, BODY_LIMIT);
    (app, session)
}

pub fn create_send_test_app(items: Vec<ShareItem>, exit_on_transfer: bool) -> (Router, Session) {
    let session = test_session(exit_on_transfer);
    let state = SendAppState::new(session.clone(), items);
    let app = routes::create_send_router(&state);
    (app, session)
}
