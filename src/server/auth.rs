//! Request extractor and token-gating helpers for server endpoints.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::collections::HashMap;

use crate::common::{AppError, Session, TransferState};

/// Route parameter carrying the link token, e.g. `/upload/:token`.
pub const TOKEN_PARAM: &str = "token";

/// Token from the URL path that the session's authority accepted.
pub struct ValidToken(pub String);

#[async_trait]
impl<S: TransferState> FromRequestParts<S> for ValidToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let service = state.service_path();

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| link_rejected(service))?;

        let token = params
            .get(TOKEN_PARAM)
            .ok_or_else(|| link_rejected(service))?;

        require_valid_token(state.session(), token, service)?;

        Ok(ValidToken(token.clone()))
    }
}

/// Require `token` to be currently authorized for this session.
pub fn require_valid_token(session: &Session, token: &str, service: &str) -> Result<(), AppError> {
    if !session.is_authorized(token) {
        // Unknown and expired tokens are deliberately reported the same way.
        tracing::debug!(service, "rejected request with invalid or expired token");
        return Err(link_rejected(service));
    }
    Ok(())
}

fn link_rejected(service: &str) -> AppError {
    let label = match service {
        "upload" => "Upload",
        "share" => "Share",
        _ => "Link",
    };
    AppError::Unauthorized(format!("{label} link expired or invalid"))
}
