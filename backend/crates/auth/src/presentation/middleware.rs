//! Caller Middleware
//!
//! Decodes the session cookie on every request and stores the resulting
//! [`Caller`] in the request extensions. It never rejects: handlers decide
//! what an anonymous or unprivileged caller may do.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use kernel::caller::Caller;
use std::sync::Arc;

use crate::application::config::SiweConfig;
use crate::application::session_manager::SessionManager;

/// Middleware state
#[derive(Clone)]
pub struct CallerState {
    pub config: Arc<SiweConfig>,
}

impl CallerState {
    pub fn new(config: SiweConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Use with `axum::middleware::from_fn_with_state`
pub async fn resolve_caller(
    State(state): State<CallerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = SessionManager::new(state.config.clone())
        .load(req.headers(), Utc::now().timestamp_millis());

    let caller = match session.address() {
        Some(address) => Caller::authenticated(*address, state.config.admins.contains(address)),
        None => Caller::anonymous(),
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}
