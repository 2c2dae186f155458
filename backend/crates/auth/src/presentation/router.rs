//! SIWE Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::application::config::SiweConfig;
use crate::domain::repository::NonceStore;
use crate::infra::postgres::PgNonceStore;
use crate::presentation::handlers::{self, SiweAppState};

/// Create the SIWE router with PostgreSQL nonce store
pub fn siwe_router(repo: PgNonceStore, config: SiweConfig) -> Router {
    siwe_router_generic(repo, config)
}

/// Create a generic SIWE router for any nonce store implementation
pub fn siwe_router_generic<R>(repo: R, config: SiweConfig) -> Router
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    siwe_router_with_state(SiweAppState::new(repo, config))
}

/// Create the SIWE router from a prepared state (custom signature verifier)
pub fn siwe_router_with_state<R>(state: SiweAppState<R>) -> Router
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/nonce", get(handlers::issue_nonce::<R>))
        .route("/verify", post(handlers::verify::<R>))
        .route("/me", get(handlers::me::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .with_state(state)
}
