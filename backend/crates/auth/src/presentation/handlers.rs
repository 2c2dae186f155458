//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::sync::Arc;

use crate::application::config::SiweConfig;
use crate::application::{
    CheckSessionUseCase, IssueNonceUseCase, SessionManager, SignOutUseCase, VerifyInput,
    VerifyMessageUseCase,
};
use crate::domain::repository::NonceStore;
use crate::domain::services::{Eip191Verifier, SignatureVerifier};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{MeResponse, VerifyRequest, VerifyResponse};

/// Shared state for SIWE handlers
#[derive(Clone)]
pub struct SiweAppState<R>
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<SiweConfig>,
    pub verifier: Arc<dyn SignatureVerifier>,
}

impl<R> SiweAppState<R>
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: SiweConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            verifier: Arc::new(Eip191Verifier),
        }
    }

    fn sessions(&self) -> SessionManager {
        SessionManager::new(self.config.clone())
    }
}

// ============================================================================
// Nonce
// ============================================================================

/// GET /nonce
pub async fn issue_nonce<R>(
    State(state): State<SiweAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    let now_ms = Utc::now().timestamp_millis();
    let sessions = state.sessions();
    let mut session = sessions.load(&headers, now_ms);

    let use_case = IssueNonceUseCase::new(state.repo.clone(), state.config.clone());
    let nonce = use_case.execute(&mut session, now_ms).await?;

    let cookie = sessions.set_cookie(&session)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::SET_COOKIE, cookie),
        ],
        nonce.to_string(),
    ))
}

// ============================================================================
// Verify
// ============================================================================

/// POST /verify
///
/// The updated session is written back on success and on failure, so a
/// failed attempt signs the browser out.
pub async fn verify<R>(
    State(state): State<SiweAppState<R>>,
    headers: HeaderMap,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> AuthResult<Response>
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    let Some(input) = body.ok().and_then(|Json(req)| {
        let signature = req.signature;
        req.message.map(|message| VerifyInput { message, signature })
    }) else {
        return Err(AuthError::MissingBody);
    };

    let now = Utc::now();
    let sessions = state.sessions();
    let mut session = sessions.load(&headers, now.timestamp_millis());

    let use_case = VerifyMessageUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.verifier.clone(),
    );
    let result = use_case.execute(&mut session, input, now).await;

    let cookie = sessions.set_cookie(&session)?;

    Ok(match result {
        Ok(verified) => (
            [(header::SET_COOKIE, cookie)],
            Json(VerifyResponse {
                ok: true,
                data: verified.message,
            }),
        )
            .into_response(),
        Err(e) => ([(header::SET_COOKIE, cookie)], e).into_response(),
    })
}

// ============================================================================
// Session
// ============================================================================

/// GET /me
pub async fn me<R>(
    State(state): State<SiweAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<MeResponse>>
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    let session = state.sessions().load(&headers, Utc::now().timestamp_millis());

    let output = CheckSessionUseCase::new(state.config.clone()).execute(&session)?;

    Ok(Json(MeResponse {
        address: output.address,
        is_admin: output.is_admin,
    }))
}

/// POST /signout
pub async fn sign_out<R>(
    State(state): State<SiweAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: NonceStore + Clone + Send + Sync + 'static,
{
    let sessions = state.sessions();
    let session = sessions.load(&headers, Utc::now().timestamp_millis());

    SignOutUseCase::new(state.repo.clone())
        .execute(&session)
        .await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, sessions.clear_cookie())],
    ))
}
