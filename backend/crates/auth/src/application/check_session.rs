//! Check Session Use Case
//!
//! Backs `GET /me`.

use std::sync::Arc;

use kernel::address::WalletAddress;

use crate::application::config::SiweConfig;
use crate::domain::session::Session;
use crate::error::{AuthError, AuthResult};

/// Session info output
pub struct SessionInfoOutput {
    pub address: WalletAddress,
    pub is_admin: bool,
}

/// Check session use case
pub struct CheckSessionUseCase {
    config: Arc<SiweConfig>,
}

impl CheckSessionUseCase {
    pub fn new(config: Arc<SiweConfig>) -> Self {
        Self { config }
    }

    pub fn execute(&self, session: &Session) -> AuthResult<SessionInfoOutput> {
        let address = *session.address().ok_or(AuthError::NotSignedIn)?;

        Ok(SessionInfoOutput {
            address,
            is_admin: self.config.admins.contains(&address),
        })
    }
}
