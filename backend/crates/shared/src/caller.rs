//! Request Caller
//!
//! Who is making the current request, as resolved from the session cookie
//! by the auth middleware. Handlers in other crates only ever see this type,
//! never the session itself.

use crate::address::WalletAddress;

/// Reason a privileged operation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallerError {
    #[error("Unauthorized: no session")]
    Anonymous,

    #[error("Forbidden: admins only")]
    NotPrivileged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    address: Option<WalletAddress>,
    privileged: bool,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(address: WalletAddress, privileged: bool) -> Self {
        Self {
            address: Some(address),
            privileged,
        }
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    /// Only an authenticated caller can be privileged.
    pub fn is_privileged(&self) -> bool {
        self.address.is_some() && self.privileged
    }

    /// Gate for write endpoints. There is no fallback identity.
    pub fn require_privileged(&self) -> Result<&WalletAddress, CallerError> {
        let address = self.address.as_ref().ok_or(CallerError::Anonymous)?;
        if !self.privileged {
            return Err(CallerError::NotPrivileged);
        }
        Ok(address)
    }
}

/// Handlers can take `Caller` directly; a request that never passed through
/// the auth middleware is anonymous.
#[cfg(feature = "axum")]
impl<S> axum::extract::FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Caller>().cloned().unwrap_or_default())
    }
}
