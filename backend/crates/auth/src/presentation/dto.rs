//! API DTOs (Data Transfer Objects)

use kernel::address::WalletAddress;
use serde::{Deserialize, Serialize};

use crate::domain::message::SiweMessage;

// ============================================================================
// Verify
// ============================================================================

/// Verify request. Both fields are optional here so that their absence
/// maps to the right error instead of a generic rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Verify response
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub data: SiweMessage,
}

// ============================================================================
// Me
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub address: WalletAddress,
    pub is_admin: bool,
}
