//! Domain Services
//!
//! EIP-191 signature recovery and the SIWE verification pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use kernel::address::WalletAddress;
use platform::crypto::keccak256;

use crate::domain::message::SiweMessage;
use crate::error::{AuthError, AuthResult};

/// `r || s || v`
pub const SIGNATURE_LEN: usize = 65;

const PERSONAL_SIGN_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Recovers the address that signed a message
pub trait SignatureVerifier: Send + Sync {
    fn recover(&self, message: &[u8], signature: &str) -> AuthResult<WalletAddress>;
}

/// `personal_sign` (EIP-191 version 0x45) over secp256k1
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip191Verifier;

impl SignatureVerifier for Eip191Verifier {
    fn recover(&self, message: &[u8], signature: &str) -> AuthResult<WalletAddress> {
        let bytes = decode_signature(signature).ok_or(AuthError::InvalidSignature)?;

        let mut signature =
            Signature::from_slice(&bytes[..64]).map_err(|_| AuthError::InvalidSignature)?;
        let v = match bytes[64] {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            _ => return Err(AuthError::InvalidSignature),
        };
        let mut recovery_id = RecoveryId::from_byte(v).ok_or(AuthError::InvalidSignature)?;

        // High-s signatures recover with the flipped parity
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
        }

        let key = VerifyingKey::recover_from_prehash(&eip191_hash(message), &signature, recovery_id)
            .map_err(|_| AuthError::InvalidSignature)?;

        Ok(address_from_verifying_key(&key))
    }
}

fn decode_signature(signature: &str) -> Option<[u8; SIGNATURE_LEN]> {
    let hex_part = signature.trim();
    let hex_part = hex_part
        .strip_prefix("0x")
        .or_else(|| hex_part.strip_prefix("0X"))
        .unwrap_or(hex_part);

    let mut bytes = [0u8; SIGNATURE_LEN];
    hex::decode_to_slice(hex_part, &mut bytes).ok()?;
    Some(bytes)
}

/// Keccak-256 of `"\x19Ethereum Signed Message:\n" + len(message) + message`
pub fn eip191_hash(message: &[u8]) -> [u8; 32] {
    let mut data = Vec::with_capacity(PERSONAL_SIGN_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(PERSONAL_SIGN_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Last 20 bytes of the Keccak-256 of the uncompressed public key
pub fn address_from_verifying_key(key: &VerifyingKey) -> WalletAddress {
    let point = key.as_affine().to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    WalletAddress::from_bytes(address)
}

/// Successful verification result
#[derive(Debug, Clone)]
pub struct VerifiedMessage {
    pub message: SiweMessage,
}

/// Validates a signed SIWE message against the nonce issued to the session
#[derive(Clone)]
pub struct MessageVerifier {
    verifier: Arc<dyn SignatureVerifier>,
    expected_domain: Option<String>,
}

impl MessageVerifier {
    pub fn new(verifier: Arc<dyn SignatureVerifier>, expected_domain: Option<String>) -> Self {
        Self {
            verifier,
            expected_domain,
        }
    }

    /// Check order: parse, nonce, domain, time bounds, signature.
    /// Consuming the nonce is the caller's job and happens before this runs.
    pub fn verify(
        &self,
        raw: &str,
        signature: Option<&str>,
        expected_nonce: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<VerifiedMessage> {
        let message: SiweMessage = raw.parse()?;

        match expected_nonce {
            Some(nonce) if nonce == message.nonce => {}
            _ => return Err(AuthError::NonceMismatch),
        }

        if let Some(domain) = &self.expected_domain {
            if !domain.eq_ignore_ascii_case(&message.domain) {
                return Err(AuthError::DomainMismatch);
            }
        }

        message.check_time_bounds(now)?;

        let signature = signature.ok_or(AuthError::InvalidSignature)?;
        let recovered = self.verifier.recover(raw.as_bytes(), signature)?;
        if recovered != message.address {
            return Err(AuthError::InvalidSignature);
        }

        Ok(VerifiedMessage { message })
    }
}

/// Produce a `personal_sign` signature the way a wallet would
#[cfg(test)]
pub(crate) fn personal_sign(key: &k256::ecdsa::SigningKey, message: &str) -> String {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&eip191_hash(message.as_bytes()))
        .unwrap();
    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);
    format!("0x{}", hex::encode(bytes))
}
