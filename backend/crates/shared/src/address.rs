//! Wallet Address Value Object
//!
//! A 20-byte Ethereum account address.
//!
//! Two parsing modes exist:
//! - [`WalletAddress::parse`] accepts any casing (allow-list entries, lookups)
//! - [`WalletAddress::parse_checked`] additionally requires a valid EIP-55
//!   checksum when the input is mixed-case (addresses inside signed messages)
//!
//! The canonical storage form is lower-case hex; the display form is EIP-55.
//!
//! ## Usage
//! ```rust
//! use kernel::address::WalletAddress;
//!
//! let addr = WalletAddress::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
//! assert_eq!(addr.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must be 40 hex characters, got {0}")]
    InvalidLength(usize),

    #[error("address contains non-hex characters")]
    InvalidHex,

    #[error("address checksum (EIP-55) is invalid")]
    InvalidChecksum,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalletAddress([u8; ADDRESS_LEN]);

impl WalletAddress {
    #[inline]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Parse ignoring case.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let hex_part = strip_prefix(input.trim())?;
        decode(hex_part)
    }

    /// Parse, rejecting mixed-case input whose checksum does not match.
    pub fn parse_checked(input: &str) -> Result<Self, AddressError> {
        let hex_part = strip_prefix(input)?;
        let address = decode(hex_part)?;

        let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.checksum_hex() != hex_part {
            return Err(AddressError::InvalidChecksum);
        }

        Ok(address)
    }

    /// `0x` + 40 lower-case hex characters
    pub fn to_lowercase_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// `0x` + EIP-55 mixed-case hex
    pub fn to_checksum(&self) -> String {
        format!("0x{}", self.checksum_hex())
    }

    fn checksum_hex(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        lower
            .char_indices()
            .map(|(i, c)| {
                let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

fn strip_prefix(input: &str) -> Result<&str, AddressError> {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or(AddressError::MissingPrefix)
}

fn decode(hex_part: &str) -> Result<WalletAddress, AddressError> {
    if hex_part.len() != ADDRESS_LEN * 2 {
        return Err(AddressError::InvalidLength(hex_part.len()));
    }
    let mut bytes = [0u8; ADDRESS_LEN];
    hex::decode_to_slice(hex_part, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
    Ok(WalletAddress(bytes))
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.to_lowercase_hex())
    }
}

impl FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        WalletAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors from the EIP-55 specification
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for expected in CHECKSUMMED {
            let parsed = WalletAddress::parse(&expected.to_lowercase()).unwrap();
            assert_eq!(parsed.to_checksum(), expected);
        }
    }

    #[test]
    fn test_parse_checked_accepts_valid_and_single_case() {
        for addr in CHECKSUMMED {
            assert!(WalletAddress::parse_checked(addr).is_ok());
            assert!(WalletAddress::parse_checked(&addr.to_lowercase()).is_ok());
        }
    }

    #[test]
    fn test_parse_checked_rejects_bad_checksum() {
        // flip the case of one letter
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(
            WalletAddress::parse_checked(bad),
            Err(AddressError::InvalidChecksum)
        );
        // lenient parse still accepts it
        assert!(WalletAddress::parse(bad).is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            WalletAddress::parse("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            Err(AddressError::MissingPrefix)
        );
        assert_eq!(
            WalletAddress::parse("0x1234"),
            Err(AddressError::InvalidLength(4))
        );
        assert_eq!(
            WalletAddress::parse("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            Err(AddressError::InvalidHex)
        );
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = WalletAddress::parse("0x242DFB7849544EE242B2265CA7E585BDEC60456B").unwrap();
        let b = WalletAddress::parse("0x242dfb7849544ee242b2265ca7e585bdec60456b").unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.to_lowercase_hex(),
            "0x242dfb7849544ee242b2265ca7e585bdec60456b"
        );
    }

    #[test]
    fn test_serde_uses_checksum_form() {
        let addr = WalletAddress::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, r#""0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359""#);

        let back: WalletAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
