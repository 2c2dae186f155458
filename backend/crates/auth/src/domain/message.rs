//! SIWE Message (EIP-4361)
//!
//! Parses the human-readable sign-in message a wallet shows to the user.
//! The message is immutable once parsed; the signature always covers the
//! exact bytes the client sent, never [`SiweMessage`]'s `Display` output.
//!
//! ```text
//! ${scheme}://${domain} wants you to sign in with your Ethereum account:
//! ${address}
//!
//! ${statement}
//!
//! URI: ${uri}
//! Version: 1
//! Chain ID: ${chain-id}
//! Nonce: ${nonce}
//! Issued At: ${issued-at}
//! Expiration Time: ${expiration-time}
//! Not Before: ${not-before}
//! Request ID: ${request-id}
//! Resources:
//! - ${resources[0]}
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::address::{AddressError, WalletAddress};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::domain::nonce::is_valid_nonce;
use crate::error::AuthError;

const HEADER_SUFFIX: &str = " wants you to sign in with your Ethereum account:";
const URI_TAG: &str = "URI: ";
const VERSION_TAG: &str = "Version: ";
const CHAIN_ID_TAG: &str = "Chain ID: ";
const NONCE_TAG: &str = "Nonce: ";
const ISSUED_AT_TAG: &str = "Issued At: ";
const EXPIRATION_TIME_TAG: &str = "Expiration Time: ";
const NOT_BEFORE_TAG: &str = "Not Before: ";
const REQUEST_ID_TAG: &str = "Request ID: ";
const RESOURCES_TAG: &str = "Resources:";

/// The only message version defined by EIP-4361
pub const SUPPORTED_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("message is empty")]
    Empty,

    #[error("missing header line '<domain>{HEADER_SUFFIX}'")]
    MissingHeader,

    #[error("invalid domain '{0}'")]
    InvalidDomain(String),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("expected an empty line after {0}")]
    ExpectedBlankLine(&'static str),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid URI '{0}'")]
    InvalidUri(String),

    #[error("unsupported version '{0}'")]
    UnsupportedVersion(String),

    #[error("invalid chain id '{0}'")]
    InvalidChainId(String),

    #[error("nonce must be at least 8 alphanumeric characters")]
    InvalidNonce,

    #[error("invalid {field} timestamp '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("unexpected content '{0}'")]
    UnexpectedContent(String),
}

impl From<ParseError> for AuthError {
    fn from(err: ParseError) -> Self {
        AuthError::MalformedMessage(err.to_string())
    }
}

/// RFC 3339 timestamp that remembers how it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    original: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    fn parse(field: &'static str, value: &str) -> Result<Self, ParseError> {
        let instant = DateTime::parse_from_rfc3339(value)
            .map_err(|_| ParseError::InvalidTimestamp {
                field,
                value: value.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Self {
            original: value.to_string(),
            instant,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            original: instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            instant,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiweMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    pub domain: String,
    pub address: WalletAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

impl SiweMessage {
    /// `Expiration Time` is exclusive, `Not Before` inclusive.
    pub fn check_time_bounds(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if let Some(exp) = &self.expiration_time {
            if now >= exp.instant() {
                return Err(AuthError::Expired);
            }
        }
        if let Some(nbf) = &self.not_before {
            if now < nbf.instant() {
                return Err(AuthError::NotYetValid);
            }
        }
        Ok(())
    }
}

/// Line cursor over the message body
struct Lines<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(raw: &'a str) -> Self {
        let lines = raw
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    fn blank(&mut self, after: &'static str) -> Result<(), ParseError> {
        match self.next() {
            Some("") => Ok(()),
            _ => Err(ParseError::ExpectedBlankLine(after)),
        }
    }

    fn tagged(&mut self, tag: &'static str) -> Result<&'a str, ParseError> {
        self.optional_tagged(tag)
            .ok_or(ParseError::MissingField(tag.trim_end_matches([':', ' '])))
    }

    fn optional_tagged(&mut self, tag: &str) -> Option<&'a str> {
        let value = self.peek()?.strip_prefix(tag)?;
        self.pos += 1;
        Some(value)
    }

    /// Everything left must be empty lines (a trailing newline is fine).
    fn finish(&mut self) -> Result<(), ParseError> {
        match self.lines[self.pos..].iter().find(|line| !line.is_empty()) {
            Some(line) => Err(ParseError::UnexpectedContent(line.to_string())),
            None => Ok(()),
        }
    }
}

impl FromStr for SiweMessage {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let mut lines = Lines::new(raw);

        let header = lines
            .next()
            .and_then(|line| line.strip_suffix(HEADER_SUFFIX))
            .ok_or(ParseError::MissingHeader)?;
        let (scheme, domain) = match header.split_once("://") {
            Some((scheme, domain)) => (Some(scheme), domain),
            None => (None, header),
        };
        if let Some(scheme) = scheme {
            if !is_scheme(scheme) {
                return Err(ParseError::InvalidDomain(header.to_string()));
            }
        }
        if !is_authority(domain) {
            return Err(ParseError::InvalidDomain(domain.to_string()));
        }

        let address = WalletAddress::parse_checked(lines.next().unwrap_or_default())?;
        lines.blank("the address")?;

        // Statement block: `<statement>` + blank, a lone blank, or nothing at all
        let statement = match lines.peek() {
            Some(line) if line.starts_with(URI_TAG) => None,
            Some("") => {
                lines.next();
                None
            }
            Some(line) => {
                lines.next();
                lines.blank("the statement")?;
                Some(line.to_string())
            }
            None => return Err(ParseError::MissingField("URI")),
        };

        let uri = lines.tagged(URI_TAG)?;
        if !is_uri(uri) {
            return Err(ParseError::InvalidUri(uri.to_string()));
        }

        let version = lines.tagged(VERSION_TAG)?;
        if version != SUPPORTED_VERSION {
            return Err(ParseError::UnsupportedVersion(version.to_string()));
        }

        let chain_id = lines.tagged(CHAIN_ID_TAG)?;
        let chain_id = chain_id
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidChainId(chain_id.to_string()))?;

        let nonce = lines.tagged(NONCE_TAG)?;
        if !is_valid_nonce(nonce) {
            return Err(ParseError::InvalidNonce);
        }

        let issued_at = Timestamp::parse("Issued At", lines.tagged(ISSUED_AT_TAG)?)?;
        let expiration_time = lines
            .optional_tagged(EXPIRATION_TIME_TAG)
            .map(|value| Timestamp::parse("Expiration Time", value))
            .transpose()?;
        let not_before = lines
            .optional_tagged(NOT_BEFORE_TAG)
            .map(|value| Timestamp::parse("Not Before", value))
            .transpose()?;
        let request_id = lines.optional_tagged(REQUEST_ID_TAG).map(str::to_string);

        let mut resources = Vec::new();
        if lines.peek() == Some(RESOURCES_TAG) {
            lines.next();
            while let Some(resource) = lines.optional_tagged("- ") {
                if !is_uri(resource) {
                    return Err(ParseError::InvalidUri(resource.to_string()));
                }
                resources.push(resource.to_string());
            }
        }

        lines.finish()?;

        Ok(Self {
            scheme: scheme.map(str::to_string),
            domain: domain.to_string(),
            address,
            statement,
            uri: uri.to_string(),
            version: version.to_string(),
            chain_id,
            nonce: nonce.to_string(),
            issued_at,
            expiration_time,
            not_before,
            request_id,
            resources,
        })
    }
}

/// Canonical EIP-4361 rendering
impl fmt::Display for SiweMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        writeln!(f, "{}{HEADER_SUFFIX}", self.domain)?;
        writeln!(f, "{}", self.address.to_checksum())?;
        writeln!(f)?;
        if let Some(statement) = &self.statement {
            writeln!(f, "{statement}")?;
        }
        writeln!(f)?;
        writeln!(f, "{URI_TAG}{}", self.uri)?;
        writeln!(f, "{VERSION_TAG}{}", self.version)?;
        writeln!(f, "{CHAIN_ID_TAG}{}", self.chain_id)?;
        writeln!(f, "{NONCE_TAG}{}", self.nonce)?;
        write!(f, "{ISSUED_AT_TAG}{}", self.issued_at)?;
        if let Some(exp) = &self.expiration_time {
            write!(f, "\n{EXPIRATION_TIME_TAG}{exp}")?;
        }
        if let Some(nbf) = &self.not_before {
            write!(f, "\n{NOT_BEFORE_TAG}{nbf}")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, "\n{REQUEST_ID_TAG}{request_id}")?;
        }
        if !self.resources.is_empty() {
            write!(f, "\n{RESOURCES_TAG}")?;
            for resource in &self.resources {
                write!(f, "\n- {resource}")?;
            }
        }
        Ok(())
    }
}

fn is_scheme(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// RFC 3986 authority: `[userinfo@]host[:port]`
fn is_authority(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#'))
}

/// A URI needs a scheme; anything with whitespace is rejected.
fn is_uri(value: &str) -> bool {
    match value.split_once(':') {
        Some((scheme, rest)) => {
            is_scheme(scheme) && !rest.is_empty() && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
