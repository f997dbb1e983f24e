//! EIP-4361 (Sign-In with Ethereum) message parsing and claim validation.
//!
//! Parsing is strict: the header, address and blank lines are positional,
//! and every field line must be one of a fixed set of keys appearing in
//! canonical order, at most once. Anything else rejects the whole message.

use crate::errors::{AuthError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::borrow::Cow;
use tracing::warn;
use url::Url;
use web3_auth_crypto::{addresses_equal, is_valid_address};

/// Suffix of the first line after the domain
pub const HEADER_SUFFIX: &str = " wants you to sign in with your Ethereum account:";

/// Only supported message version
pub const SIWE_VERSION: &str = "1";

/// Minimum nonce length (alphanumeric characters)
pub const MIN_NONCE_LENGTH: usize = 8;

/// Default tolerance for `Issued At` ahead of the server clock
pub const DEFAULT_CLOCK_SKEW_SECONDS: u64 = 30;

const RESOURCES_HEADER: &str = "Resources:";
const RESOURCE_PREFIX: &str = "- ";

const FIELD_COUNT: usize = 8;

/// Recognised field keys in canonical order
const FIELD_KEYS: [&str; FIELD_COUNT] = [
    "URI",
    "Version",
    "Chain ID",
    "Nonce",
    "Issued At",
    "Expiration Time",
    "Not Before",
    "Request ID",
];

const URI: usize = 0;
const VERSION: usize = 1;
const CHAIN_ID: usize = 2;
const NONCE: usize = 3;
const ISSUED_AT: usize = 4;
const EXPIRATION_TIME: usize = 5;
const NOT_BEFORE: usize = 6;
const REQUEST_ID: usize = 7;

/// SIWE verification settings
#[derive(Debug, Clone)]
pub struct SiweConfig {
    /// Domain (RFC 3986 authority) this deployment serves
    pub expected_domain: String,
    /// Chain id messages must target
    pub expected_chain_id: u64,
    /// How far `Issued At` may run ahead of the server clock, in seconds
    pub clock_skew_seconds: u64,
    /// Reject signatures whose EIP-155 `v` implies a different chain
    pub strict_eip155_chain_id: bool,
}

impl Default for SiweConfig {
    fn default() -> Self {
        Self {
            expected_domain: "localhost".to_string(),
            expected_chain_id: 1,
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
            strict_eip155_chain_id: false,
        }
    }
}

/// A parsed EIP-4361 message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessage {
    /// Requesting domain
    pub domain: String,
    /// Signing address as written in the message
    pub address: String,
    /// Optional human-readable statement
    pub statement: Option<String>,
    /// Subject of the signing
    pub uri: String,
    /// Message version, always `1`
    pub version: String,
    /// EIP-155 chain id
    pub chain_id: Option<u64>,
    /// Server-issued nonce
    pub nonce: String,
    /// Time of message creation
    pub issued_at: DateTime<Utc>,
    /// Time after which the message is no longer valid
    pub expiration_time: Option<DateTime<Utc>>,
    /// Time before which the message is not yet valid
    pub not_before: Option<DateTime<Utc>>,
    /// System-specific request identifier
    pub request_id: Option<String>,
    /// Resources the user wishes to have resolved
    pub resources: Vec<String>,
    raw: Option<String>,
}

fn malformed(reason: impl Into<String>) -> AuthError {
    AuthError::MalformedMessage(reason.into())
}

fn parse_timestamp(key: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| malformed(format!("{} is not RFC 3339: {}", key, e)))
}

fn parse_uri(key: &str, value: &str) -> Result<String> {
    Url::parse(value).map_err(|e| malformed(format!("{} is not a valid URI: {}", key, e)))?;
    Ok(value.to_string())
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn unix_datetime(secs: u64) -> Result<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| AuthError::Configuration(format!("timestamp {} out of range", secs)))
}

impl SiweMessage {
    /// Create a minimal message; optional fields can be set afterwards
    pub fn new(
        domain: impl Into<String>,
        address: impl Into<String>,
        uri: impl Into<String>,
        nonce: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            domain: domain.into(),
            address: address.into(),
            statement: None,
            uri: uri.into(),
            version: SIWE_VERSION.to_string(),
            chain_id: None,
            nonce: nonce.into(),
            issued_at,
            expiration_time: None,
            not_before: None,
            request_id: None,
            resources: Vec::new(),
            raw: None,
        }
    }

    /// Parse the plaintext of a SIWE message
    pub fn parse(message: &str) -> Result<Self> {
        let mut lines: Vec<&str> = message
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        let header = lines.first().ok_or_else(|| malformed("empty message"))?;
        let domain = header
            .strip_suffix(HEADER_SUFFIX)
            .ok_or_else(|| malformed("missing sign-in header"))?;
        if domain.is_empty() || domain.chars().any(char::is_whitespace) {
            return Err(malformed("invalid domain"));
        }

        let address = *lines.get(1).ok_or_else(|| malformed("missing address line"))?;
        if !is_valid_address(address) {
            return Err(malformed(format!("invalid address {}", address)));
        }

        if lines.get(2) != Some(&"") {
            return Err(malformed("expected blank line after address"));
        }

        let (statement, fields_start) = match lines.get(3) {
            None => return Err(malformed("missing URI")),
            Some(&"") => (None, 4),
            Some(line) if line.starts_with("URI: ") => (None, 3),
            Some(line) => {
                if lines.get(4) != Some(&"") {
                    return Err(malformed("expected blank line after statement"));
                }
                (Some(line.to_string()), 5)
            }
        };

        let mut values: [Option<&str>; FIELD_COUNT] = [None; FIELD_COUNT];
        let mut resources = Vec::new();
        let mut next_position = 0;

        let mut rest = lines.get(fields_start..).unwrap_or_default();
        while let Some((line, tail)) = rest.split_first() {
            rest = tail;

            if *line == RESOURCES_HEADER {
                for item in rest {
                    let resource = item
                        .strip_prefix(RESOURCE_PREFIX)
                        .ok_or_else(|| malformed(format!("unexpected line after Resources: {}", item)))?;
                    resources.push(parse_uri("Resource", resource)?);
                }
                if resources.is_empty() {
                    return Err(malformed("Resources: without any entries"));
                }
                break;
            }

            let (key, value) = line
                .split_once(": ")
                .ok_or_else(|| malformed(format!("unrecognised line: {}", line)))?;
            let position = FIELD_KEYS
                .iter()
                .position(|k| *k == key)
                .ok_or_else(|| malformed(format!("unknown field: {}", key)))?;
            if position < next_position {
                return Err(malformed(format!("{} is duplicated or out of order", key)));
            }

            values[position] = Some(value);
            next_position = position + 1;
        }

        let required = |index: usize| {
            values[index].ok_or_else(|| malformed(format!("missing {}", FIELD_KEYS[index])))
        };

        let uri = parse_uri(FIELD_KEYS[URI], required(URI)?)?;

        let version = required(VERSION)?;
        if version != SIWE_VERSION {
            return Err(malformed(format!("unsupported version {}", version)));
        }

        let chain_id = values[CHAIN_ID]
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|_| malformed(format!("invalid Chain ID {}", value)))
            })
            .transpose()?;

        let nonce = required(NONCE)?;
        if nonce.len() < MIN_NONCE_LENGTH || !nonce.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(malformed("nonce must be at least 8 alphanumeric characters"));
        }

        let issued_at = parse_timestamp(FIELD_KEYS[ISSUED_AT], required(ISSUED_AT)?)?;
        let expiration_time = values[EXPIRATION_TIME]
            .map(|value| parse_timestamp(FIELD_KEYS[EXPIRATION_TIME], value))
            .transpose()?;
        let not_before = values[NOT_BEFORE]
            .map(|value| parse_timestamp(FIELD_KEYS[NOT_BEFORE], value))
            .transpose()?;

        Ok(Self {
            domain: domain.to_string(),
            address: address.to_string(),
            statement,
            uri,
            version: version.to_string(),
            chain_id,
            nonce: nonce.to_string(),
            issued_at,
            expiration_time,
            not_before,
            request_id: values[REQUEST_ID].map(str::to_string),
            resources,
            raw: Some(message.to_string()),
        })
    }

    /// Original text, if this message was parsed
    pub fn raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Text a wallet signs for this message
    ///
    /// The original bytes for parsed messages, the canonical rendering
    /// otherwise.
    pub fn signing_text(&self) -> Cow<'_, str> {
        match &self.raw {
            Some(raw) => Cow::Borrowed(raw.as_str()),
            None => Cow::Owned(self.to_message()),
        }
    }

    /// Render the canonical EIP-4361 text
    pub fn to_message(&self) -> String {
        let mut lines = vec![
            format!("{}{}", self.domain, HEADER_SUFFIX),
            self.address.clone(),
            String::new(),
        ];

        if let Some(statement) = &self.statement {
            lines.push(statement.clone());
        }
        lines.push(String::new());

        lines.push(format!("URI: {}", self.uri));
        lines.push(format!("Version: {}", self.version));
        if let Some(chain_id) = self.chain_id {
            lines.push(format!("Chain ID: {}", chain_id));
        }
        lines.push(format!("Nonce: {}", self.nonce));
        lines.push(format!("Issued At: {}", format_timestamp(&self.issued_at)));
        if let Some(expiration_time) = &self.expiration_time {
            lines.push(format!("Expiration Time: {}", format_timestamp(expiration_time)));
        }
        if let Some(not_before) = &self.not_before {
            lines.push(format!("Not Before: {}", format_timestamp(not_before)));
        }
        if let Some(request_id) = &self.request_id {
            lines.push(format!("Request ID: {}", request_id));
        }
        if !self.resources.is_empty() {
            lines.push(RESOURCES_HEADER.to_string());
            for resource in &self.resources {
                lines.push(format!("{}{}", RESOURCE_PREFIX, resource));
            }
        }

        lines.join("\n")
    }

    /// Check address, domain, chain and time claims
    ///
    /// Runs the checks in a fixed order and reports the first failure.
    /// Nonce and signature checks are left to the caller.
    pub fn validate_claims(
        &self,
        claimed_address: &str,
        expected_domain: &str,
        expected_chain_id: u64,
        now: u64,
        clock_skew_seconds: u64,
    ) -> Result<()> {
        if !addresses_equal(&self.address, claimed_address) {
            warn!(message = %self.address, claimed = %claimed_address, "SIWE address mismatch");
            return Err(AuthError::AddressMismatch {
                claimed: claimed_address.to_string(),
                message: self.address.clone(),
            });
        }

        if self.domain != expected_domain {
            warn!(expected = %expected_domain, actual = %self.domain, "SIWE domain mismatch");
            return Err(AuthError::DomainMismatch {
                expected: expected_domain.to_string(),
                actual: self.domain.clone(),
            });
        }

        if let Some(chain_id) = self.chain_id {
            if chain_id != expected_chain_id {
                warn!(expected = expected_chain_id, actual = chain_id, "SIWE chain mismatch");
                return Err(AuthError::ChainMismatch {
                    expected: expected_chain_id,
                    actual: chain_id,
                });
            }
        }

        // Compare full timestamps so sub-second field values are not truncated
        let latest_issue = unix_datetime(now.saturating_add(clock_skew_seconds))?;
        let now = unix_datetime(now)?;

        if let Some(expiration_time) = &self.expiration_time {
            if *expiration_time <= now {
                warn!(expiration_time = %expiration_time, "SIWE message expired");
                return Err(AuthError::Expired);
            }
        }

        if self.issued_at > latest_issue {
            warn!(issued_at = %self.issued_at, "SIWE message issued in the future");
            return Err(AuthError::IssuedInFuture);
        }

        if let Some(not_before) = &self.not_before {
            if *not_before > now {
                warn!(not_before = %not_before, "SIWE message not yet valid");
                return Err(AuthError::NotYetValid);
            }
        }

        Ok(())
    }
}
