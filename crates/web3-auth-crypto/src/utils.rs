//! Common utility functions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is set before the Unix epoch, which
/// makes every time-bound check fail closed.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Source of "now" as Unix seconds
///
/// Supplied by the host so expiry logic can be driven deterministically.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Wall clock backed by [`current_timestamp`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        current_timestamp()
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at `now`
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `seconds`
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Decode a `0x`-prefixed (or bare) hex string
pub fn decode_hex_prefixed(data: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    let trimmed = data.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
}

/// Encode bytes as `0x`-prefixed lowercase hex
pub fn encode_hex_prefixed(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}
