//! Column family definitions.

/// Sign-in nonces: nonce → NonceRecord (TTL: nonce lifetime)
pub const CF_NONCES: &str = "siwe_nonces";

/// ENS forward cache: lowercase name → cached address lookup
pub const CF_ENS_FORWARD: &str = "ens_forward";

/// ENS reverse cache: lowercase 0x-address → cached name lookup
pub const CF_ENS_REVERSE: &str = "ens_reverse";

/// Get all column family names
pub fn all_column_families() -> Vec<&'static str> {
    vec![CF_NONCES, CF_ENS_FORWARD, CF_ENS_REVERSE]
}
