use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Prefix carried by every issued API key. Verification rejects anything
/// without it before touching the identity store.
pub const API_KEY_PREFIX: &str = "sk_";

/// Generates a cryptographically secure API key with 256 bits of entropy.
///
/// The key is formatted as `sk_{base64url_encoded_random_bytes}` where the
/// random bytes are 32 bytes (256 bits) of cryptographically secure random data.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut key_bytes);

    format!("{}{}", API_KEY_PREFIX, general_purpose::URL_SAFE_NO_PAD.encode(key_bytes))
}

/// Deterministic one-way digest of a raw API key, as lowercase hex.
///
/// The same digest is computed at issuance time and at verification time;
/// only the digest is ever stored or used as a lookup key.
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
