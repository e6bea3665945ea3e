//! Access token generation and hashing
//!
//! Tokens are opaque random strings handed to the client once.
//! Only a keyed HMAC-SHA256 digest is persisted, so a database leak
//! does not expose usable credentials.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::AppError;

const TOKEN_BYTES: usize = 32;
const TOKEN_HASH_PREFIX: &str = "hmac-sha256:";

/// Generate a new opaque bearer token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute the storage hash for a token
///
/// # Arguments
/// * `token` - Raw token as handed to the client
/// * `secret` - HMAC secret key from configuration
pub fn hash_token(token: &str, secret: &str) -> Result<String, AppError> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid token secret: {}", e)))?;
    mac.update(token.as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(format!(
        "{}{}",
        TOKEN_HASH_PREFIX,
        URL_SAFE_NO_PAD.encode(digest)
    ))
}
