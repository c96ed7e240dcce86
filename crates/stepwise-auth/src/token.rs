//! CLI token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Generate a cryptographically random CLI token of `len` bytes,
/// base64url-encoded without padding.
pub fn generate_cli_token(len: usize) -> String {
    let mut bytes = vec![0u8; len.max(16)];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
