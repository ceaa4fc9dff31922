//! Endpoint secret issuance.
//!
//! Secrets are opaque bearer tokens handed to an endpoint exactly once, at
//! creation time, and later consumed by the delivery signer.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;

/// Recognizable tag so consumers can tell what the token is for.
const SECRET_PREFIX: &str = "whsec_";

/// Must be between 24 and 64 bytes; the delivery signature scheme rejects
/// keys outside that envelope.
const SECRET_SIZE: usize = 32;

/// Issue a new endpoint secret.
///
/// Reads `SECRET_SIZE` bytes from the OS entropy source and encodes them
/// as standard base64 behind the `whsec_` prefix. `OsRng` failure aborts
/// the process; an exhausted entropy source is not a recoverable error.
pub fn new_secret() -> String {
    let mut bytes = [0u8; SECRET_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    format!("{SECRET_PREFIX}{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_tagged_and_sized() {
        let secret = new_secret();
        let encoded = secret.strip_prefix(SECRET_PREFIX).expect("whsec_ prefix");
        let bytes = STANDARD.decode(encoded).expect("valid base64");
        assert_eq!(bytes.len(), SECRET_SIZE);
    }

    #[test]
    fn secrets_are_unique() {
        assert_ne!(new_secret(), new_secret());
    }
}
