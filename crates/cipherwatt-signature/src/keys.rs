//! Ephemeral decryption key pairs
//!
//! Every fresh authorization gets its own Ed25519 key pair. The relayer
//! re-encrypts plaintexts towards the public half; the private half never
//! leaves the client.

use cipherwatt_core::AuthorizationSecret;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroize;

/// Freshly generated key material for one authorization.
#[derive(Debug, Clone)]
pub struct EphemeralKeyPair {
    /// Private key bytes
    pub secret: AuthorizationSecret,
    /// Public key bytes
    pub public: Vec<u8>,
}

/// Generate a new key pair from the operating system RNG.
pub fn generate_key_pair() -> EphemeralKeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public = signing_key.verifying_key().to_bytes().to_vec();
    let mut secret_bytes = signing_key.to_bytes();
    let secret = AuthorizationSecret::new(secret_bytes.to_vec());
    secret_bytes.zeroize();
    EphemeralKeyPair { secret, public }
}

/// Whether `public` is the verifying key derived from `secret`.
pub fn key_pair_matches(secret: &AuthorizationSecret, public: &[u8]) -> bool {
    let Ok(mut secret_bytes) = <[u8; 32]>::try_from(secret.expose()) else {
        return false;
    };
    let Ok(public_bytes) = <[u8; 32]>::try_from(public) else {
        return false;
    };
    let derived = SigningKey::from_bytes(&secret_bytes).verifying_key();
    secret_bytes.zeroize();
    VerifyingKey::from_bytes(&public_bytes).map_or(false, |expected| expected == derived)
}
