//! Credential generation and verifier derivation.
//!
//! A credential is a 32-byte random secret, handed out hex-encoded exactly
//! once. What gets stored is a per-key random salt and the scrypt output of
//! (secret, salt), so a database leak exposes nothing directly usable and
//! equal secrets never produce equal verifiers.

use scrypt::Params;

use crate::error::AppError;

/// scrypt CPU/memory cost exponent: N = 2^14.
const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size.
const SCRYPT_R: u32 = 8;
/// scrypt parallelization.
const SCRYPT_P: u32 = 1;
/// Verifier output length in bytes (128 hex characters once encoded).
const VERIFIER_BYTES: usize = 64;

/// Secret length in bytes (64 hex characters once encoded).
const SECRET_BYTES: usize = 32;
/// Salt length in bytes, 128 bits.
const SALT_BYTES: usize = 16;

/// A freshly generated credential.
///
/// `plaintext` goes to the caller once and is never persisted or logged;
/// `verifier` and `salt` are what the store keeps.
#[derive(Debug, Clone)]
pub struct GeneratedCredential {
    pub plaintext: String,
    pub verifier: String,
    pub salt: String,
}

/// Generate a new credential: random secret, random salt, derived verifier.
///
/// Pure function of its random inputs; no side effects.
pub fn generate() -> Result<GeneratedCredential, AppError> {
    let secret_bytes: [u8; SECRET_BYTES] = rand::random();
    let salt_bytes: [u8; SALT_BYTES] = rand::random();

    let plaintext = hex::encode(secret_bytes);
    let salt = hex::encode(salt_bytes);
    let verifier = derive_verifier(&plaintext, &salt)?;

    Ok(GeneratedCredential {
        plaintext,
        verifier,
        salt,
    })
}

/// Recompute the verifier for a presented secret and a stored salt.
///
/// Deterministic for fixed inputs; the cost parameters are fixed for the
/// service's lifetime, so verifiers stay comparable across restarts. The
/// KDF runs over the hex-encoded strings, matching how they are stored.
pub fn derive_verifier(plaintext: &str, salt: &str) -> Result<String, AppError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, VERIFIER_BYTES)
        .map_err(|e| AppError::Internal(format!("invalid scrypt parameters: {e}")))?;

    let mut output = [0u8; VERIFIER_BYTES];
    scrypt::scrypt(plaintext.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| AppError::Internal(format!("scrypt derivation failed: {e}")))?;

    Ok(hex::encode(output))
}
