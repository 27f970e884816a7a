//! Argon2id secret hashing and verification.
//!
//! Output is a PHC string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! so the salt and cost travel with the hash and [`verify`] needs nothing else.
use super::HashError;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::Version;
use argon2::password_hash::SaltString;
use enroll_core::ARGON2_ITERATIONS;
use enroll_core::ARGON2_MEMORY_KIB;
use enroll_core::ARGON2_PARALLELISM;
use enroll_core::SALT_BYTES;

fn salt() -> Result<SaltString, HashError> {
    use rand::TryRngCore;
    let mut bytes = [0u8; SALT_BYTES];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| HashError::Entropy(e.to_string()))?;
    SaltString::encode_b64(&bytes).map_err(|e| HashError::Compute(e.to_string()))
}

fn argon2() -> Result<Argon2<'static>, HashError> {
    Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .map(|params| Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
        .map_err(|e| HashError::Compute(e.to_string()))
}

/// Hashes with a fresh salt. Blocking and deliberately slow.
pub fn hash(password: &str) -> Result<String, HashError> {
    let ref salt = salt()?;
    argon2()?
        .hash_password(password.as_bytes(), salt)
        .map(|h| h.to_string())
        .map_err(|e| HashError::Compute(e.to_string()))
}

/// Checks a plaintext against a stored hash using the cost encoded in it.
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}
