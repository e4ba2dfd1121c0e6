use rand_core::OsRng;
use crate::utils::errors::RosterError;
use argon2::{Algorithm, Argon2, Params, Version, password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString}};

const MEMORY_SIZE_KB: u32 = 1024 * 16;
const PARALLELISM:    u32 = 1;

///
/// Argon2id with the iterations as the tunable cost.
///
pub fn hash(plain_text_password: &str, iterations: u32) -> Result<String, RosterError> {
    let params = Params::new(MEMORY_SIZE_KB, iterations, PARALLELISM, None)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);

    // Hash password to PHC string ($argon2id$v=19$...)
    Ok(argon2.hash_password(plain_text_password.as_bytes(), &salt)?.to_string())
}

pub fn verify(phc: &str, plain_text_password: &str) -> Result<bool, RosterError> {
    let parsed_hash = PasswordHash::new(phc)?;
    Ok(Argon2::default().verify_password(plain_text_password.as_bytes(), &parsed_hash).is_ok())
}
