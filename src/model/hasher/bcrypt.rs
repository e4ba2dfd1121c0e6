use crate::utils::errors::RosterError;

///
/// Blowfish based hashing - the salt is generated by the bcrypt crate from the OS RNG.
///
pub fn hash(plain_text_password: &str, cost: u32) -> Result<String, RosterError> {
    Ok(::bcrypt::hash(plain_text_password, cost)?)
}

pub fn verify(hashed: &str, plain_text_password: &str) -> Result<bool, RosterError> {
    ::bcrypt::verify(plain_text_password, hashed).map_err(RosterError::from)
}
