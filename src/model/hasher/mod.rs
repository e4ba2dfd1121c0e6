pub mod argon;
pub mod bcrypt;

use std::str::FromStr;
use derive_more::Display;
use std::ops::RangeInclusive;
use serde::{Deserialize, Serialize};
use crate::utils::{self, config::Configuration, errors::{ErrorCode, RosterError}};

const BCRYPT_COST:      RangeInclusive<u32> = 4..=31;
const ARGON_ITERATIONS: RangeInclusive<u32> = 1..=64;

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize, PartialEq)]
pub enum Algorithm {
    Argon,
    BCrypt,
}

///
/// Salted, deliberately slow one-way hashing of admin passwords.
///
/// New hashes use the configured algorithm and cost. Verification reads the algorithm from the
/// stored hash, so existing hashes keep working if the configuration changes.
///
#[derive(Clone, Debug)]
pub struct Hasher {
    algorithm: Algorithm,
    cost: u32,
    decoy: String, // Verified against when there is no account, so the response takes as long.
}

impl Hasher {
    pub fn new(algorithm: Algorithm, cost: u32) -> Result<Self, RosterError> {
        let range = match algorithm {
            Algorithm::Argon  => ARGON_ITERATIONS,
            Algorithm::BCrypt => BCRYPT_COST,
        };

        if !range.contains(&cost) {
            return Err(ErrorCode::InvalidConfig
                .with_msg(&format!("{} cost must be in the range {:?}", algorithm, range)))
        }

        let mut hasher = Hasher { algorithm, cost, decoy: String::new() };
        hasher.decoy = hasher.hash(&utils::random_hex(16))?;
        Ok(hasher)
    }

    pub fn from_config(config: &Configuration) -> Result<Self, RosterError> {
        Self::new(Algorithm::from_str(&config.hash_algorithm)?, config.hash_cost)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    ///
    /// Hash the plain text password into a self-describing string ($2b$... or $argon2id$...).
    ///
    pub fn hash(&self, plain_text_password: &str) -> Result<String, RosterError> {
        match self.algorithm {
            Algorithm::Argon  => argon::hash(plain_text_password, self.cost),
            Algorithm::BCrypt => bcrypt::hash(plain_text_password, self.cost),
        }
    }

    ///
    /// Hash on the blocking thread pool - this is highly CPU-bound and mustn't stall the event loop.
    ///
    pub async fn hash_blocking(&self, plain_text_password: &str) -> Result<String, RosterError> {
        let hasher = self.clone();
        let plain_text_password = plain_text_password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&plain_text_password))
            .await
            .map_err(RosterError::from)?
    }

    ///
    /// Spend the same effort as a real verification, for callers who have nothing to verify against.
    ///
    pub async fn verify_decoy(&self, plain_text_password: &str) -> Result<bool, RosterError> {
        verify_blocking(plain_text_password, &self.decoy).await
    }
}

///
/// Validate if the plain_text_password matches the hashed password provided.
///
/// The algorithm is selected from the hash itself.
///
pub fn verify(plain_text_password: &str, hashed: &str) -> Result<bool, RosterError> {
    match select(hashed)? {
        Algorithm::Argon  => argon::verify(hashed, plain_text_password),
        Algorithm::BCrypt => bcrypt::verify(hashed, plain_text_password),
    }
}

pub async fn verify_blocking(plain_text_password: &str, hashed: &str) -> Result<bool, RosterError> {
    let plain_text_password = plain_text_password.to_string();
    let hashed = hashed.to_string();

    tokio::task::spawn_blocking(move || verify(&plain_text_password, &hashed))
        .await
        .map_err(RosterError::from)?
}

///
/// Parse the first part of the hash string and return the algorithm.
///
fn select(hashed: &str) -> Result<Algorithm, RosterError> {
    let mut split = hashed.split('$');
    split.next(); /* Skip first it's blank */

    match split.next() {
        Some(algorithm) => Algorithm::from_str(algorithm)
            .map_err(|_| ErrorCode::InvalidPHCFormat.with_msg(&format!("algorithm {} is un-handled", algorithm))),
        None => Err(ErrorCode::InvalidPHCFormat.with_msg("The hash is invalid, there's no algorithm")),
    }
}

impl FromStr for Algorithm {
    type Err = RosterError;

    fn from_str(input: &str) -> Result<Algorithm, Self::Err> {
        match input {
            "argon"    |
            "argon2"   |
            "argon2i"  |
            "argon2d"  |
            "argon2id" => Ok(Algorithm::Argon),

            "bcrypt" |
            "2a" |
            "2b" |
            "2x" |
            "2y" => Ok(Algorithm::BCrypt),

            _ => Err(ErrorCode::UnknownAlgorithm.with_msg(&format!("Unknown hashing algorithm {}", input))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_argon2id() -> Result<(), RosterError> {
        let phc = "$argon2id$v=19$m=16384,t=20,p=1$77QFGJMDLMwvR7+lYvuNtw$82Byd2enomP62Z01Wcb1g5+KApYhQygW6BEYCXnZj5A";
        assert_eq!(select(phc)?, Algorithm::Argon);
        Ok(())
    }

    #[test]
    fn test_select_bcrypt() -> Result<(), RosterError> {
        assert_eq!(select("$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy")?, Algorithm::BCrypt);
        assert_eq!(select("$2y$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy")?, Algorithm::BCrypt);
        Ok(())
    }

    #[test]
    fn test_unknown_hash_is_a_hashing_failure() {
        let err = verify("secret1", "plain-text-by-mistake").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPHCFormat);

        let err = verify("secret1", "$md5$abc").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPHCFormat);
    }

    #[test]
    fn test_hashes_are_salted() -> Result<(), RosterError> {
        let hasher = Hasher::new(Algorithm::BCrypt, 4)?;
        let first = hasher.hash("secret1")?;
        let second = hasher.hash("secret1")?;

        assert_ne!(first, second);
        assert!(verify("secret1", &first)?);
        assert!(verify("secret1", &second)?);
        assert!(!verify("secret2", &first)?);
        Ok(())
    }

    #[test]
    fn test_hashes_from_either_algorithm_verify() -> Result<(), RosterError> {
        let argon = Hasher::new(Algorithm::Argon, 1)?.hash("secret1")?;
        let bcrypt = Hasher::new(Algorithm::BCrypt, 4)?.hash("secret1")?;

        assert!(argon.starts_with("$argon2id$"));
        assert!(bcrypt.starts_with("$2b$"));
        assert!(verify("secret1", &argon)?);
        assert!(verify("secret1", &bcrypt)?);
        Ok(())
    }

    #[test]
    fn test_cost_outside_range_is_rejected() {
        let err = Hasher::new(Algorithm::BCrypt, 3).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidConfig);

        let err = Hasher::new(Algorithm::Argon, 0).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidConfig);
    }

    #[test]
    fn test_algorithm_names_from_config() -> Result<(), RosterError> {
        assert_eq!(Algorithm::from_str("bcrypt")?, Algorithm::BCrypt);
        assert_eq!(Algorithm::from_str("argon2")?, Algorithm::Argon);
        assert_eq!(Algorithm::from_str("md5").unwrap_err().error_code(), ErrorCode::UnknownAlgorithm);
        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_variants_agree() -> Result<(), RosterError> {
        let hasher = Hasher::new(Algorithm::BCrypt, 4)?;
        let hashed = hasher.hash_blocking("secret1").await?;

        assert!(verify_blocking("secret1", &hashed).await?);
        assert!(!verify_blocking("wrong", &hashed).await?);
        assert!(!hasher.verify_decoy("secret1").await?);
        Ok(())
    }
}
