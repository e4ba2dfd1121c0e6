use uuid::Uuid;
use std::fmt::Write;
use rand::{RngCore, rngs::OsRng};

pub mod config;
pub mod context;
pub mod errors;
pub mod health;
pub mod kafka;
pub mod time_provider;


pub fn generate_id() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}

///
/// Hex encode the given number of bytes from the OS RNG - used for bearer credentials such as
/// reset tokens and session ids.
///
pub fn random_hex(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);

    buffer.iter().fold(String::with_capacity(bytes * 2), |mut output, byte| {
        let _ = write!(output, "{:02x}", byte);
        output
    })
}
