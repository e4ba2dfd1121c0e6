pub mod account;
pub mod events;
pub mod hasher;
pub mod lockout;
pub mod reset_token;
pub mod session;
pub mod user;
