use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use super::lockout::LockoutState;

///
/// An administrator who may sign in and manage the user records.
///
/// The reset token and its expiry are private so they can only ever be set or cleared together.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AdminAccount {
    pub account_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub failed_login_attempts: u32,
    pub is_locked: bool,
    reset_token: Option<String>,
    reset_token_expires_at: Option<bson::DateTime>,
    pub created_on: bson::DateTime,
}

impl AdminAccount {
    ///
    /// A freshly registered admin - the password must already have been hashed by the caller.
    ///
    pub fn new(account_id: &str, username: &str, email: &str, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            account_id: account_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            failed_login_attempts: 0,
            is_locked: false,
            reset_token: None,
            reset_token_expires_at: None,
            created_on: bson::DateTime::from_chrono(now),
        }
    }

    pub fn lockout_state(&self) -> LockoutState {
        LockoutState {
            failed_login_attempts: self.failed_login_attempts,
            is_locked: self.is_locked,
        }
    }

    pub fn apply_lockout(&mut self, state: LockoutState) {
        self.failed_login_attempts = state.failed_login_attempts;
        self.is_locked = state.is_locked;
    }

    ///
    /// The outstanding reset token and when it stops being valid.
    ///
    pub fn reset_token(&self) -> Option<(&str, DateTime<Utc>)> {
        match (&self.reset_token, self.reset_token_expires_at) {
            (Some(token), Some(expires_at)) => Some((token.as_str(), expires_at.to_chrono())),
            _ => None,
        }
    }

    pub fn set_reset_token(&mut self, token: &str, expires_at: DateTime<Utc>) {
        self.reset_token = Some(token.to_string());
        self.reset_token_expires_at = Some(bson::DateTime::from_chrono(expires_at));
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_token = None;
        self.reset_token_expires_at = None;
    }
}
