use chrono::{DateTime, Duration, Utc};
use super::{account::AdminAccount, lockout::LockoutState};
use crate::{db::CredentialStore, utils::{self, errors::{ErrorCode, RosterError}}};

/// 160 bits of entropy.
pub const RESET_TOKEN_BYTES: usize = 20;

/// The one message for every token problem - callers can't tell unknown from expired.
pub const INVALID_OR_EXPIRED: &str = "Invalid or expired token";

pub fn reset_token_ttl() -> Duration {
    Duration::hours(1)
}

///
/// Generate a fresh reset token and store it on the account, replacing any earlier one.
///
/// The token and expiry go into the store in one save.
///
pub async fn issue(store: &dyn CredentialStore, account: &mut AdminAccount, now: DateTime<Utc>) -> Result<String, RosterError> {
    let token = utils::random_hex(RESET_TOKEN_BYTES);
    account.set_reset_token(&token, now + reset_token_ttl());
    store.save(account).await?;

    tracing::info!("Reset token issued for admin {}", account.username);
    Ok(token)
}

///
/// Find the account holding this token, provided the token is still in date.
///
pub async fn validate(store: &dyn CredentialStore, token: &str, now: DateTime<Utc>) -> Result<AdminAccount, RosterError> {
    if token.is_empty() {
        return Err(ErrorCode::InvalidResetToken.with_msg(INVALID_OR_EXPIRED))
    }

    match store.find_by_reset_token(token).await? {
        Some(account) if is_live(&account, token, now) => Ok(account),
        _ => Err(ErrorCode::InvalidResetToken.with_msg(INVALID_OR_EXPIRED)),
    }
}

///
/// Finish the reset: replace the password hash, clear the token and unlock the account in one save.
///
/// The save only lands if the stored token is still the one validated, so a token spent by a
/// concurrent reset can't be spent again.
///
pub async fn consume(store: &dyn CredentialStore, mut account: AdminAccount, new_password_hash: String) -> Result<AdminAccount, RosterError> {
    let token = match account.reset_token() {
        Some((token, _expires_at)) => token.to_string(),
        None => return Err(ErrorCode::InvalidResetToken.with_msg(INVALID_OR_EXPIRED)),
    };

    account.password_hash = new_password_hash;
    account.clear_reset_token();
    account.apply_lockout(LockoutState::cleared());
    store.save_if_token(&account, &token).await?;

    tracing::info!("Password reset completed for admin {}", account.username);
    Ok(account)
}

///
/// The externally reachable link emailed to the admin.
///
pub fn reset_link(reset_url_base: &str, token: &str) -> String {
    format!("{}/{}", reset_url_base.trim_end_matches('/'), token)
}

fn is_live(account: &AdminAccount, token: &str, now: DateTime<Utc>) -> bool {
    match account.reset_token() {
        Some((stored, expires_at)) => stored == token && expires_at > now,
        None => false,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    async fn registered(store: &MemoryStore, now: DateTime<Utc>) -> AdminAccount {
        let account = AdminAccount::new("1", "alice", "a@x.com", "$2b$04$old".to_string(), now);
        store.insert(&account).await.unwrap();
        account
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_issued_token_is_valid_until_it_expires() -> Result<(), RosterError> {
        let store = MemoryStore::new();
        let now = at("2021-08-23T09:30:00Z");
        let mut account = registered(&store, now).await;

        let token = issue(&store, &mut account, now).await?;
        assert_eq!(token.len(), RESET_TOKEN_BYTES * 2);

        let found = validate(&store, &token, at("2021-08-23T10:29:59Z")).await?;
        assert_eq!(found.username, "alice");

        // Exactly at the expiry is already too late.
        let expired = validate(&store, &token, at("2021-08-23T10:30:00Z")).await.unwrap_err();
        let unknown = validate(&store, "0123456789abcdef", now).await.unwrap_err();
        assert_eq!(expired, unknown);
        Ok(())
    }

    #[tokio::test]
    async fn test_token_one_second_after_expiry_looks_unknown() -> Result<(), RosterError> {
        let store = MemoryStore::new();
        let now = at("2021-08-23T09:30:00Z");
        let mut account = registered(&store, now).await;
        let token = issue(&store, &mut account, now).await?;

        let expired = validate(&store, &token, at("2021-08-23T10:30:01Z")).await.unwrap_err();
        let random = validate(&store, &utils::random_hex(RESET_TOKEN_BYTES), now).await.unwrap_err();

        assert_eq!(expired.error_code(), ErrorCode::InvalidResetToken);
        assert_eq!(expired, random);
        Ok(())
    }

    #[tokio::test]
    async fn test_reissuing_replaces_the_earlier_token() -> Result<(), RosterError> {
        let store = MemoryStore::new();
        let now = at("2021-08-23T09:30:00Z");
        let mut account = registered(&store, now).await;

        let first = issue(&store, &mut account, now).await?;
        let second = issue(&store, &mut account, now).await?;

        assert_ne!(first, second);
        assert!(validate(&store, &first, now).await.is_err());
        assert!(validate(&store, &second, now).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_consumed_token_cannot_be_used_twice() -> Result<(), RosterError> {
        let store = MemoryStore::new();
        let now = at("2021-08-23T09:30:00Z");
        let mut account = registered(&store, now).await;
        account.apply_lockout(LockoutState { failed_login_attempts: 5, is_locked: true });
        store.save(&account).await?;

        let token = issue(&store, &mut account, now).await?;
        let account = validate(&store, &token, now).await?;
        let reset = consume(&store, account, "$2b$04$new".to_string()).await?;

        assert_eq!(reset.password_hash, "$2b$04$new");
        assert_eq!(reset.failed_login_attempts, 0);
        assert_eq!(reset.is_locked, false);
        assert!(reset.reset_token().is_none());
        assert_eq!(store.find_by_username("alice").await?, Some(reset));

        let err = validate(&store, &token, now).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidResetToken);
        Ok(())
    }

    #[tokio::test]
    async fn test_racing_resets_only_spend_the_token_once() -> Result<(), RosterError> {
        let store = MemoryStore::new();
        let now = at("2021-08-23T09:30:00Z");
        let mut account = registered(&store, now).await;
        let token = issue(&store, &mut account, now).await?;

        // Both requests validate before either has saved.
        let first = validate(&store, &token, now).await?;
        let second = validate(&store, &token, now).await?;

        consume(&store, first, "$2b$04$first".to_string()).await?;
        let err = consume(&store, second, "$2b$04$second".to_string()).await.unwrap_err();

        assert_eq!(err.error_code(), ErrorCode::InvalidResetToken);
        assert_eq!(store.find_by_username("alice").await?.unwrap().password_hash, "$2b$04$first");
        Ok(())
    }

    #[tokio::test]
    async fn test_a_replaced_token_cannot_finish_a_reset() -> Result<(), RosterError> {
        let store = MemoryStore::new();
        let now = at("2021-08-23T09:30:00Z");
        let mut account = registered(&store, now).await;

        let old = issue(&store, &mut account, now).await?;
        let validated = validate(&store, &old, now).await?;
        issue(&store, &mut account, now).await?; // Admin asked again meanwhile.

        let err = consume(&store, validated, "$2b$04$new".to_string()).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidResetToken);
        assert_eq!(store.find_by_username("alice").await?.unwrap().password_hash, "$2b$04$old");
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_token_is_invalid() {
        let store = MemoryStore::new();
        let err = validate(&store, "", Utc::now()).await.unwrap_err();
        assert_eq!(err.message(), INVALID_OR_EXPIRED);
    }

    #[test]
    fn test_reset_link_embeds_the_token_as_a_path_segment() {
        assert_eq!(reset_link("https://example.com/reset-password/", "abc"), "https://example.com/reset-password/abc");
        assert_eq!(reset_link("https://example.com/reset-password", "abc"), "https://example.com/reset-password/abc");
    }
}
