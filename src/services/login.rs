use tonic::{Request, Response, Status};
use crate::grpc::{api::{self, login_response::Outcome}, common};
use crate::model::{hasher, lockout::{self, LoginOutcome}, session::AdminSession};
use crate::utils::{context::{self, ServiceContext}, errors::RosterError};

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const ACCOUNT_LOCKED: &str = "Account locked. Reset password.";

#[derive(Clone, Debug, PartialEq)]
pub enum AuthOutcome {
    Authenticated(AdminSession),
    InvalidCredentials,
    AccountLocked,
}

///
/// Check the credentials, apply the lockout policy and open a session on success.
///
/// An unknown username is reported as InvalidCredentials after verifying against a decoy hash,
/// so neither the outcome nor the response time reveal which usernames exist. A locked account
/// is rejected without verifying the password at all.
///
pub async fn authenticate(ctx: &ServiceContext, username: &str, password: &str) -> Result<AuthOutcome, RosterError> {
    let mut account = match ctx.credentials().find_by_username(username).await? {
        Some(account) => account,
        None => {
            ctx.hasher().verify_decoy(password).await?;
            tracing::info!("Login attempt for unknown admin");
            return Ok(AuthOutcome::InvalidCredentials)
        }
    };

    let current = account.lockout_state();
    let password_matched = match current.is_locked {
        true  => false,
        false => hasher::verify_blocking(password, &account.password_hash).await?,
    };

    let (next, outcome) = lockout::evaluate(current, password_matched);

    if next != current {
        account.apply_lockout(next);
        ctx.credentials().save(&account).await?;

        if next.is_locked {
            tracing::warn!("Admin {} locked after {} failed logins", account.username, next.failed_login_attempts);
        }
    }

    Ok(match outcome {
        LoginOutcome::Authenticated => {
            let session = ctx.sessions().create(&account, ctx.now());
            tracing::info!("Admin {} logged in", account.username);
            AuthOutcome::Authenticated(session)
        },
        LoginOutcome::InvalidCredentials => AuthOutcome::InvalidCredentials,
        LoginOutcome::AccountLocked => AuthOutcome::AccountLocked,
    })
}

pub async fn login(ctx: &ServiceContext, request: Request<api::LoginRequest>)
    -> Result<Response<api::LoginResponse>, Status> {

    let request = request.into_inner();

    let response = match authenticate(ctx, request.username.trim(), &request.password).await? {
        AuthOutcome::Authenticated(session) => api::LoginResponse {
            outcome: Outcome::Authenticated as i32,
            session_id: session.session_id,
            message: String::new(),
        },
        AuthOutcome::InvalidCredentials => api::LoginResponse {
            outcome: Outcome::InvalidCredentials as i32,
            session_id: String::new(),
            message: INVALID_CREDENTIALS.to_string(),
        },
        AuthOutcome::AccountLocked => api::LoginResponse {
            outcome: Outcome::AccountLocked as i32,
            session_id: String::new(),
            message: ACCOUNT_LOCKED.to_string(),
        },
    };

    Ok(Response::new(response))
}

///
/// Invalidate the caller's session. Without one this does nothing.
///
pub async fn logout(ctx: &ServiceContext, request: Request<common::Empty>)
    -> Result<Response<common::Empty>, Status> {

    if let Some(session_id) = context::session_id(&request) {
        if ctx.sessions().invalidate(session_id) {
            tracing::info!("Admin logged out");
        }
    }

    Ok(Response::new(common::Empty::default()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tests::{context, register_alice};

    #[tokio::test]
    async fn test_correct_password_opens_a_session() -> Result<(), RosterError> {
        let (ctx, _outbox) = context();
        register_alice(&ctx).await;

        match authenticate(&ctx, "alice", "secret1").await? {
            AuthOutcome::Authenticated(session) => {
                assert_eq!(session.username, "alice");
                assert!(ctx.sessions().get(&session.session_id, ctx.now()).is_some());
            },
            other => panic!("Expected a session, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_sixth_attempt_is_locked_even_with_the_right_password() -> Result<(), RosterError> {
        let (ctx, _outbox) = context();
        register_alice(&ctx).await;

        for _ in 0..5 {
            assert_eq!(authenticate(&ctx, "alice", "wrong").await?, AuthOutcome::InvalidCredentials);
        }

        assert_eq!(authenticate(&ctx, "alice", "secret1").await?, AuthOutcome::AccountLocked);

        let account = ctx.credentials().find_by_username("alice").await?.unwrap();
        assert_eq!(account.failed_login_attempts, 5);
        assert!(account.is_locked);
        assert!(ctx.sessions().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_success_clears_earlier_failures() -> Result<(), RosterError> {
        let (ctx, _outbox) = context();
        register_alice(&ctx).await;

        for _ in 0..4 {
            authenticate(&ctx, "alice", "wrong").await?;
        }
        assert!(matches!(authenticate(&ctx, "alice", "secret1").await?, AuthOutcome::Authenticated(_)));

        let account = ctx.credentials().find_by_username("alice").await?.unwrap();
        assert_eq!(account.failed_login_attempts, 0);
        assert!(!account.is_locked);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_username_looks_like_a_wrong_password() -> Result<(), RosterError> {
        let (ctx, _outbox) = context();
        assert_eq!(authenticate(&ctx, "mallory", "secret1").await?, AuthOutcome::InvalidCredentials);
        Ok(())
    }
}
