///
/// The number of consecutive failed logins after which an account is locked. A locked account
/// stays locked until its password is reset.
///
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoginOutcome {
    Authenticated,
    InvalidCredentials,
    AccountLocked,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LockoutState {
    pub failed_login_attempts: u32,
    pub is_locked: bool,
}

impl LockoutState {
    ///
    /// The state after a successful password reset.
    ///
    pub fn cleared() -> Self {
        Self::default()
    }
}

///
/// Decide the outcome of a login attempt and the account's next lockout state.
///
/// The lock is checked before anything else, so a locked account gives the same answer whether
/// or not the password matched (callers needn't verify the password at all in that case).
///
pub fn evaluate(state: LockoutState, password_matched: bool) -> (LockoutState, LoginOutcome) {
    if state.is_locked {
        return (state, LoginOutcome::AccountLocked)
    }

    if !password_matched {
        let failed_login_attempts = state.failed_login_attempts.saturating_add(1);
        let next = LockoutState {
            failed_login_attempts,
            is_locked: failed_login_attempts >= MAX_FAILED_ATTEMPTS,
        };
        return (next, LoginOutcome::InvalidCredentials)
    }

    (LockoutState::cleared(), LoginOutcome::Authenticated)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_failures_lock_the_account() {
        let mut state = LockoutState::default();

        for attempt in 1..=MAX_FAILED_ATTEMPTS {
            let (next, outcome) = evaluate(state, false);
            assert_eq!(outcome, LoginOutcome::InvalidCredentials);
            assert_eq!(next.failed_login_attempts, attempt);
            assert_eq!(next.is_locked, attempt == MAX_FAILED_ATTEMPTS);
            state = next;
        }

        // The correct password no longer helps.
        let (next, outcome) = evaluate(state, true);
        assert_eq!(outcome, LoginOutcome::AccountLocked);
        assert_eq!(next, state);
    }

    #[test]
    fn test_success_clears_previous_failures() {
        let state = LockoutState { failed_login_attempts: 4, is_locked: false };
        let (next, outcome) = evaluate(state, true);

        assert_eq!(outcome, LoginOutcome::Authenticated);
        assert_eq!(next, LockoutState { failed_login_attempts: 0, is_locked: false });
    }

    #[test]
    fn test_locked_account_ignores_wrong_password_too() {
        let state = LockoutState { failed_login_attempts: 5, is_locked: true };
        let (next, outcome) = evaluate(state, false);

        assert_eq!(outcome, LoginOutcome::AccountLocked);
        assert_eq!(next.failed_login_attempts, 5); // Not bumped while locked.
    }
}
