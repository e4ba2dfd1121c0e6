use std::collections::HashMap;
use parking_lot::RwLock;
use chrono::{DateTime, Duration, Utc};
use super::account::AdminAccount;
use crate::utils;

/// Session ids are bearer credentials - 256 bits of entropy.
const SESSION_ID_BYTES: usize = 32;

pub fn session_ttl() -> Duration {
    Duration::hours(1)
}

///
/// A signed-in admin.
///
#[derive(Clone, Debug, PartialEq)]
pub struct AdminSession {
    pub session_id: String,
    pub account_id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

///
/// The server-side sessions of this process. Created at start-up and cleared at shutdown.
///
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, AdminSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, account: &AdminAccount, now: DateTime<Utc>) -> AdminSession {
        let session = AdminSession {
            session_id: utils::random_hex(SESSION_ID_BYTES),
            account_id: account.account_id.clone(),
            username: account.username.clone(),
            expires_at: now + session_ttl(),
        };

        self.sessions.write().insert(session.session_id.clone(), session.clone());
        session
    }

    ///
    /// The live session with this id. An expired session is dropped on the way.
    ///
    pub fn get(&self, session_id: &str, now: DateTime<Utc>) -> Option<AdminSession> {
        let session = self.sessions.read().get(session_id).cloned()?;

        if session.expires_at > now {
            return Some(session)
        }

        self.sessions.write().remove(session_id);
        None
    }

    pub fn invalidate(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    ///
    /// Drop every expired session, returning how many went.
    ///
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    pub fn clear(&self) -> usize {
        let mut sessions = self.sessions.write();
        let count = sessions.len();
        sessions.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn alice(now: DateTime<Utc>) -> AdminAccount {
        AdminAccount::new("1", "alice", "a@x.com", "$2b$04$hash".to_string(), now)
    }

    #[test]
    fn test_session_lasts_an_hour() {
        let now = Utc::now();
        let store = SessionStore::new();
        let session = store.create(&alice(now), now);

        assert_eq!(session.username, "alice");
        assert_eq!(store.get(&session.session_id, now + Duration::minutes(59)), Some(session.clone()));
        assert_eq!(store.get(&session.session_id, now + Duration::minutes(60)), None);
        assert!(store.is_empty()); // The expired session was dropped.
    }

    #[test]
    fn test_logout_invalidates_the_session() {
        let now = Utc::now();
        let store = SessionStore::new();
        let session = store.create(&alice(now), now);

        assert!(store.invalidate(&session.session_id));
        assert!(!store.invalidate(&session.session_id));
        assert_eq!(store.get(&session.session_id, now), None);
    }

    #[test]
    fn test_purge_only_drops_expired_sessions() {
        let now = Utc::now();
        let store = SessionStore::new();
        store.create(&alice(now), now - Duration::hours(2));
        let live = store.create(&alice(now), now);

        assert_eq!(store.purge_expired(now), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&live.session_id, now).is_some());
        assert_eq!(store.clear(), 1);
    }

    #[test]
    fn test_unknown_session_is_not_found() {
        let store = SessionStore::new();
        assert_eq!(store.get("nope", Utc::now()), None);
    }
}
