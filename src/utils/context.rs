use std::sync::Arc;
use parking_lot::RwLock;
use chrono::{DateTime, Utc};
use tonic::{Request, Status};
use crate::{db::{CredentialStore, UserStore}, model::{hasher::Hasher, session::{AdminSession, SessionStore}}, notify::Notifier};
use super::{config::Configuration, errors::{ErrorCode, RosterError}, time_provider::TimeProvider};

/// The request metadata carrying the caller's session id.
pub const SESSION_HEADER: &str = "x-session-id";

///
/// The context is available to all gRPC service endpoints and gives them access to the stores,
/// notifier, sessions and config.
///
pub struct ServiceContext {
    config: Configuration,
    credentials: Arc<dyn CredentialStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    hasher: Hasher,
    sessions: SessionStore,
    time_provider: RwLock<TimeProvider>,
}

impl ServiceContext {
    pub fn new(
        config: Configuration,
        credentials: Arc<dyn CredentialStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>) -> Result<Self, RosterError> {

        let hasher = Hasher::from_config(&config)?;
        tracing::info!("Hashing new passwords with {} (cost {})", hasher.algorithm(), config.hash_cost);

        Ok(ServiceContext {
            hasher,
            config,
            credentials,
            users,
            notifier,
            sessions: SessionStore::new(),
            time_provider: RwLock::new(TimeProvider::default()),
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time_provider.read().now()
    }

    ///
    /// Set or clear the fixed time.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.time_provider.write().fix(now);
    }

    ///
    /// The live session named in the request metadata, or Unauthenticated.
    ///
    pub fn require_session<T>(&self, request: &Request<T>) -> Result<AdminSession, Status> {
        let session_id = session_id(request)
            .ok_or_else(|| ErrorCode::Unauthenticated.with_msg("Please log in"))?;

        match self.sessions.get(session_id, self.now()) {
            Some(session) => Ok(session),
            None => Err(Status::from(ErrorCode::Unauthenticated.with_msg("Please log in"))),
        }
    }
}

///
/// The session id from the request metadata, if there's a non-blank one.
///
pub fn session_id<T>(request: &Request<T>) -> Option<&str> {
    request.metadata()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
