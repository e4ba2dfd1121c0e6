pub mod account;
pub mod memory;
pub mod mongo;
pub mod user;

use mongodb::Database;
use crate::{model::{account::AdminAccount, user::UserRecord}, utils::errors::RosterError};

pub mod prelude {
    // Collection names.
    pub const ADMINS: &str = "Admins";
    pub const USERS:  &str = "Users";

    // Field names.
    pub const ACCOUNT_ID:  &str = "account_id";
    pub const EMAIL:       &str = "email";
    pub const NAME:        &str = "name";
    pub const RESET_TOKEN: &str = "reset_token";
    pub const USER_ID:     &str = "user_id";
    pub const USERNAME:    &str = "username";
}

///
/// Persisted admin accounts. Every write replaces the whole document so concurrent requests
/// against one account are last-writer-wins and never observe half an update.
///
#[tonic::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, RosterError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, RosterError>;

    /// Matches on the token alone - expiry is for the caller to judge.
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<AdminAccount>, RosterError>;

    /// Create a new account, failing with AdminAlreadyExists if the username or email is taken.
    async fn insert(&self, account: &AdminAccount) -> Result<(), RosterError>;

    /// Upsert the full account document.
    async fn save(&self, account: &AdminAccount) -> Result<(), RosterError>;

    /// Replace the account only while it still holds this reset token, otherwise InvalidResetToken.
    /// Of two resets racing on one token, only the first is written.
    async fn save_if_token(&self, account: &AdminAccount, token: &str) -> Result<(), RosterError>;

    async fn ping(&self) -> Result<(), RosterError>;
}

///
/// Persisted user records.
///
#[tonic::async_trait]
pub trait UserStore: Send + Sync {
    /// All users, or those whose name is exactly the one given.
    async fn list_users(&self, name: Option<&str>) -> Result<Vec<UserRecord>, RosterError>;

    async fn load_user(&self, user_id: &str) -> Result<UserRecord, RosterError>;

    async fn insert_user(&self, user: &UserRecord) -> Result<(), RosterError>;

    async fn update_user(&self, user: &UserRecord) -> Result<(), RosterError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), RosterError>;
}

///
/// Both stores backed by MongoDB.
///
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}
