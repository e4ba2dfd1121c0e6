use parking_lot::RwLock;
use super::{CredentialStore, UserStore};
use crate::{model::{account::AdminAccount, reset_token::INVALID_OR_EXPIRED, user::UserRecord}, utils::errors::{ErrorCode, RosterError}};

///
/// Both stores held in process memory. Nothing survives a restart - this backs the tests and
/// local runs without a MongoDB to hand.
///
/// The unique constraints MongoDB enforces with indexes (account_id, username, email, user_id)
/// are enforced here by hand.
///
#[derive(Debug, Default)]
pub struct MemoryStore {
    admins: RwLock<Vec<AdminAccount>>,
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_admin<P>(&self, predicate: P) -> Option<AdminAccount>
    where
        P: Fn(&AdminAccount) -> bool
    {
        self.admins.read().iter().find(|account| predicate(account)).cloned()
    }
}

#[tonic::async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, RosterError> {
        Ok(self.find_admin(|account| account.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, RosterError> {
        Ok(self.find_admin(|account| account.email == email))
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<AdminAccount>, RosterError> {
        Ok(self.find_admin(|account| matches!(account.reset_token(), Some((stored, _)) if stored == token)))
    }

    async fn insert(&self, account: &AdminAccount) -> Result<(), RosterError> {
        let mut admins = self.admins.write();

        let clash = admins.iter().any(|existing| existing.account_id == account.account_id
            || existing.username == account.username
            || existing.email == account.email);

        if clash {
            return Err(ErrorCode::AdminAlreadyExists.with_msg("Admin already exists"))
        }

        admins.push(account.clone());
        Ok(())
    }

    async fn save(&self, account: &AdminAccount) -> Result<(), RosterError> {
        let mut admins = self.admins.write();

        match admins.iter_mut().find(|existing| existing.account_id == account.account_id) {
            Some(existing) => *existing = account.clone(),
            None => admins.push(account.clone()),
        };

        Ok(())
    }

    async fn save_if_token(&self, account: &AdminAccount, token: &str) -> Result<(), RosterError> {
        let mut admins = self.admins.write();

        let holder = admins.iter_mut().find(|existing| existing.account_id == account.account_id
            && matches!(existing.reset_token(), Some((stored, _)) if stored == token));

        match holder {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            },
            None => Err(ErrorCode::InvalidResetToken.with_msg(INVALID_OR_EXPIRED)),
        }
    }

    async fn ping(&self) -> Result<(), RosterError> {
        Ok(())
    }
}

#[tonic::async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self, name: Option<&str>) -> Result<Vec<UserRecord>, RosterError> {
        Ok(self.users.read()
            .iter()
            .filter(|user| name.map_or(true, |name| user.name == name))
            .cloned()
            .collect())
    }

    async fn load_user(&self, user_id: &str) -> Result<UserRecord, RosterError> {
        self.users.read()
            .iter()
            .find(|user| user.user_id == user_id)
            .cloned()
            .ok_or_else(|| ErrorCode::UserNotFound.with_msg("The user requested does not exist"))
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<(), RosterError> {
        self.users.write().push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &UserRecord) -> Result<(), RosterError> {
        match self.users.write().iter_mut().find(|existing| existing.user_id == user.user_id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            },
            None => Err(ErrorCode::UserNotFound.with_msg("The user requested does not exist")),
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), RosterError> {
        let mut users = self.users.write();
        let before = users.len();
        users.retain(|user| user.user_id != user_id);

        match users.len() == before {
            true  => Err(ErrorCode::UserNotFound.with_msg("The user requested does not exist")),
            false => Ok(()),
        }
    }
}
