use bson::doc;
use tracing::instrument;
use mongodb::Collection;
use super::{CredentialStore, MongoStore, mongo, prelude::*};
use crate::{model::{account::AdminAccount, reset_token::INVALID_OR_EXPIRED}, utils::errors::{ErrorCode, RosterError}};

impl MongoStore {
    fn admins(&self) -> Collection<AdminAccount> {
        self.db().collection::<AdminAccount>(ADMINS)
    }
}

#[tonic::async_trait]
impl CredentialStore for MongoStore {
    #[instrument(name="db:find_by_username", skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminAccount>, RosterError> {
        Ok(self.admins().find_one(doc!{ USERNAME: username }, None).await?)
    }

    #[instrument(name="db:find_by_email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminAccount>, RosterError> {
        Ok(self.admins().find_one(doc!{ EMAIL: email }, None).await?)
    }

    #[instrument(name="db:find_by_reset_token", skip(self, token))]
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<AdminAccount>, RosterError> {
        Ok(self.admins().find_one(doc!{ RESET_TOKEN: token }, None).await?)
    }

    #[instrument(name="db:insert_admin", skip(self, account), fields(username = %account.username))]
    async fn insert(&self, account: &AdminAccount) -> Result<(), RosterError> {
        match self.admins().insert_one(account, None).await {
            Ok(_) => Ok(()),
            Err(err) if mongo::is_duplicate_err(&err) => Err(ErrorCode::AdminAlreadyExists
                .with_msg("Admin already exists")),
            Err(err) => Err(RosterError::from(err)),
        }
    }

    #[instrument(name="db:save_admin", skip(self, account), fields(username = %account.username))]
    async fn save(&self, account: &AdminAccount) -> Result<(), RosterError> {
        let filter = doc!{ ACCOUNT_ID: &account.account_id };

        self.admins().replace_one(filter, account, mongo::upsert())
            .await
            .map_err(RosterError::from)?;

        Ok(())
    }

    #[instrument(name="db:save_admin_if_token", skip(self, account, token), fields(username = %account.username))]
    async fn save_if_token(&self, account: &AdminAccount, token: &str) -> Result<(), RosterError> {
        let filter = doc!{ ACCOUNT_ID: &account.account_id, RESET_TOKEN: token };
        let result = self.admins().replace_one(filter, account, None).await?;

        match result.matched_count {
            0 => Err(ErrorCode::InvalidResetToken.with_msg(INVALID_OR_EXPIRED)),
            _ => Ok(()),
        }
    }

    async fn ping(&self) -> Result<(), RosterError> {
        mongo::ping(self.db()).await.map(|_| ())
    }
}
