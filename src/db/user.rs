use bson::doc;
use mongodb::Collection;
use futures::TryStreamExt;
use tracing::instrument;
use super::{MongoStore, UserStore, prelude::*};
use crate::{model::user::UserRecord, utils::errors::{ErrorCode, RosterError}};

impl MongoStore {
    fn users(&self) -> Collection<UserRecord> {
        self.db().collection::<UserRecord>(USERS)
    }
}

#[tonic::async_trait]
impl UserStore for MongoStore {
    #[instrument(name="db:list_users", skip(self))]
    async fn list_users(&self, name: Option<&str>) -> Result<Vec<UserRecord>, RosterError> {
        let filter = name.map(|name| doc!{ NAME: name });
        let cursor = self.users().find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(name="db:load_user", skip(self))]
    async fn load_user(&self, user_id: &str) -> Result<UserRecord, RosterError> {
        match self.users().find_one(doc!{ USER_ID: user_id }, None).await? {
            Some(user) => Ok(user),
            None => Err(ErrorCode::UserNotFound.with_msg("The user requested does not exist")),
        }
    }

    #[instrument(name="db:insert_user", skip(self, user), fields(user_id = %user.user_id))]
    async fn insert_user(&self, user: &UserRecord) -> Result<(), RosterError> {
        self.users().insert_one(user, None).await?;
        Ok(())
    }

    #[instrument(name="db:update_user", skip(self, user), fields(user_id = %user.user_id))]
    async fn update_user(&self, user: &UserRecord) -> Result<(), RosterError> {
        let result = self.users().replace_one(doc!{ USER_ID: &user.user_id }, user, None).await?;

        match result.matched_count {
            0 => Err(ErrorCode::UserNotFound.with_msg("The user requested does not exist")),
            _ => Ok(()),
        }
    }

    #[instrument(name="db:delete_user", skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<(), RosterError> {
        let result = self.users().delete_one(doc!{ USER_ID: user_id }, None).await?;

        match result.deleted_count {
            0 => Err(ErrorCode::UserNotFound.with_msg("The user requested does not exist")),
            _ => Ok(()),
        }
    }
}
