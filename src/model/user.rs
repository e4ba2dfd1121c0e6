use serde::{Deserialize, Serialize};
use crate::grpc::api;

///
/// One of the people listed, searched and edited by admins.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserRecord {
    pub user_id: String,
    pub name: String,
    pub age: u32,
    pub gender: bool,
}

impl From<UserRecord> for api::User {
    fn from(user: UserRecord) -> Self {
        api::User {
            user_id: user.user_id,
            name:    user.name,
            age:     user.age,
            gender:  user.gender,
        }
    }
}

impl From<api::User> for UserRecord {
    fn from(user: api::User) -> Self {
        UserRecord {
            user_id: user.user_id,
            name:    user.name,
            age:     user.age,
            gender:  user.gender,
        }
    }
}
