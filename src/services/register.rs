use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::account::AdminAccount, utils::{self, context::ServiceContext, errors::ErrorCode}};

///
/// Create a new admin account. The password is hashed before the account exists.
///
pub async fn register(ctx: &ServiceContext, request: Request<api::RegisterRequest>)
    -> Result<Response<common::Empty>, Status> {

    let request = request.into_inner();
    let username = request.username.trim();
    let email = request.email.trim();

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(Status::from(ErrorCode::MissingField
            .with_msg("A username, password and email are required")))
    }

    // Check before hashing - the unique indexes still have the final say on a race.
    if ctx.credentials().find_by_username(username).await?.is_some()
        || ctx.credentials().find_by_email(email).await?.is_some() {
        return Err(Status::from(ErrorCode::AdminAlreadyExists.with_msg("Admin already exists")))
    }

    let password_hash = ctx.hasher().hash_blocking(&request.password).await?;
    let account = AdminAccount::new(&utils::generate_id(), username, email, password_hash, ctx.now());
    ctx.credentials().insert(&account).await?;

    tracing::info!("Admin {} registered", account.username);
    Ok(Response::new(common::Empty::default()))
}
