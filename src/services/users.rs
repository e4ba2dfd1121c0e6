use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::user::UserRecord, utils::{self, context::ServiceContext, errors::ErrorCode}};

///
/// Anyone may list users. A blank name lists everyone.
///
pub async fn list_users(ctx: &ServiceContext, request: Request<api::ListUsersRequest>)
    -> Result<Response<api::ListUsersResponse>, Status> {

    let request = request.into_inner();
    let name = Some(request.name.trim()).filter(|name| !name.is_empty());

    let users = ctx.users().list_users(name).await?
        .into_iter()
        .map(api::User::from)
        .collect();

    Ok(Response::new(api::ListUsersResponse { users }))
}

pub async fn create_user(ctx: &ServiceContext, request: Request<api::CreateUserRequest>)
    -> Result<Response<api::CreateUserResponse>, Status> {

    let session = ctx.require_session(&request)?;
    let request = request.into_inner();

    let user = UserRecord {
        user_id: utils::generate_id(),
        name: required_name(&request.name)?,
        age: request.age,
        gender: request.gender,
    };

    ctx.users().insert_user(&user).await?;

    tracing::info!("Admin {} created user {}", session.username, user.user_id);
    Ok(Response::new(api::CreateUserResponse { user_id: user.user_id }))
}

pub async fn get_user(ctx: &ServiceContext, request: Request<api::GetUserRequest>)
    -> Result<Response<api::User>, Status> {

    ctx.require_session(&request)?;
    let request = request.into_inner();

    let user = ctx.users().load_user(&request.user_id).await?;
    Ok(Response::new(user.into()))
}

pub async fn update_user(ctx: &ServiceContext, request: Request<api::User>)
    -> Result<Response<common::Empty>, Status> {

    let session = ctx.require_session(&request)?;
    let mut user = UserRecord::from(request.into_inner());
    user.name = required_name(&user.name)?;

    ctx.users().update_user(&user).await?;

    tracing::info!("Admin {} updated user {}", session.username, user.user_id);
    Ok(Response::new(common::Empty::default()))
}

pub async fn delete_user(ctx: &ServiceContext, request: Request<api::DeleteUserRequest>)
    -> Result<Response<common::Empty>, Status> {

    let session = ctx.require_session(&request)?;
    let request = request.into_inner();

    ctx.users().delete_user(&request.user_id).await?;

    tracing::info!("Admin {} deleted user {}", session.username, request.user_id);
    Ok(Response::new(common::Empty::default()))
}

fn required_name(name: &str) -> Result<String, Status> {
    match name.trim() {
        "" => Err(Status::from(ErrorCode::MissingField.with_msg("A name is required"))),
        name => Ok(name.to_string()),
    }
}
