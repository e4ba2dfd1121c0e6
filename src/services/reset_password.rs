use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::reset_token, utils::{context::ServiceContext, errors::{ErrorCode, RosterError}}};

///
/// Confirm a reset link is still usable before the admin is asked for a new password.
///
pub async fn check_reset_token(ctx: &ServiceContext, request: Request<api::CheckResetTokenRequest>)
    -> Result<Response<common::Empty>, Status> {

    let request = request.into_inner();
    reset_token::validate(ctx.credentials(), request.token.trim(), ctx.now()).await?;
    Ok(Response::new(common::Empty::default()))
}

pub async fn reset_password(ctx: &ServiceContext, request: Request<api::ResetPasswordRequest>)
    -> Result<Response<common::Empty>, Status> {

    let request = request.into_inner();
    complete_reset(ctx, request.token.trim(), &request.password).await?;
    Ok(Response::new(common::Empty::default()))
}

///
/// Swap in the new password, unlock the account and spend the token.
///
pub async fn complete_reset(ctx: &ServiceContext, token: &str, password: &str) -> Result<(), RosterError> {
    let account = reset_token::validate(ctx.credentials(), token, ctx.now()).await?;

    if password.is_empty() {
        return Err(ErrorCode::MissingField.with_msg("A new password is required"))
    }

    let password_hash = ctx.hasher().hash_blocking(password).await?;
    reset_token::consume(ctx.credentials(), account, password_hash).await?;
    Ok(())
}
