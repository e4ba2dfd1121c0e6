use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::reset_token, utils::{context::ServiceContext, errors::{ErrorCode, RosterError}}};

pub const RESET_SUBJECT: &str = "Password Reset Request";

///
/// Issue a reset token for the account with this email and send the admin a link to use it.
///
pub async fn forgot_password(ctx: &ServiceContext, request: Request<api::ForgotPasswordRequest>)
    -> Result<Response<common::Empty>, Status> {

    let request = request.into_inner();
    start_reset(ctx, request.email.trim()).await?;
    Ok(Response::new(common::Empty::default()))
}

pub async fn start_reset(ctx: &ServiceContext, email: &str) -> Result<(), RosterError> {
    let mut account = match ctx.credentials().find_by_email(email).await? {
        Some(account) => account,
        None => return Err(ErrorCode::EmailNotFound.with_msg("No admin has that email")),
    };

    let token = reset_token::issue(ctx.credentials(), &mut account, ctx.now()).await?;
    let link = reset_token::reset_link(&ctx.config().reset_url_base, &token);
    let body = format!("Click the following link to reset your password: {}", link);

    // The token stays stored - asking again issues a fresh one.
    if let Err(err) = ctx.notifier().send(&account.email, RESET_SUBJECT, &body).await {
        tracing::error!("Unable to send reset email to admin {}: {}", account.username, err);
        return Err(ErrorCode::NotificationFailed.with_msg("Error sending email"))
    }

    Ok(())
}
