mod forgot_password;
mod login;
mod register;
mod reset_password;
mod set_time;
mod users;

use std::sync::Arc;
use tracing::instrument;
use tonic::{Request, Response, Status};
use crate::utils::context::ServiceContext;
use crate::grpc::{api, common, internal};
use crate::grpc::api::{accounts_server::Accounts, users_server::Users};
use crate::grpc::internal::internal_server::Internal;

///
/// Implemention for all the gRPC service endpoints defined in the .proto files.
///
#[tonic::async_trait]
impl Accounts for Arc<ServiceContext> {
    #[instrument(skip(self, request))]
    async fn register(&self, request: Request<api::RegisterRequest>) -> Result<Response<common::Empty>, Status> {
        register::register(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn login(&self, request: Request<api::LoginRequest>) -> Result<Response<api::LoginResponse>, Status> {
        login::login(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn logout(&self, request: Request<common::Empty>) -> Result<Response<common::Empty>, Status> {
        login::logout(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn forgot_password(&self, request: Request<api::ForgotPasswordRequest>) -> Result<Response<common::Empty>, Status> {
        forgot_password::forgot_password(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn check_reset_token(&self, request: Request<api::CheckResetTokenRequest>) -> Result<Response<common::Empty>, Status> {
        reset_password::check_reset_token(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn reset_password(&self, request: Request<api::ResetPasswordRequest>) -> Result<Response<common::Empty>, Status> {
        reset_password::reset_password(self, request).await
    }
}

#[tonic::async_trait]
impl Users for Arc<ServiceContext> {
    #[instrument(skip(self, request))]
    async fn list_users(&self, request: Request<api::ListUsersRequest>) -> Result<Response<api::ListUsersResponse>, Status> {
        users::list_users(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn create_user(&self, request: Request<api::CreateUserRequest>) -> Result<Response<api::CreateUserResponse>, Status> {
        users::create_user(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn get_user(&self, request: Request<api::GetUserRequest>) -> Result<Response<api::User>, Status> {
        users::get_user(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn update_user(&self, request: Request<api::User>) -> Result<Response<common::Empty>, Status> {
        users::update_user(self, request).await
    }

    #[instrument(skip(self, request))]
    async fn delete_user(&self, request: Request<api::DeleteUserRequest>) -> Result<Response<common::Empty>, Status> {
        users::delete_user(self, request).await
    }
}

#[tonic::async_trait]
impl Internal for Arc<ServiceContext> {
    async fn ping(&self, _request: Request<common::Empty>) -> Result<Response<common::Empty>, Status> {
        Ok(Response::new(common::Empty::default()))
    }

    async fn set_time(&self, request: Request<internal::NewTime>) -> Result<Response<common::Empty>, Status> {
        set_time::set_time(self, request).await
    }

    async fn reset_time(&self, request: Request<common::Empty>) -> Result<Response<common::Empty>, Status> {
        set_time::reset_time(self, request).await
    }
}
