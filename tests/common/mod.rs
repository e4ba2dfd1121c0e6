#![allow(dead_code)]

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::{Request, transport::Channel};
use tokio_retry::{Retry, strategy::FixedInterval};
use roster::{MemoryStore, notify::Outbox, utils::{config::Configuration, context::{SESSION_HEADER, ServiceContext}}};
use roster::grpc::{api::{self, accounts_client::AccountsClient, users_client::UsersClient}, common, internal::{self, internal_client::InternalClient}};

///
/// A running server on an ephemeral port, backed by in-memory stores, plus clients to talk to it.
///
/// Each test starts its own so tests can run in parallel without sharing any state.
///
pub struct TestServer {
    pub accounts: AccountsClient<Channel>,
    pub users: UsersClient<Channel>,
    pub internal: InternalClient<Channel>,
    pub outbox: Arc<Outbox>,
    pub ctx: Arc<ServiceContext>,
    _shutdown: oneshot::Sender<()>,
}

pub async fn start_roster() -> TestServer {
    let mut config = Configuration::default();
    config.hash_cost = 4; // Keep the tests quick.
    config.reset_url_base = "https://roster.test/reset-password".to_string();

    let store = Arc::new(MemoryStore::new());
    let outbox = Arc::new(Outbox::new());
    let ctx = Arc::new(ServiceContext::new(config, store.clone(), store, outbox.clone())
        .expect("Unable to create the service context"));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Unable to bind a test port");
    let addr = format!("http://{}", listener.local_addr().expect("No local address"));

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(roster::serve(ctx.clone(), listener, async {
        shutdown_rx.await.ok();
    }));

    // Try to connect for up-to 10 seconds.
    let endpoint = addr.clone();
    let accounts = Retry::spawn(FixedInterval::from_millis(100).take(100), move || AccountsClient::connect(endpoint.clone()))
        .await
        .expect("Unable to connect test client to server under test");

    let users = UsersClient::connect(addr.clone()).await.expect("Unable to connect users client");
    let internal = InternalClient::connect(addr).await.expect("Unable to connect internal client");

    TestServer { accounts, users, internal, outbox, ctx, _shutdown: shutdown_tx }
}

pub fn with_session<T>(message: T, session_id: &str) -> Request<T> {
    let mut request = Request::new(message);
    request.metadata_mut().insert(SESSION_HEADER, session_id.parse().expect("Bad session id"));
    request
}

///
/// Pull the numeric ErrorCode out of the status details.
///
pub fn error_code(status: &tonic::Status) -> u32 {
    String::from_utf8_lossy(status.details()).parse().expect("No error code in the status details")
}

pub mod helper {
    use super::*;

    pub async fn register(username: &str, password: &str, email: &str, server: &mut TestServer) -> Result<(), tonic::Status> {
        let request = api::RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        server.accounts.register(request).await.map(|_| ())
    }

    pub async fn login(username: &str, password: &str, server: &mut TestServer) -> api::LoginResponse {
        let request = api::LoginRequest { username: username.to_string(), password: password.to_string() };
        server.accounts.login(request).await.expect("Login should not fail at the transport").into_inner()
    }

    pub async fn forgot_password(email: &str, server: &mut TestServer) -> Result<(), tonic::Status> {
        let request = api::ForgotPasswordRequest { email: email.to_string() };
        server.accounts.forgot_password(request).await.map(|_| ())
    }

    pub async fn reset_password(token: &str, password: &str, server: &mut TestServer) -> Result<(), tonic::Status> {
        let request = api::ResetPasswordRequest { token: token.to_string(), password: password.to_string() };
        server.accounts.reset_password(request).await.map(|_| ())
    }

    pub async fn check_reset_token(token: &str, server: &mut TestServer) -> Result<(), tonic::Status> {
        let request = api::CheckResetTokenRequest { token: token.to_string() };
        server.accounts.check_reset_token(request).await.map(|_| ())
    }

    ///
    /// The token from the last reset link emailed to this address.
    ///
    pub fn emailed_token(email: &str, server: &TestServer) -> String {
        let email = server.outbox.last_to(email).expect("No email was sent");
        email.body.rsplit('/').next().expect("No token in the link").to_string()
    }

    pub async fn set_time(rfc3339: &str, server: &mut TestServer) {
        let request = internal::NewTime { new_time: rfc3339.to_string() };
        server.internal.set_time(request).await.expect("Unable to set the time");
    }

    pub async fn reset_time(server: &mut TestServer) {
        server.internal.reset_time(common::Empty::default()).await.expect("Unable to reset the time");
    }

    pub async fn logout(session_id: &str, server: &mut TestServer) {
        server.accounts.logout(with_session(common::Empty::default(), session_id)).await.expect("Logout failed");
    }
}
