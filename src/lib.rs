mod db;
mod model;
mod services;
pub mod notify;
pub mod utils;

pub use db::{CredentialStore, UserStore, memory::MemoryStore};

use db::mongo;
use db::MongoStore;
use utils::kafka;
use utils::health;
use tokio::signal;
use dotenv::dotenv;
use std::sync::Arc;
use std::future::Future;
use std::time::Duration;
use notify::KafkaNotifier;
use tokio::net::TcpListener;
use utils::errors::RosterError;
use utils::context::ServiceContext;
use crate::utils::errors::ErrorCode;
use utils::config::{Configuration, self};
use tokio::sync::oneshot::{self};
use tokio_stream::wrappers::TcpListenerStream;
use grpc::api::{accounts_server::AccountsServer, users_server::UsersServer};
use grpc::internal::internal_server::InternalServer;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use opentelemetry::{global, sdk::{propagation::TraceContextPropagator,trace,trace::Sampler}};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

///
/// These are the generated gRPC/protobuf modules which give us access to the message structures, services,
/// servers and clients to talk to our APIs. The services are implemented in services/mod.rs
///
pub mod grpc {
    pub mod common {
        tonic::include_proto!("grpc.common");
    }

    pub mod api {
        tonic::include_proto!("grpc.roster");
    }

    pub mod internal {
        tonic::include_proto!("grpc.internal");
    }
}

pub const APP_NAME: &str = "Roster";

/// How often expired sessions are swept from memory.
const SESSION_SWEEP: u64 = 60;

///
/// Entry point to start the app.
///
pub async fn lib_main() -> Result<(), RosterError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    config::default_env("RUST_LOG", "INFO");

    // SIGINT/ctrl+c handling for graceful shutdown.
    let (signal_tx, signal_rx) = oneshot::channel();
    let _signal = tokio::spawn(wait_for_signal(signal_tx));

    // Load the service configuration into struct.
    let config = Configuration::from_env()?;

    // Initialise open-telemetry distributed tracing.
    let tracing = init_tracing(&config)?;

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    // Create a MongoDB client and connect to it before proceeding.
    let db = mongo::get_mongo_db(APP_NAME, &config).await?;

    // Ensure the schema is in sync with the code.
    mongo::update_mongo(&db).await?;

    // Create the topics we publish to.
    kafka::create_topics(&config).await;

    // The service context allows any gRPC service access to shared stuff (stores, notifier, sessions, etc.).
    let store = Arc::new(MongoStore::new(db));
    let ctx = Arc::new(ServiceContext::new(
        config.clone(),
        store.clone(),
        store,
        Arc::new(KafkaNotifier::new(&config)?))?);

    let listener = TcpListener::bind(&config.address).await?;

    serve(ctx, listener, async {
        signal_rx.await.ok();
        tracing::info!("Graceful shutdown");
    }).await?;

    if tracing {
        opentelemetry::global::shutdown_tracer_provider(); // sending remaining spans
    }

    Ok(())
}

///
/// Serve the gRPC APIs on the listener until the shutdown future completes.
///
/// Integration tests call this directly with in-memory stores and an ephemeral port.
///
pub async fn serve<F>(ctx: Arc<ServiceContext>, listener: TcpListener, shutdown: F) -> Result<(), RosterError>
where
    F: Future<Output = ()>
{
    let mut builder = Server::builder();

    let tls = match init_tls(ctx.config()).await? {
        Some(identity) => {
            builder = builder.tls_config(ServerTlsConfig::new().identity(identity))?;
            "using tls"
        },
        None => "without tls",
    };

    let (health_reporter, health_service, monitor) = health::start(ctx.clone()).await;
    let sweeper = tokio::spawn(sweep_sessions(ctx.clone()));

    tracing::info!("{} listening on {} {}", APP_NAME, listener.local_addr()?, tls);

    let result = builder
        .add_service(AccountsServer::new(ctx.clone()))
        .add_service(UsersServer::new(ctx.clone()))
        .add_service(InternalServer::new(ctx.clone()))
        .add_service(health_service)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await;

    health::shutdown(health_reporter).await;
    monitor.abort();
    sweeper.abort();

    let sessions = ctx.sessions().clear();
    tracing::info!("Cleared {} admin sessions", sessions);

    Ok(result?)
}

///
/// Sends a oneshot signal when a SIGINT is received (Ctrl+C)
///
async fn wait_for_signal(tx: oneshot::Sender<()>) {
    let _ = signal::ctrl_c().await;
    tracing::info!("SIGINT received: shutting down");
    let _ = tx.send(());
}

///
/// Periodically drop expired sessions so abandoned logins don't accumulate.
///
async fn sweep_sessions(ctx: Arc<ServiceContext>) {
    loop {
        tokio::time::sleep(Duration::from_secs(SESSION_SWEEP)).await;

        let purged = ctx.sessions().purge_expired(ctx.now());
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }
    }
}

///
/// Bind to the server-side key and certificate, if both are configured.
///
async fn init_tls(config: &Configuration) -> Result<Option<Identity>, RosterError> {
    let (cert, key) = match (&config.tls_cert, &config.tls_key) {
        (Some(cert), Some(key)) => (cert, key),
        _ => return Ok(None),
    };

    tracing::info!("Initialising TLS config");

    let cert = tokio::fs::read(cert)
        .await
        .map_err(|e| ErrorCode::IOError.with_msg(&format!("Failed to open pem: {}", e)))?;

    let key = tokio::fs::read(key)
        .await
        .map_err(|e| ErrorCode::IOError.with_msg(&format!("Failed to open key: {}", e)))?;

    Ok(Some(Identity::from_pem(cert, key)))
}


///
/// Initialise tracing and plug-in the Jaeger feature if enabled.
///
fn init_tracing(config: &Configuration) -> Result<bool, RosterError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    match config.distributed_tracing {
        true => { // Install the Jaeger pipeline.
            let tracer = opentelemetry_jaeger::new_pipeline()
                .with_service_name(APP_NAME)
                .with_trace_config(trace::config().with_sampler(Sampler::AlwaysOn))
                .with_agent_endpoint(config.jaeger_endpoint.clone().unwrap_or_default())
                .install_batch(opentelemetry::runtime::Tokio)
                .map_err(|err| ErrorCode::InvalidConfig.with_msg(&format!("Unable to build Jaeger pipeline: {}", err)))?;

            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init() {
                    tracing::info!("Tracing already initialised: {}", err); // Allowed error here - a subscriber may already be installed.
            }

            Ok(true)
        },
        false => {
            if let Err(err) = Registry::default()
                .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
                .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
                .try_init() {
                    tracing::info!("Tracing already initialised: {}", err); // Allowed error here - a subscriber may already be installed.
            }

            Ok(false)
        }
    }
}

const BANNER: &str = r#"
__________               __
\______   \ ____  ______/  |_  ___________
 |       _//  _ \/  ___/\   __\/ __ \_  __ \
 |    |   (  <_> )___ \  |  | \  ___/|  | \/
 |____|_  /\____/____  > |__|  \___  >__|
        \/           \/            \/
"#;
