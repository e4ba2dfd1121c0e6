use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tonic_health::{ServingStatus, server::HealthReporter, proto::health_server::{Health, HealthServer}};
use crate::grpc::api::{accounts_server::AccountsServer, users_server::UsersServer};
use super::context::ServiceContext;

const LIVELINESS: &str = "LIVELINESS";
const READINESS:  &str = "READINESS";

const PULSE: u64 = 4000;
const TIMEOUT: u64 = 6000;

///
/// Create a readiness monitor to respond to readiness probes.
///
/// If the credential store can't be reached it will return NOT_SERVING.
///
pub async fn start(ctx: Arc<ServiceContext>) -> (HealthReporter, HealthServer<impl Health>, JoinHandle<()>) {
    let (mut reporter, health_service) = tonic_health::server::health_reporter();
    reporter.set_serving::<AccountsServer<Arc<ServiceContext>>>().await;
    reporter.set_serving::<UsersServer<Arc<ServiceContext>>>().await;
    reporter.set_service_status(LIVELINESS, ServingStatus::Serving).await;
    reporter.set_service_status(READINESS, ServingStatus::Serving).await;

    let monitor = tokio::spawn(monitor(ctx, reporter.clone()));
    tracing::info!("Health probe enabled for services {} and {}", LIVELINESS, READINESS);
    (reporter, health_service, monitor)
}

pub async fn shutdown(mut reporter: HealthReporter) {
    reporter.set_not_serving::<AccountsServer<Arc<ServiceContext>>>().await;
    reporter.set_not_serving::<UsersServer<Arc<ServiceContext>>>().await;
    reporter.set_service_status(LIVELINESS, ServingStatus::NotServing).await;
    reporter.set_service_status(READINESS, ServingStatus::NotServing).await;
}

///
/// Ping the credential store on every pulse and flip our readiness (and the Accounts service) if it
/// stops answering.
///
async fn monitor(ctx: Arc<ServiceContext>, mut reporter: HealthReporter) {
    let mut healthy = true;

    loop {
        tokio::time::sleep(Duration::from_millis(PULSE)).await;

        let now_healthy = store_healthy(&ctx).await;
        if now_healthy == healthy {
            continue
        }

        if now_healthy {
            tracing::info!("Service healthy (credential store reachable)");
            reporter.set_serving::<AccountsServer<Arc<ServiceContext>>>().await;
            reporter.set_service_status(READINESS, ServingStatus::Serving).await;
        } else {
            tracing::error!("Service NOT healthy (credential store unreachable)");
            reporter.set_not_serving::<AccountsServer<Arc<ServiceContext>>>().await;
            reporter.set_service_status(READINESS, ServingStatus::NotServing).await;
        }

        healthy = now_healthy;
    }
}

async fn store_healthy(ctx: &ServiceContext) -> bool {
    match tokio::time::timeout(Duration::from_millis(TIMEOUT), ctx.credentials().ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::trace!("Credential store ping failed: {}", err);
            false
        },
        Err(_elapsed) => {
            tracing::trace!("Credential store ping timed out after {}ms", TIMEOUT);
            false
        },
    }
}
