use std::time::Duration;
use tracing::instrument;
use crate::{APP_NAME, utils::{config::Configuration, errors::{ErrorCode, RosterError}}};
use rdkafka::{ClientConfig, message::OwnedHeaders, producer::{FutureProducer, FutureRecord}};

pub fn producer(config: &Configuration) -> Result<FutureProducer, RosterError> {
    ClientConfig::new()
        .set("bootstrap.servers", config.kafka_servers.as_str())
        .set("message.timeout.ms", format!("{}", config.kafka_timeout))
        .create()
        .map_err(|err| ErrorCode::NotificationFailed.with_msg(&format!("Producer creation error: {}", err)))
}

#[instrument(name="kafka:send", skip(producer, config, key, payload, version))]
pub async fn send(producer: &FutureProducer, config: &Configuration, topic: &str, key: &str, payload: &str, version: u8) -> Result<(), RosterError> {
    producer
        .send(
            FutureRecord::to(topic)
                .payload(payload)
                .key(key) // Partition key - messages for the same recipient stay in order.
                .headers(OwnedHeaders::new()
                    .add("version", &format!("{}", version))
                    .add("sender", APP_NAME)),
            Duration::from_millis(config.kafka_timeout as u64),
        )
        .await?;
    Ok(())
}
