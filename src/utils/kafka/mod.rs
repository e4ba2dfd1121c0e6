pub mod producer;

use std::time::Duration;
use super::config::Configuration;
use rdkafka::{ClientConfig, admin::{AdminClient, AdminOptions, NewTopic, TopicReplication}, client::DefaultClientContext};

///
/// Pre-create the topics we publish to - auto-create on the broker isn't always enabled and the
/// mail relay needs the topic to exist before it can subscribe.
///
pub async fn create_topics(config: &Configuration) {
    let topics = [config.notification_topic.as_str()];
    tracing::info!("Creating kafka topics {:?}", topics);

    let admin_client = match create_admin_client(config) {
        Ok(admin_client) => admin_client,
        Err(err) => {
            tracing::warn!("Unable to create a kafka admin client: {}", err);
            return
        }
    };

    let opts = AdminOptions::new().operation_timeout(Some(Duration::from_millis(config.kafka_timeout as u64)));

    let topics = topics
        .iter()
        .map(|topic| NewTopic::new(topic, 1, TopicReplication::Fixed(1)))
        .collect::<Vec<NewTopic>>();

    // A broker that's down shouldn't stop admins logging in - reset emails will report failures instead.
    if let Err(err) = admin_client.create_topics(&topics, &opts).await {
        tracing::warn!("Unable to create kafka topics: {}", err);
    }
}

fn create_admin_client(config: &Configuration) -> Result<AdminClient<DefaultClientContext>, rdkafka::error::KafkaError> {
    ClientConfig::new()
        .set("bootstrap.servers", config.kafka_servers.as_str())
        .create()
}
