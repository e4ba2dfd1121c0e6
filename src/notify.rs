use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;
use rdkafka::producer::FutureProducer;
use crate::{model::events::EmailRequested, utils::{config::Configuration, errors::{ErrorCode, RosterError}, kafka::producer}};

/// The schema version stamped on outbound email messages.
const EMAIL_VERSION: u8 = 1;

///
/// Delivers emails to admins. Any failure comes back as NotificationFailed.
///
#[tonic::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), RosterError>;
}

///
/// Publishes email requests to Kafka where the mail relay picks them up.
///
pub struct KafkaNotifier {
    producer: FutureProducer,
    config: Configuration,
}

impl KafkaNotifier {
    pub fn new(config: &Configuration) -> Result<Self, RosterError> {
        Ok(Self {
            producer: producer::producer(config)?,
            config: config.clone(),
        })
    }
}

#[tonic::async_trait]
impl Notifier for KafkaNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), RosterError> {
        let email = EmailRequested {
            to: to.to_string(),
            from: self.config.email_from.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        let payload = serde_json::to_string(&email)
            .map_err(|err| ErrorCode::NotificationFailed.with_msg(&format!("Unable to serialise email: {}", err)))?;

        producer::send(&self.producer, &self.config, &self.config.notification_topic, to, &payload, EMAIL_VERSION).await
    }
}

///
/// Keeps sent emails in memory. Used in tests and local runs without a broker.
///
#[derive(Debug, Default)]
pub struct Outbox {
    sent: Mutex<Vec<EmailRequested>>,
    failing: AtomicBool,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// While failing, every send is rejected and nothing is recorded.
    ///
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailRequested> {
        self.sent.lock().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<EmailRequested> {
        self.sent.lock().iter().rev().find(|email| email.to == to).cloned()
    }
}

#[tonic::async_trait]
impl Notifier for Outbox {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), RosterError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ErrorCode::NotificationFailed.with_msg("The outbox is not accepting email"))
        }

        self.sent.lock().push(EmailRequested {
            to: to.to_string(),
            from: String::new(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
