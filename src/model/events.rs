use serde::{Deserialize, Serialize};

///
/// An outbound email handed to the mail relay over Kafka.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EmailRequested {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}
