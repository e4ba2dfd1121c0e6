use bcrypt::BcryptError;
use tokio::task::JoinError;
use tonic::{Code, Status};
use rdkafka::{error::KafkaError, message::OwnedMessage};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ErrorCode {
    TonicStartError                 = 0400,
    HashThreadingIssue              = 0401,
    IOError                         = 0402,
    UnableToReadCredentials         = 0500,
    MongoDBError                    = 0503,
    InvalidJSON                     = 0505,
    NotificationFailed              = 0506,
    InvalidConfig                   = 0508,
    HashingError                    = 0509,
    InvalidPHCFormat                = 0510,
    UnknownAlgorithm                = 0511,
    MissingField                    = 1000,
    InvalidTime                     = 1001,
    AdminAlreadyExists              = 2001,
    AdminNotFound                   = 2101,
    AccountLocked                   = 2102,
    InvalidCredentials              = 2103,
    Unauthenticated                 = 2104,
    EmailNotFound                   = 2200,
    InvalidResetToken               = 2201,
    UserNotFound                    = 2300,
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> RosterError {
        RosterError::new(*self, message)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RosterError {
    error_code: ErrorCode,
    message: String,
}

impl RosterError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        RosterError { error_code, message: message.to_string() }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({}): {}", self.error_code, self.error_code as u32, self.message)
    }
}

impl std::error::Error for RosterError {}

impl From<tonic::transport::Error> for RosterError {
    fn from(error: tonic::transport::Error) -> Self {
        ErrorCode::TonicStartError.with_msg(&format!("Failed to start gRPC server: {}", error))
    }
}

impl From<std::io::Error> for RosterError {
    fn from(error: std::io::Error) -> Self {
        ErrorCode::IOError.with_msg(&format!("IO error: {}", error))
    }
}

impl From<config::ConfigError> for RosterError {
    fn from(error: config::ConfigError) -> Self {
        ErrorCode::InvalidConfig.with_msg(&format!("The service configuration is not correct: {}", error))
    }
}

impl From<argon2::Error> for RosterError {
    fn from(error: argon2::Error) -> Self {
        ErrorCode::InvalidConfig.with_msg(&format!("Invalid configuration for argon2: {}", error))
    }
}

impl From<argon2::password_hash::Error> for RosterError {
    fn from(error: argon2::password_hash::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash password: {}", error))
    }
}

impl From<BcryptError> for RosterError {
    fn from(error: BcryptError) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash or verify password: {}", error))
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert to json: {}", error))
    }
}

impl From<mongodb::error::Error> for RosterError {
    fn from(error: mongodb::error::Error) -> Self {
        ErrorCode::MongoDBError.with_msg(&format!("MongoDB error: {}", error))
    }
}

impl From<JoinError> for RosterError {
    fn from(error: JoinError) -> Self {
        ErrorCode::HashThreadingIssue.with_msg(&format!("Unable to hash: {}", error))
    }
}

impl From<(KafkaError, OwnedMessage)> for RosterError {
    fn from((error, _message): (KafkaError, OwnedMessage)) -> Self {
        // The message holds the email body (and so a reset link) - keep it out of the error.
        ErrorCode::NotificationFailed.with_msg(&format!("Kafka error: {}", error))
    }
}

///
/// Convert our internal error into a gRPC status response.
///
impl From<RosterError> for Status {
    fn from(error: RosterError) -> Self {
        use ErrorCode::*;

        let code = match &error.error_code {
            HashThreadingIssue      |
            HashingError            |
            IOError                 |
            InvalidConfig           |
            InvalidJSON             |
            InvalidPHCFormat        |
            MongoDBError            |
            TonicStartError         |
            UnableToReadCredentials |
            UnknownAlgorithm        => Code::Internal,

            NotificationFailed => Code::Unavailable,

            AdminNotFound     |
            EmailNotFound     |
            InvalidResetToken |
            UserNotFound      => Code::NotFound,

            AdminAlreadyExists => Code::AlreadyExists,

            InvalidTime  |
            MissingField => Code::InvalidArgument,

            AccountLocked      |
            InvalidCredentials |
            Unauthenticated    => Code::Unauthenticated,
        };

        Status::with_details(code, error.message, format!("{}", error.error_code as u32).into())
    }
}
