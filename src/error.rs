use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Shared, cloneable cause so every waiter on a connect attempt sees the same error.
pub type Cause = Arc<dyn StdError + Send + Sync>;

/// Rejected user input. The display text is what the visitor sees.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("Please enter a valid email.")]
    InvalidEmail,

    #[error("Please enter your password.")]
    MissingPassword,
}

#[derive(Debug, Clone, ThisError)]
pub enum ConnectionError {
    #[error("database endpoint is missing; set DATABASE_URL")]
    MissingConfiguration,

    #[error("database connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("database connection failed: {0}")]
    Other(Cause),
}

impl ConnectionError {
    pub fn other<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ConnectionError::Other(Arc::new(err))
    }

    /// Wrap a plain message, e.g. a failed actor RPC.
    pub fn message(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        let boxed: Box<dyn StdError + Send + Sync> = msg.into();
        ConnectionError::Other(Arc::from(boxed))
    }
}

impl From<sqlx::Error> for ConnectionError {
    fn from(e: sqlx::Error) -> Self {
        ConnectionError::other(e)
    }
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("record store used before the database connection was established")]
    NotConnected,

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("write failed: {0}")]
    WriteFailed(#[from] sqlx::Error),
}

/// Everything that can go wrong after the password step passed validation.
#[derive(Debug, ThisError)]
pub enum SubmitError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmitError {
    pub fn is_missing_configuration(&self) -> bool {
        matches!(
            self,
            SubmitError::Connection(ConnectionError::MissingConfiguration)
                | SubmitError::Store(StoreError::Connection(
                    ConnectionError::MissingConfiguration
                ))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_is_detected_structurally() {
        let direct = SubmitError::from(ConnectionError::MissingConfiguration);
        assert!(direct.is_missing_configuration());

        let nested = SubmitError::from(StoreError::from(ConnectionError::MissingConfiguration));
        assert!(nested.is_missing_configuration());

        // A cause whose text mentions the config must not be mistaken for it.
        let lookalike = SubmitError::from(ConnectionError::message(
            "database endpoint is missing; set DATABASE_URL",
        ));
        assert!(!lookalike.is_missing_configuration());

        let timeout = SubmitError::from(ConnectionError::Timeout(Duration::from_secs(7)));
        assert!(!timeout.is_missing_configuration());
    }

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Please enter a valid email."
        );
        assert_eq!(
            ValidationError::MissingPassword.to_string(),
            "Please enter your password."
        );
    }
}
