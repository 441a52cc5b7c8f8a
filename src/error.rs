//! Error types for the invoice query engine

pub type Result<T> = std::result::Result<T, InvoiceError>;

/// Failures of the persistent store. Never retried here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Cache failures. Callers degrade to a miss instead of failing the query.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Delivery failures of the best-effort report notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Message build error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Delivery failed: {message}")]
    Delivery { message: String },
}

impl NotificationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("Validation error: {errors:?}")]
    Validation { errors: Vec<String> },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl InvoiceError {
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    /// Validation messages, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            InvoiceError::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}
