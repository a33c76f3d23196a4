use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed input (customer id, missing field, bad amount)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller identity does not resolve to a user
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is known but lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bill for the period (or the transaction itself) is already paid
    #[error("{0}")]
    AlreadySettled(String),

    /// Wallet balance lower than the amount to debit
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Uniqueness or state conflicts (duplicate discount code, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External biller / aggregator failures
    #[error("Gateway error: {message}")]
    Gateway { message: String, retryable: bool },

    /// Database operation errors, tagged with the failing operation
    #[error("Database error during {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::database("query", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // The error's Display carries the request URL; it only goes to the log.
        tracing::warn!(error = %err, "Biller request failed");

        // Transport failures may succeed on a later attempt, decode failures will not.
        let retryable = err.is_timeout() || err.is_connect() || err.is_request();
        let message = if err.is_timeout() {
            "Biller request timed out"
        } else if err.is_connect() {
            "Biller is unreachable"
        } else {
            "Biller request failed"
        };

        AppError::Gateway {
            message: message.to_string(),
            retryable,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // Storage and internal failures never leak their cause to the client.
        let error_message = match self {
            AppError::Database { .. } | AppError::Internal(_) | AppError::Configuration(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadySettled(_) => StatusCode::CONFLICT,
            AppError::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Gateway { retryable: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Gateway { retryable: false, .. } => StatusCode::BAD_GATEWAY,
            AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn already_settled(msg: impl Into<String>) -> Self {
        AppError::AlreadySettled(msg.into())
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        AppError::InsufficientFunds(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Business rejection or malformed response from the biller
    pub fn gateway(msg: impl Into<String>) -> Self {
        AppError::Gateway {
            message: msg.into(),
            retryable: false,
        }
    }

    /// Transport-level failure (timeout, connection reset)
    pub fn gateway_transport(msg: impl Into<String>) -> Self {
        AppError::Gateway {
            message: msg.into(),
            retryable: true,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Wrap a storage error with the operation that produced it
    pub fn database(operation: &str, err: sqlx::Error) -> Self {
        tracing::error!(operation = operation, error = %err, "Database operation failed");
        AppError::Database {
            operation: operation.to_string(),
            source: err,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Gateway { retryable: true, .. })
    }
}

/// True when a storage error is a duplicate-key violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
