use serde::{Deserialize, Serialize};

/// Structured error payload returned by the ledger service on non-success
/// responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

/// Envelope the ledger wraps errors in: `{"error":{"message":"..."}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ApiError {
                message: message.into(),
            },
        }
    }
}
