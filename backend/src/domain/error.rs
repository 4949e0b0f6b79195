//! The one failure type every operation returns.
//!
//! Adapters decide the transport status from [`ErrorCode`]; the serialised
//! form (`code`, `message`, `traceId`, `details`) is the body clients see.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::TraceId;

const REDACTED_MESSAGE: &str = "Internal server error";
const CREDENTIAL_MESSAGE: &str = "forbidden access";

/// Failure category, serialised in `snake_case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed body or query, or a field failed validation.
    InvalidRequest,
    /// No bearer credential on a route that needs one.
    MissingCredential,
    /// Bad signature, wrong shape, or expired.
    InvalidCredential,
    /// The caller's role lacks the capability.
    Forbidden,
    NotFound,
    /// A uniqueness key was already held; nothing was written.
    Conflict,
    /// Storage or an outbound service failed or timed out.
    ServiceUnavailable,
    InternalError,
}

/// Error envelope.
///
/// The trace id is captured from the request scope at construction, so a
/// service deep in the call stack needs no request handle to fill it.
///
/// ```
/// use hunt_backend::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::conflict("Payment already recorded")
///     .with_details(json!({ "key": "payment" }));
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert_eq!(err.to_string(), "Payment already recorded");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct Error {
    #[schema(example = "conflict")]
    code: ErrorCode,
    #[schema(example = "You have already voted this product")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Override the captured trace id.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(id.into()),
            ..self
        }
    }

    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// What a client may see: internal errors lose their message and details.
    pub fn redacted(&self) -> Self {
        match self.code {
            ErrorCode::InternalError => Self {
                code: ErrorCode::InternalError,
                message: REDACTED_MESSAGE.to_owned(),
                trace_id: self.trace_id.clone(),
                details: None,
            },
            _ => self.clone(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn missing_credential() -> Self {
        Self::new(ErrorCode::MissingCredential, CREDENTIAL_MESSAGE)
    }

    pub fn invalid_credential() -> Self {
        Self::new(ErrorCode::InvalidCredential, CREDENTIAL_MESSAGE)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests;
