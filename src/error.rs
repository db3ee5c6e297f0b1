//! Error types for the management codec.

use std::time::Duration;
use thiserror::Error;

/// Boxed cause carried by communication errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A field value rejected by a validated setter.
///
/// The entity the setter was called on is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is out of range: {value:?} (must be {bound})")]
    OutOfRange {
        field: &'static str,
        value: String,
        bound: String,
    },

    #[error("{field} '{name}' is invalid: {reason}")]
    InvalidName {
        field: &'static str,
        name: String,
        reason: String,
    },

    #[error("{field} cannot forward to the entity itself ('{target}')")]
    SelfForwarding { field: &'static str, target: String },

    #[error("{field} exceeds the maximum length of {max}")]
    TooLong { field: &'static str, max: usize },
}

impl ValidationError {
    pub(crate) fn duration_out_of_range(
        field: &'static str,
        value: Duration,
        bound: impl Into<String>,
    ) -> Self {
        ValidationError::OutOfRange {
            field,
            value: crate::duration::format_duration(value),
            bound: bound.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidName { field, .. }
            | ValidationError::SelfForwarding { field, .. }
            | ValidationError::TooLong { field, .. } => field,
        }
    }
}

/// Low-level failure while reading or writing a wire document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("XML error: {0}")]
    Xml(String),

    #[error("invalid {kind} literal in <{element}>: '{value}'")]
    InvalidLiteral {
        element: String,
        kind: &'static str,
        value: String,
    },

    #[error("invalid ISO-8601 duration '{0}'")]
    InvalidDuration(String),

    #[error("unbound namespace prefix '{0}'")]
    UnboundPrefix(String),

    #[error("missing <{0}> element")]
    MissingElement(&'static str),
}

impl CodecError {
    pub(crate) fn xml(e: impl std::fmt::Display) -> Self {
        CodecError::Xml(e.to_string())
    }
}

/// Error raised by transport implementations.
#[derive(Debug, Error)]
#[error("transport failure for '{resource_path}': {message}")]
pub struct TransportError {
    pub resource_path: String,
    pub message: String,
    #[source]
    pub source: Option<BoxError>,
}

impl TransportError {
    pub fn new(resource_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Main error type for management operations.
///
/// Callers can tell "the input was invalid" (`Validation`) apart from
/// "the server response could not be understood" (`Communication`).
#[derive(Debug, Error)]
pub enum ManagementError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("communication error: {message}")]
    Communication {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl ManagementError {
    /// Wrap any failure into a communication error.
    ///
    /// Errors that are already `ManagementError`s should not go through here;
    /// use [`ManagementError::wrap_parse`] for that.
    pub fn communication(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ManagementError::Communication {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Normalize an error raised while interpreting a response body.
    ///
    /// `EntityNotFound` and `Communication` pass through; anything else,
    /// validation failures of server-supplied values included, becomes a
    /// `Communication` error carrying the original as its source.
    pub(crate) fn wrap_parse(err: ManagementError) -> Self {
        match err {
            ManagementError::Validation(e) => {
                ManagementError::communication("response contains an invalid value", e)
            }
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ManagementError::EntityNotFound(_))
    }
}

impl From<CodecError> for ManagementError {
    fn from(e: CodecError) -> Self {
        ManagementError::communication("failed to interpret response body", e)
    }
}

impl From<TransportError> for ManagementError {
    fn from(e: TransportError) -> Self {
        ManagementError::communication("management transport failed", e)
    }
}

/// Result type for management operations.
pub type Result<T> = std::result::Result<T, ManagementError>;
