use crate::value::ValueKind;

/// Failures raised by the parameter registry and the command path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{name}' expects {expected} but got {found}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("value {value} for '{name}' is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("failed to parse '{input}': {reason}")]
    ParseFailure { input: String, reason: String },
    #[error("'{name}' holds {len} entries but at most {capacity} are allowed")]
    CapacityExceeded {
        name: String,
        len: usize,
        capacity: usize,
    },
    #[error("'{0}' is declared more than once")]
    DuplicateParameter(String),
}

impl ConsoleError {
    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = ConsoleError> = std::result::Result<T, E>;
