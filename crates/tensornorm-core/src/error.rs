use thiserror::Error;

/// Error taxonomy shared by every crate in the workspace.
///
/// Variants carry the name of the operation that failed so that errors
/// surfaced from deep inside a kernel still read sensibly at the call site.
#[derive(Error, Debug, Clone)]
pub enum TensorError {
    #[error("Shape mismatch in operation '{operation}': expected {expected}, got {got}")]
    ShapeMismatch {
        operation: String,
        expected: String,
        got: String,
    },

    #[error("Invalid shape in operation '{operation}': {reason}")]
    InvalidShape { operation: String, reason: String },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error("Invalid operation '{operation}': {reason}")]
    InvalidOperation { operation: String, reason: String },

    #[error("Operation '{operation}' not implemented: {details}")]
    NotImplemented { operation: String, details: String },

    #[error("Operation '{operation}' not supported on device: {device}")]
    UnsupportedDevice { operation: String, device: String },

    #[error("Numerical error in operation '{operation}': {details}")]
    NumericalError { operation: String, details: String },
}

impl TensorError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        TensorError::InvalidArgument {
            operation: "unknown".to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument_op(operation: &str, reason: impl Into<String>) -> Self {
        TensorError::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_shape_simple(reason: impl Into<String>) -> Self {
        TensorError::InvalidShape {
            operation: "unknown".to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_shape_op(operation: &str, reason: impl Into<String>) -> Self {
        TensorError::InvalidShape {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_operation_simple(reason: impl Into<String>) -> Self {
        TensorError::InvalidOperation {
            operation: "unknown".to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_implemented(operation: &str, details: impl Into<String>) -> Self {
        TensorError::NotImplemented {
            operation: operation.to_string(),
            details: details.into(),
        }
    }

    pub fn shape_mismatch(
        operation: &str,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        TensorError::ShapeMismatch {
            operation: operation.to_string(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn numerical_error(operation: &str, details: impl Into<String>) -> Self {
        TensorError::NumericalError {
            operation: operation.to_string(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;
