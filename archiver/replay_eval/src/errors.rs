//! Evaluation failure taxonomy.

use std::fmt;

use replay_model::{ModelError, Value};

/// Result of evaluating a node.
pub type EvalResult = Result<Value, EvalError>;

/// A failed evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// A symbol had no binding in the namespace.
    UnboundName { name: String },
    /// A form's operator position did not resolve to anything invocable.
    NoMatchingOperation { head: String },
    /// An operator received operands of the wrong count or kind.
    MalformedForm {
        operator: &'static str,
        reason: String,
    },
    /// The object model rejected a reflective operation.
    Model(ModelError),
}

impl EvalError {
    /// Factory: unbound symbol.
    pub fn unbound(name: &str) -> Self {
        EvalError::UnboundName { name: name.into() }
    }

    /// Factory: uninvocable operator position.
    pub fn no_matching_operation(head: &Value) -> Self {
        EvalError::NoMatchingOperation {
            head: head.kind_name().into(),
        }
    }

    /// Factory: bad operand shape.
    pub fn malformed(operator: &'static str, reason: impl Into<String>) -> Self {
        EvalError::MalformedForm {
            operator,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnboundName { name } => write!(f, "unbound name `{name}`"),
            EvalError::NoMatchingOperation { head } => {
                write!(f, "form head evaluates to {head}, which is not invocable")
            }
            EvalError::MalformedForm { operator, reason } => {
                write!(f, "malformed `{operator}` form: {reason}")
            }
            EvalError::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for EvalError {
    fn from(e: ModelError) -> Self {
        EvalError::Model(e)
    }
}
