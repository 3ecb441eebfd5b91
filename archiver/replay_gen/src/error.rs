//! Generation failure type.

use std::fmt;

use replay_eval::EvalError;
use replay_model::ModelError;

/// A failed step inside `write_node`.
///
/// These never escape a top-level `generate` call: the generator catches
/// them per node, logs a diagnostic, and substitutes a bare reference to
/// the node's minted symbol so sibling nodes still archive.
#[derive(Clone, Debug, PartialEq)]
pub enum GenError {
    /// Incremental evaluation of emitted code failed.
    Eval(EvalError),
    /// A strategy or reflective operation failed.
    Model(ModelError),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::Eval(e) => write!(f, "{e}"),
            GenError::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenError::Eval(e) => Some(e),
            GenError::Model(e) => Some(e),
        }
    }
}

impl From<EvalError> for GenError {
    fn from(e: EvalError) -> Self {
        GenError::Eval(e)
    }
}

impl From<ModelError> for GenError {
    fn from(e: ModelError) -> Self {
        GenError::Model(e)
    }
}
