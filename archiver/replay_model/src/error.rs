//! Reflection failure taxonomy.

use std::fmt;

/// Result of a reflection operation.
pub type ModelResult<T> = Result<T, ModelError>;

/// A failed reflection operation.
///
/// Every variant carries the names a diagnostic needs: the archiver's
/// degrade-and-continue policy logs these verbatim and moves on to the
/// next node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// No type registered under this name.
    UnknownType { name: String },
    /// The type chain declares no such property.
    NoSuchProperty { type_name: String, property: String },
    /// No method of this name accepts the given arguments.
    NoSuchMethod { type_name: String, method: String },
    /// No constructor accepts the given arguments.
    NoMatchingConstructor { type_name: String, arity: usize },
    /// Sequence index out of range.
    IndexOutOfBounds { index: usize, len: usize },
    /// The operation requires an object (or sequence) receiver.
    NotAnObject { kind: &'static str },
    /// A property read failed for a type-specific reason.
    PropertyReadFailed {
        type_name: String,
        property: String,
        reason: String,
    },
}

impl ModelError {
    /// Factory: unknown type name.
    pub fn unknown_type(name: &str) -> Self {
        ModelError::UnknownType { name: name.into() }
    }

    /// Factory: missing property.
    pub fn no_such_property(type_name: &str, property: &str) -> Self {
        ModelError::NoSuchProperty {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Factory: unresolvable method call.
    pub fn no_such_method(type_name: &str, method: &str) -> Self {
        ModelError::NoSuchMethod {
            type_name: type_name.into(),
            method: method.into(),
        }
    }

    /// Factory: unresolvable constructor call.
    pub fn no_matching_constructor(type_name: &str, arity: usize) -> Self {
        ModelError::NoMatchingConstructor {
            type_name: type_name.into(),
            arity,
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownType { name } => write!(f, "unknown type `{name}`"),
            ModelError::NoSuchProperty {
                type_name,
                property,
            } => write!(f, "no property `{property}` on `{type_name}`"),
            ModelError::NoSuchMethod { type_name, method } => {
                write!(f, "no matching method `{method}` on `{type_name}`")
            }
            ModelError::NoMatchingConstructor { type_name, arity } => {
                write!(f, "no {arity}-argument constructor on `{type_name}`")
            }
            ModelError::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds (length {len})")
            }
            ModelError::NotAnObject { kind } => {
                write!(f, "expected an object receiver, found {kind}")
            }
            ModelError::PropertyReadFailed {
                type_name,
                property,
                reason,
            } => write!(
                f,
                "reading `{property}` of `{type_name}` failed: {reason}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}
