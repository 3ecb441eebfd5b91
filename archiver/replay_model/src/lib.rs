//! Runtime values and the reflection boundary for the Replay archiver.
//!
//! The archiver core never inspects host objects directly. Everything it
//! needs - type metadata, property access, invocation with overload
//! resolution, equality - goes through the [`ObjectModel`] trait, so the
//! core contains no host-specific coercion rules.
//!
//! # Values and identity
//!
//! [`Value`] carries scalars inline and refers to host objects by
//! [`ObjId`] handle. Handle equality *is* reference identity, which is
//! what the generator's identity map keys on; deep structural equality is
//! the model's business ([`ObjectModel::deep_eq`]).
//!
//! # The bundled model
//!
//! [`dynamic::DynamicModel`] is a complete registry-driven object model
//! (class definitions, field defaults, constructor overloads, methods as
//! closures, sequence and proxy types). Embedders with their own
//! reflection facility implement [`ObjectModel`] instead; the rest of the
//! workspace only ever sees the trait.

pub mod dynamic;
mod error;
mod value;

pub use dynamic::DynamicModel;
pub use error::{ModelError, ModelResult};
pub use value::{ObjId, TypeId, Value};

use replay_ir::Name;

/// Structural category of a type, driving synthesized strategies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeShape {
    /// Ordinary object with introspectable properties.
    Record,
    /// Value-like type reconstructed from a literal.
    Scalar,
    /// Fixed-length indexed container of `component` elements.
    Sequence {
        /// Element type.
        component: TypeId,
    },
    /// Delegating type reconstructed from its handler object.
    Proxy,
}

/// The reflection facility consumed by the archiver core.
///
/// Implementations own the live objects; the core holds only handles.
/// Methods that mutate instances take `&self` - models use interior
/// mutability, since construction and property writes happen while the
/// generator incrementally evaluates the code it has emitted so far.
pub trait ObjectModel {
    /// The type of type values ("the type of types").
    fn meta_type(&self) -> TypeId;

    /// Resolve a type by its registered name.
    fn lookup_type(&self, name: &str) -> ModelResult<TypeId>;

    /// Name a type was registered under.
    fn type_name(&self, ty: TypeId) -> String;

    /// Direct supertype, if any.
    fn supertype(&self, ty: TypeId) -> Option<TypeId>;

    /// Structural category of the type.
    fn shape(&self, ty: TypeId) -> TypeShape;

    /// Runtime type of a value. Must not be called with `Value::Null`.
    fn type_of(&self, value: &Value) -> TypeId;

    /// Properties declared at exactly this type (readable and writable),
    /// in declaration order. Inherited properties are not included.
    fn declared_properties(&self, ty: TypeId) -> Vec<Name>;

    /// Read a property.
    fn read(&self, obj: ObjId, property: Name) -> ModelResult<Value>;

    /// Write a property.
    fn write(&self, obj: ObjId, property: Name, value: Value) -> ModelResult<()>;

    /// Read an indexed element of a sequence object.
    fn read_index(&self, obj: ObjId, index: usize) -> ModelResult<Value>;

    /// Write an indexed element of a sequence object.
    fn write_index(&self, obj: ObjId, index: usize, value: Value) -> ModelResult<()>;

    /// Element count of a sequence object.
    fn length(&self, obj: ObjId) -> ModelResult<usize>;

    /// Invoke a method on a receiver, resolving overloads internally.
    fn invoke(&self, receiver: &Value, method: Name, args: &[Value]) -> ModelResult<Value>;

    /// Construct an instance, resolving constructor overloads internally.
    /// An empty argument list requests the default construction.
    fn construct(&self, ty: TypeId, args: &[Value]) -> ModelResult<Value>;

    /// The proxy class and handler value behind a proxy object.
    fn proxy_parts(&self, obj: ObjId) -> ModelResult<(TypeId, Value)>;

    /// Deep structural equality. Must terminate on cyclic graphs.
    fn deep_eq(&self, a: &Value, b: &Value) -> bool;
}
