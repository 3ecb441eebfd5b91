//! Replay Gen - the graph serializer.
//!
//! [`ExpressionGenerator::generate`] walks a live, possibly cyclic object
//! graph and produces one IR tree of construction calls, property writes,
//! and collection-population calls. Replaying that tree through
//! `replay_eval` reconstructs an equivalent graph.
//!
//! # How minimality happens
//!
//! The generator evaluates the code it has emitted *while emitting it*.
//! Before recursing into a property, it evaluates the access expression
//! for that property against the session environment; the result - the
//! *prototype* - is whatever a replay would already find there (usually
//! the default value of a freshly constructed parent). A property whose
//! live value matches its prototype costs zero emitted statements.
//!
//! # How cycles terminate
//!
//! An object's symbol is recorded in the session identity map *before*
//! its construction template is resolved, so any path back to the object
//! - through a property, an initializer, or a constructor argument -
//! resolves to the already-minted name instead of recursing.

mod error;
mod generator;
mod session;

pub use error::GenError;
pub use generator::ExpressionGenerator;
pub use session::{GenerationSession, InstanceKey};
