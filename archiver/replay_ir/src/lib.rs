//! Replay IR - expression node model for the Replay archiver.
//!
//! Every other crate in the workspace consumes or produces the types in
//! this crate:
//!
//! - [`Node`]: the tagged expression unit (`Literal` / `Symbol` / `Form`)
//!   shared by the generator, the evaluator, the simplifier, and the
//!   renderers.
//! - [`Name`] / [`StringInterner`]: compact interned identifiers used for
//!   every generated or parsed name.
//! - [`simplify`]: the fixed-point dead-binding/dead-statement rewriter
//!   applied to every generated tree before rendering.
//!
//! # Operator vocabulary
//!
//! The operator set is a closed enum ([`Op`]) rather than a set of
//! reserved identifier spellings. A [`Symbol`] is either an operator or an
//! interned name, so a generated name can never collide with an operator
//! no matter what it spells.

mod display;
mod interner;
mod name;
mod node;
pub mod simplify;

pub use display::NodeDisplay;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use node::{Form, Literal, Node, Op, Symbol};
pub use simplify::simplify;
