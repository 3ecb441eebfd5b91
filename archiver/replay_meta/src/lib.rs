//! Replay Meta - per-type serialization strategies.
//!
//! A [`Strategy`] describes how to rebuild an instance of one type: which
//! properties travel as constructor arguments, which are assigned after
//! construction (and in what order), and - for structurally irregular
//! types - hook closures that replace the derived construction and
//! initializer shapes outright.
//!
//! Strategies are held by a [`Registry`], configured once through a
//! [`RegistryBuilder`] and frozen before the first generation session.
//! Types without an explicit registration get a default strategy derived
//! from the model's declared properties, lazily, cached per type;
//! sequences, scalars, proxies, and the meta type get synthesized
//! strategies instead.

mod builtin;
mod registry;
mod strategy;
mod template;

pub use registry::{Registry, RegistryBuilder};
pub use strategy::{ConstructionHook, DiffPolicy, InitializerHook, Strategy, StrategyContext};
pub use template::Template;
