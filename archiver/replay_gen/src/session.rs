//! Per-call generation state.

use rustc_hash::FxHashMap;

use replay_ir::{Name, StringInterner};
use replay_model::{ObjId, ObjectModel, TypeId, Value};
use replay_eval::Environment;

/// Identity of a visited graph node.
///
/// Objects are identified by handle, types by type id; scalars have value
/// semantics and never enter the identity map.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InstanceKey {
    Object(ObjId),
    Type(TypeId),
}

impl InstanceKey {
    /// The identity key of a value, if it has one.
    pub fn of(value: &Value) -> Option<InstanceKey> {
        match value {
            Value::Object(obj) => Some(InstanceKey::Object(*obj)),
            Value::Type(ty) => Some(InstanceKey::Type(*ty)),
            _ => None,
        }
    }
}

/// Mutable state of one top-level `generate` call.
///
/// Owns the identity map (visited instance -> minted symbol), the
/// per-type counters behind readable unique names, and the environment
/// the emitted code is incrementally evaluated in. Never shared across
/// calls; each call creates and discards its own session.
pub struct GenerationSession {
    identity: FxHashMap<InstanceKey, Name>,
    counters: FxHashMap<TypeId, u32>,
    env: Environment,
}

impl GenerationSession {
    /// Fresh session with the standard prelude: the meta type is
    /// pre-named `Type` and pre-bound in the environment, so type values
    /// referenced by construction templates resolve to it.
    pub fn new(model: &dyn ObjectModel, interner: &StringInterner) -> Self {
        let mut session = GenerationSession {
            identity: FxHashMap::default(),
            counters: FxHashMap::default(),
            env: Environment::with_prelude(model, interner),
        };
        let meta = model.meta_type();
        session
            .identity
            .insert(InstanceKey::Type(meta), interner.intern("Type"));
        session
    }

    /// The session environment (read side).
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The session environment (write side).
    pub(crate) fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// The symbol already minted for a graph node, if any.
    pub fn identity(&self, key: InstanceKey) -> Option<Name> {
        self.identity.get(&key).copied()
    }

    /// Record a minted symbol for a graph node.
    pub(crate) fn record(&mut self, key: InstanceKey, name: Name) {
        self.identity.insert(key, name);
    }

    /// Mint a readable unique name for an instance of `ty`.
    ///
    /// Type values take the bare type name; everything else gets the type
    /// name plus a per-type counter (`Point0`, `Point1`, ...).
    pub(crate) fn mint(
        &mut self,
        interner: &StringInterner,
        ty: TypeId,
        type_name: &str,
        bare: bool,
    ) -> Name {
        if bare {
            return interner.intern(type_name);
        }
        let counter = self.counters.entry(ty).or_insert(0);
        let name = interner.intern(&format!("{type_name}{counter}"));
        *counter += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_ir::SharedInterner;
    use replay_model::DynamicModel;

    #[test]
    fn test_minting_is_per_type() {
        let interner = SharedInterner::new();
        let model = DynamicModel::new(interner.clone());
        let point = model.define_class("Point");
        let line = model.define_class("Line");
        let mut session = GenerationSession::new(&model, &interner);

        let a = session.mint(&interner, point, "Point", false);
        let b = session.mint(&interner, point, "Point", false);
        let c = session.mint(&interner, line, "Line", false);
        assert_eq!(interner.lookup(a), "Point0");
        assert_eq!(interner.lookup(b), "Point1");
        assert_eq!(interner.lookup(c), "Line0");
    }

    #[test]
    fn test_prelude_binds_meta_type() {
        let interner = SharedInterner::new();
        let model = DynamicModel::new(interner.clone());
        let session = GenerationSession::new(&model, &interner);
        let ty = interner.intern("Type");
        assert!(session.environment().is_bound(ty));
        assert_eq!(
            session.identity(InstanceKey::Type(
                replay_model::ObjectModel::meta_type(&model)
            )),
            Some(ty)
        );
    }
}
