//! The evaluator namespace.

use rustc_hash::FxHashMap;

use replay_ir::{Name, StringInterner};
use replay_model::{ObjectModel, Value};

/// Flat namespace mapping names to values.
///
/// Membership is three-state: a name can be *unbound* (`lookup` returns
/// `None`), *bound to null* (`Some(&Value::Null)`), or *bound to a value*.
/// The distinction matters to the generator: "no information yet" and
/// "known to be null" lead to different emissions when deciding whether a
/// property write is redundant.
#[derive(Default)]
pub struct Environment {
    bindings: FxHashMap<Name, Value>,
}

impl Environment {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Environment {
            bindings: FxHashMap::default(),
        }
    }

    /// Create a namespace with the standard prelude: the meta type bound
    /// under `Type`, so archives can resolve types by name.
    pub fn with_prelude(model: &dyn ObjectModel, interner: &StringInterner) -> Self {
        let mut env = Environment::new();
        env.define(interner.intern("Type"), Value::Type(model.meta_type()));
        env
    }

    /// Bind (or rebind) a name.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    /// Look up a name. `None` means unbound - distinct from bound-to-null.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<&Value> {
        self.bindings.get(&name)
    }

    /// Whether a name has any binding (including a null one).
    #[inline]
    pub fn is_bound(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the namespace is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
