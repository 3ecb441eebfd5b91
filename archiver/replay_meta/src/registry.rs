//! The strategy registry.
//!
//! Configured once through [`RegistryBuilder`], frozen into a read-mostly
//! [`Registry`] before the first generation session. Default strategies
//! are derived lazily per type and cached; the cache is the only mutable
//! state behind the frozen view.

use std::rc::Rc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use replay_ir::Name;
use replay_model::{ModelResult, TypeId, TypeShape, Value};

use crate::{
    builtin, ConstructionHook, DiffPolicy, InitializerHook, Strategy, StrategyContext, Template,
};

enum PropertyEdit {
    Remove(Name),
    Add(Name),
}

#[derive(Default)]
struct StrategyConfig {
    replace: Option<Strategy>,
    ctor_args: Option<Vec<Name>>,
    edits: Vec<PropertyEdit>,
    construction: Option<ConstructionHook>,
    initializers: Option<InitializerHook>,
    diff: Option<DiffPolicy>,
}

/// Mutable configuration stage of the registry.
///
/// All per-type adjustments happen here, before [`RegistryBuilder::freeze`];
/// the frozen registry accepts no further configuration.
#[derive(Default)]
pub struct RegistryBuilder {
    configs: FxHashMap<TypeId, StrategyConfig>,
}

impl RegistryBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    fn config(&mut self, ty: TypeId) -> &mut StrategyConfig {
        self.configs.entry(ty).or_default()
    }

    /// Replace the whole strategy for a type.
    pub fn register(&mut self, ty: TypeId, strategy: Strategy) -> &mut Self {
        self.config(ty).replace = Some(strategy);
        self
    }

    /// Declare which properties travel as constructor arguments.
    ///
    /// These are removed from the post-construction assignment list.
    pub fn constructor_args(&mut self, ty: TypeId, args: Vec<Name>) -> &mut Self {
        self.config(ty).ctor_args = Some(args);
        self
    }

    /// Append a property to the type's assignment list.
    ///
    /// Re-adding after [`Self::remove_property`] moves a property to the
    /// back of the walk order - the idiom for "assign this one after the
    /// others it depends on".
    pub fn add_property(&mut self, ty: TypeId, name: Name) -> &mut Self {
        self.config(ty).edits.push(PropertyEdit::Add(name));
        self
    }

    /// Remove a property from the type's assignment list.
    pub fn remove_property(&mut self, ty: TypeId, name: Name) -> &mut Self {
        self.config(ty).edits.push(PropertyEdit::Remove(name));
        self
    }

    /// Replace the construction derivation for a type.
    pub fn construction_hook(&mut self, ty: TypeId, hook: ConstructionHook) -> &mut Self {
        self.config(ty).construction = Some(hook);
        self
    }

    /// Replace the initializer derivation for a type.
    pub fn initializer_hook(&mut self, ty: TypeId, hook: InitializerHook) -> &mut Self {
        self.config(ty).initializers = Some(hook);
        self
    }

    /// Set the default-equality policy for a type.
    pub fn diff_policy(&mut self, ty: TypeId, policy: DiffPolicy) -> &mut Self {
        self.config(ty).diff = Some(policy);
        self
    }

    /// Freeze the configuration into the runtime registry.
    pub fn freeze(self) -> Registry {
        Registry {
            configs: self.configs,
            derived: RwLock::new(FxHashMap::default()),
        }
    }
}

/// Frozen, read-mostly strategy table.
pub struct Registry {
    configs: FxHashMap<TypeId, StrategyConfig>,
    derived: RwLock<FxHashMap<TypeId, Rc<Strategy>>>,
}

impl Registry {
    /// Start configuring a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry with no per-type configuration at all.
    pub fn empty() -> Registry {
        RegistryBuilder::new().freeze()
    }

    /// The strategy for one exact type (derived and cached on first use).
    pub fn strategy_for(&self, cx: &StrategyContext<'_>, ty: TypeId) -> Rc<Strategy> {
        if let Some(s) = self.derived.read().get(&ty) {
            return Rc::clone(s);
        }
        let strategy = Rc::new(self.derive(cx, ty));
        self.derived.write().insert(ty, Rc::clone(&strategy));
        strategy
    }

    fn derive(&self, cx: &StrategyContext<'_>, ty: TypeId) -> Strategy {
        let config = self.configs.get(&ty);
        let mut strategy = match config.and_then(|c| c.replace.clone()) {
            Some(s) => s,
            None if ty == cx.model.meta_type() => builtin::type_strategy(),
            None => match cx.model.shape(ty) {
                TypeShape::Record => {
                    let mut s = Strategy::new();
                    s.properties = cx.model.declared_properties(ty);
                    s
                }
                TypeShape::Scalar => builtin::scalar_strategy(),
                TypeShape::Sequence { .. } => builtin::sequence_strategy(),
                TypeShape::Proxy => builtin::proxy_strategy(),
            },
        };
        if let Some(config) = config {
            if let Some(args) = &config.ctor_args {
                strategy.ctor_args = args.clone();
                strategy.properties.retain(|p| !args.contains(p));
            }
            for edit in &config.edits {
                match edit {
                    PropertyEdit::Remove(name) => strategy.properties.retain(|p| p != name),
                    PropertyEdit::Add(name) => strategy.properties.push(*name),
                }
            }
            if let Some(hook) = &config.construction {
                strategy.construction = Some(Rc::clone(hook));
            }
            if let Some(hook) = &config.initializers {
                strategy.initializers = Some(Rc::clone(hook));
            }
            if let Some(policy) = config.diff {
                strategy.diff = policy;
            }
        }
        debug!(
            type_name = %cx.model.type_name(ty),
            properties = strategy.properties.len(),
            "derived strategy"
        );
        strategy
    }

    /// Supertype chain of a type, most-derived first.
    fn chain(&self, cx: &StrategyContext<'_>, ty: TypeId) -> Vec<TypeId> {
        let mut chain = vec![ty];
        let mut cursor = cx.model.supertype(ty);
        while let Some(t) = cursor {
            chain.push(t);
            cursor = cx.model.supertype(t);
        }
        chain
    }

    /// Construction template for a value (exact runtime type only).
    pub fn construction(
        &self,
        cx: &StrategyContext<'_>,
        new: &Value,
        old: &Value,
    ) -> ModelResult<Option<Template>> {
        let ty = cx.model.type_of(new);
        self.strategy_for(cx, ty).construction(cx, new, old)
    }

    /// Initializer statements for a value, accumulated along the
    /// supertype chain, ancestors first.
    pub fn initializers(
        &self,
        cx: &StrategyContext<'_>,
        new: &Value,
        old: &Value,
    ) -> ModelResult<Vec<Template>> {
        let ty = cx.model.type_of(new);
        let mut statements = Vec::new();
        for t in self.chain(cx, ty).into_iter().rev() {
            statements.extend(
                self.strategy_for(cx, t)
                    .initializer_templates(cx, new, old)?,
            );
        }
        Ok(statements)
    }

    /// Post-construction property walk order, accumulated along the
    /// supertype chain, ancestors first.
    pub fn properties(&self, cx: &StrategyContext<'_>, ty: TypeId) -> Vec<Name> {
        let mut properties = Vec::new();
        for t in self.chain(cx, ty).into_iter().rev() {
            properties.extend(self.strategy_for(cx, t).properties.iter().copied());
        }
        properties
    }
}

#[cfg(test)]
mod tests;
