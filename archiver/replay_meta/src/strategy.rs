//! Per-type serialization strategy.

use std::rc::Rc;

use replay_ir::{Name, StringInterner};
use replay_model::{ModelResult, ObjectModel, Value};

use crate::Template;

/// Borrowed context handed to strategy hooks.
pub struct StrategyContext<'a> {
    pub model: &'a dyn ObjectModel,
    pub interner: &'a StringInterner,
}

/// Replacement construction derivation: `(context, new, old) -> template`.
///
/// `old` is the prototype - whatever already exists at the target position
/// (a default-constructed instance, a shared singleton, or null). Returning
/// `None` means the prototype is adopted as-is and no construction is
/// emitted.
pub type ConstructionHook =
    Rc<dyn Fn(&StrategyContext<'_>, &Value, &Value) -> ModelResult<Option<Template>>>;

/// Replacement initializer derivation: ordered statements populating the
/// instance beyond plain property assignment (collection elements, child
/// attachment, fix-up calls).
pub type InitializerHook =
    Rc<dyn Fn(&StrategyContext<'_>, &Value, &Value) -> ModelResult<Vec<Template>>>;

/// How "already equals the default" is decided for a type.
///
/// Reference reuse and value equality lead to different archives; each
/// strategy carries its policy explicitly rather than leaving the choice
/// to case-by-case comparison code.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum DiffPolicy {
    /// Adopt a non-null prototype of the same dynamic type and diff it
    /// property by property. The default for records.
    #[default]
    ReuseSameType,
    /// Suppress emission entirely when the value deep-equals the
    /// prototype. Used by scalar-like types.
    ByValue,
    /// Never adopt the prototype; always construct.
    Always,
}

/// How to rebuild instances of one type.
#[derive(Clone, Default)]
pub struct Strategy {
    /// Properties supplied as constructor arguments, in parameter order.
    pub ctor_args: Vec<Name>,
    /// Properties assigned after construction, in assignment order.
    pub properties: Vec<Name>,
    /// Optional replacement for the derived construction expression.
    pub construction: Option<ConstructionHook>,
    /// Optional replacement for the derived initializer list.
    pub initializers: Option<InitializerHook>,
    /// Default-equality policy.
    pub diff: DiffPolicy,
}

impl Strategy {
    /// Empty strategy with the default policy.
    pub fn new() -> Self {
        Strategy::default()
    }

    /// Derive the construction template for `new` against prototype `old`.
    ///
    /// `None` means "reuse what is already there": no construction
    /// statement is emitted and the prototype is adopted.
    pub fn construction(
        &self,
        cx: &StrategyContext<'_>,
        new: &Value,
        old: &Value,
    ) -> ModelResult<Option<Template>> {
        if let Some(hook) = &self.construction {
            return hook(cx, new, old);
        }
        match self.diff {
            DiffPolicy::ReuseSameType => {
                if !old.is_null() && cx.model.type_of(old) == cx.model.type_of(new) {
                    return Ok(None);
                }
            }
            DiffPolicy::ByValue => {
                if cx.model.deep_eq(new, old) {
                    return Ok(None);
                }
            }
            DiffPolicy::Always => {}
        }
        let ty = cx.model.type_of(new);
        let obj = match new.as_object() {
            Some(obj) => obj,
            None => {
                // Non-object values have no readable constructor
                // arguments; rebuild from the literal when possible.
                return match crate::builtin::literal_of(new) {
                    Some(lit) => Ok(Some(Template::Lit(lit))),
                    None => Err(replay_model::ModelError::NotAnObject {
                        kind: new.kind_name(),
                    }),
                };
            }
        };
        let mut args = Vec::with_capacity(self.ctor_args.len());
        for property in &self.ctor_args {
            args.push(Template::splice(cx.model.read(obj, *property)?));
        }
        Ok(Some(Template::construct(
            Template::splice(Value::Type(ty)),
            args,
        )))
    }

    /// Derive the initializer statements for `new` against prototype `old`.
    pub fn initializer_templates(
        &self,
        cx: &StrategyContext<'_>,
        new: &Value,
        old: &Value,
    ) -> ModelResult<Vec<Template>> {
        match &self.initializers {
            Some(hook) => hook(cx, new, old),
            None => Ok(Vec::new()),
        }
    }
}
