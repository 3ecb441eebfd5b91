//! Synthesized strategies for built-in type categories.
//!
//! Sequences, scalars, proxies, and the meta type are structurally
//! irregular: their reconstruction does not follow the
//! read-properties/assign-properties pattern, so the registry synthesizes
//! their strategies on first request instead of deriving them from
//! declared properties.

use replay_ir::Literal;
use replay_model::{ModelError, ModelResult, Value};

use crate::{DiffPolicy, Strategy, StrategyContext, Template};

/// The literal a scalar value rebuilds from, if it is one.
pub(crate) fn literal_of(value: &Value) -> Option<Literal> {
    match value {
        Value::Null => Some(Literal::Null),
        Value::Bool(b) => Some(Literal::Bool(*b)),
        Value::Int(n) => Some(Literal::Int(*n)),
        Value::Float(x) => Some(Literal::Float(*x)),
        Value::Str(s) => Some(Literal::Str(s.clone())),
        _ => None,
    }
}

/// Scalar types rebuild from their literal; equal-by-value prototypes
/// cost nothing.
pub(crate) fn scalar_strategy() -> Strategy {
    let mut strategy = Strategy::new();
    strategy.diff = DiffPolicy::ByValue;
    strategy.construction = Some(std::rc::Rc::new(
        |cx: &StrategyContext<'_>, new: &Value, old: &Value| {
            if cx.model.deep_eq(new, old) {
                return Ok(None);
            }
            match literal_of(new) {
                Some(lit) => Ok(Some(Template::Lit(lit))),
                None => Err(ModelError::NotAnObject {
                    kind: new.kind_name(),
                }),
            }
        },
    ));
    strategy
}

/// Sequences construct with their length and populate element by element.
pub(crate) fn sequence_strategy() -> Strategy {
    let mut strategy = Strategy::new();
    strategy.diff = DiffPolicy::Always;
    strategy.construction = Some(std::rc::Rc::new(
        |cx: &StrategyContext<'_>, new: &Value, _old: &Value| {
            let obj = require_object(new)?;
            let len = cx.model.length(obj)?;
            let ty = cx.model.type_of(new);
            Ok(Some(Template::construct(
                Template::splice(Value::Type(ty)),
                vec![Template::int(i64::try_from(len).unwrap_or(i64::MAX))],
            )))
        },
    ));
    strategy.initializers = Some(std::rc::Rc::new(
        |cx: &StrategyContext<'_>, new: &Value, _old: &Value| {
            let obj = require_object(new)?;
            let len = cx.model.length(obj)?;
            let mut statements = Vec::with_capacity(len);
            for index in 0..len {
                let element = cx.model.read_index(obj, index)?;
                statements.push(Template::assign(
                    Template::access(
                        Template::splice(new.clone()),
                        Template::int(i64::try_from(index).unwrap_or(i64::MAX)),
                    ),
                    Template::splice(element),
                ));
            }
            Ok(statements)
        },
    ));
    strategy
}

/// Proxies reconstruct from their handler object.
pub(crate) fn proxy_strategy() -> Strategy {
    let mut strategy = Strategy::new();
    strategy.diff = DiffPolicy::ByValue;
    strategy.construction = Some(std::rc::Rc::new(
        |cx: &StrategyContext<'_>, new: &Value, old: &Value| {
            if cx.model.deep_eq(new, old) {
                return Ok(None);
            }
            let obj = require_object(new)?;
            let (proxy_ty, handler) = cx.model.proxy_parts(obj)?;
            Ok(Some(Template::construct(
                Template::splice(Value::Type(proxy_ty)),
                vec![Template::splice(handler)],
            )))
        },
    ));
    strategy
}

/// Type values reconstruct by name lookup through the meta type.
pub(crate) fn type_strategy() -> Strategy {
    let mut strategy = Strategy::new();
    strategy.diff = DiffPolicy::ByValue;
    strategy.construction = Some(std::rc::Rc::new(
        |cx: &StrategyContext<'_>, new: &Value, old: &Value| {
            if old == new {
                return Ok(None);
            }
            let ty = new.as_type().ok_or(ModelError::NotAnObject {
                kind: new.kind_name(),
            })?;
            let named = cx.interner.intern("named");
            Ok(Some(Template::call(
                Template::splice(Value::Type(cx.model.meta_type())),
                named,
                vec![Template::str(&cx.model.type_name(ty))],
            )))
        },
    ));
    strategy
}

fn require_object(value: &Value) -> ModelResult<replay_model::ObjId> {
    value.as_object().ok_or(ModelError::NotAnObject {
        kind: value.kind_name(),
    })
}
