use pretty_assertions::assert_eq;

use replay_ir::SharedInterner;
use replay_model::{DynamicModel, ObjectModel, Value};

use crate::{DiffPolicy, Registry, Strategy, StrategyContext, Template};

fn widget_model() -> (DynamicModel, replay_model::TypeId, replay_model::TypeId) {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let widget = model.define_class("Widget");
    model.add_field(widget, "visible", Value::Bool(true));
    model.add_field(widget, "label", Value::string(""));
    let tabs = model.define_subclass("Tabs", widget);
    model.add_field(tabs, "items", Value::Null);
    model.add_field(tabs, "selectedIndex", Value::Int(0));
    (model, widget, tabs)
}

#[test]
fn test_default_derivation_uses_declared_properties() {
    let (model, _, tabs) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let registry = Registry::empty();
    let strategy = registry.strategy_for(&cx, tabs);
    let names: Vec<&str> = strategy
        .properties
        .iter()
        .map(|p| interner.lookup(*p))
        .collect();
    assert_eq!(names, vec!["items", "selectedIndex"]);
}

#[test]
fn test_chain_properties_are_ancestors_first() {
    let (model, _, tabs) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let registry = Registry::empty();
    let names: Vec<&str> = registry
        .properties(&cx, tabs)
        .iter()
        .map(|p| interner.lookup(*p))
        .collect();
    assert_eq!(names, vec!["visible", "label", "items", "selectedIndex"]);
}

#[test]
fn test_remove_then_add_moves_property_to_back() {
    let (model, _, tabs) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let selected = interner.intern("selectedIndex");
    let items = interner.intern("items");

    // Force items to be assigned after selectedIndex... and then decide
    // better and push selectedIndex to the back instead.
    let mut builder = Registry::builder();
    builder.remove_property(tabs, selected);
    builder.add_property(tabs, selected);
    let registry = builder.freeze();

    let names: Vec<_> = registry.strategy_for(&cx, tabs).properties.clone();
    assert_eq!(names, vec![items, selected]);
}

#[test]
fn test_constructor_args_leave_remaining_properties() {
    let (model, widget, _) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let label = interner.intern("label");
    let visible = interner.intern("visible");

    let mut builder = Registry::builder();
    builder.constructor_args(widget, vec![label]);
    let registry = builder.freeze();

    let strategy = registry.strategy_for(&cx, widget);
    assert_eq!(strategy.ctor_args, vec![label]);
    assert_eq!(strategy.properties, vec![visible]);
}

#[test]
fn test_construction_reuses_same_type_prototype() {
    let (model, widget, _) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let registry = Registry::empty();

    let new = model.construct(widget, &[]).unwrap();
    let old = model.construct(widget, &[]).unwrap();
    // Same dynamic type: the prototype is adopted, nothing constructed.
    assert!(registry.construction(&cx, &new, &old).unwrap().is_none());
    // Null prototype: a construction template is produced.
    assert!(registry
        .construction(&cx, &new, &Value::Null)
        .unwrap()
        .is_some());
}

#[test]
fn test_always_policy_never_reuses() {
    let (model, widget, _) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let mut builder = Registry::builder();
    builder.diff_policy(widget, DiffPolicy::Always);
    let registry = builder.freeze();

    let new = model.construct(widget, &[]).unwrap();
    let old = model.construct(widget, &[]).unwrap();
    assert!(registry.construction(&cx, &new, &old).unwrap().is_some());
}

#[test]
fn test_initializer_hooks_accumulate_along_chain() {
    let (model, widget, tabs) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let mut builder = Registry::builder();
    builder.initializer_hook(
        widget,
        std::rc::Rc::new(|_cx: &StrategyContext<'_>, _new: &Value, _old: &Value| {
            Ok(vec![Template::int(1)])
        }),
    );
    builder.initializer_hook(
        tabs,
        std::rc::Rc::new(|_cx: &StrategyContext<'_>, _new: &Value, _old: &Value| {
            Ok(vec![Template::int(2)])
        }),
    );
    let registry = builder.freeze();

    let instance = model.construct(tabs, &[]).unwrap();
    let templates = registry
        .initializers(&cx, &instance, &Value::Null)
        .unwrap();
    // Ancestor hook first, most-derived last.
    assert_eq!(templates.len(), 2);
    assert!(matches!(
        templates[0],
        Template::Lit(replay_ir::Literal::Int(1))
    ));
    assert!(matches!(
        templates[1],
        Template::Lit(replay_ir::Literal::Int(2))
    ));
}

#[test]
fn test_full_strategy_replacement() {
    let (model, widget, _) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let mut custom = Strategy::new();
    custom.properties = vec![interner.intern("visible")];
    let mut builder = Registry::builder();
    builder.register(widget, custom);
    let registry = builder.freeze();

    assert_eq!(registry.strategy_for(&cx, widget).properties.len(), 1);
}

#[test]
fn test_meta_type_gets_type_strategy() {
    let (model, widget, _) = widget_model();
    let interner = model.interner().clone();
    let cx = StrategyContext {
        model: &model,
        interner: &interner,
    };
    let registry = Registry::empty();

    // A repeated type value costs nothing; a fresh one reconstructs by name.
    let value = Value::Type(widget);
    assert!(registry
        .construction(&cx, &value, &value.clone())
        .unwrap()
        .is_none());
    let template = registry
        .construction(&cx, &value, &Value::Null)
        .unwrap();
    assert!(template.is_some());
}
