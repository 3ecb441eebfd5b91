use pretty_assertions::assert_eq;

use replay_ir::SharedInterner;

use crate::{DynamicModel, ModelError, ObjectModel, TypeShape, Value};

fn point_model() -> (DynamicModel, crate::TypeId) {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let point = model.define_class("Point");
    model.add_field(point, "x", Value::Int(0));
    model.add_field(point, "y", Value::Int(0));
    model.add_constructor(point, &["x", "y"]);
    (model, point)
}

#[test]
fn test_default_construction_uses_field_defaults() {
    let (model, point) = point_model();
    let p = model.construct(point, &[]).unwrap();
    let obj = p.as_object().unwrap();
    let x = model.interner().intern("x");
    assert_eq!(model.read(obj, x).unwrap(), Value::Int(0));
}

#[test]
fn test_constructor_overload_fills_fields() {
    let (model, point) = point_model();
    let p = model
        .construct(point, &[Value::Int(3), Value::Int(4)])
        .unwrap();
    let obj = p.as_object().unwrap();
    let y = model.interner().intern("y");
    assert_eq!(model.read(obj, y).unwrap(), Value::Int(4));
}

#[test]
fn test_numeric_widening_in_overload_resolution() {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let scale = model.define_class("Scale");
    model.add_field(scale, "factor", Value::Float(1.0));
    model.add_constructor(scale, &["factor"]);
    // An int argument widens into the float slot.
    let s = model.construct(scale, &[Value::Int(2)]).unwrap();
    let factor = model.interner().intern("factor");
    assert_eq!(
        model.read(s.as_object().unwrap(), factor).unwrap(),
        Value::Float(2.0)
    );
}

#[test]
fn test_no_matching_constructor() {
    let (model, point) = point_model();
    let err = model
        .construct(point, &[Value::string("nope")])
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::no_matching_constructor("Point", 1)
    );
}

#[test]
fn test_unknown_property() {
    let (model, point) = point_model();
    let p = model.construct(point, &[]).unwrap();
    let bogus = model.interner().intern("bogus");
    assert!(model.read(p.as_object().unwrap(), bogus).is_err());
}

#[test]
fn test_inherited_fields() {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let base = model.define_class("Widget");
    model.add_field(base, "visible", Value::Bool(true));
    let button = model.define_subclass("Button", base);
    model.add_field(button, "label", Value::string(""));

    let b = model.construct(button, &[]).unwrap();
    let visible = model.interner().intern("visible");
    assert_eq!(
        model.read(b.as_object().unwrap(), visible).unwrap(),
        Value::Bool(true)
    );
    // declared_properties reports only the exact type's fields.
    assert_eq!(model.declared_properties(button).len(), 1);
}

#[test]
fn test_sequence_type_and_elements() {
    let (model, point) = point_model();
    let seq_ty = model.sequence_type(point);
    assert_eq!(model.type_name(seq_ty), "PointArray");
    assert!(matches!(model.shape(seq_ty), TypeShape::Sequence { .. }));

    let seq = model.construct(seq_ty, &[Value::Int(2)]).unwrap();
    let obj = seq.as_object().unwrap();
    assert_eq!(model.length(obj).unwrap(), 2);
    model.write_index(obj, 1, Value::Int(9)).unwrap();
    assert_eq!(model.read_index(obj, 1).unwrap(), Value::Int(9));
    assert!(model.read_index(obj, 5).is_err());
}

#[test]
fn test_meta_type_lookup_by_name() {
    let (model, point) = point_model();
    let named = model.interner().intern("named");
    let resolved = model
        .invoke(
            &Value::Type(model.meta_type()),
            named,
            &[Value::string("Point")],
        )
        .unwrap();
    assert_eq!(resolved, Value::Type(point));
}

#[test]
fn test_methods_dispatch_through_chain() {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let base = model.define_class("Counter");
    model.add_field(base, "count", Value::Int(0));
    model.add_method(
        base,
        "bump",
        std::rc::Rc::new(|model: &DynamicModel, receiver: &Value, _args: &[Value]| {
            let obj = receiver.as_object().ok_or(ModelError::NotAnObject {
                kind: "non-object",
            })?;
            let count = model.interner().intern("count");
            let current = match model.read(obj, count)? {
                Value::Int(n) => n,
                _ => 0,
            };
            model.write(obj, count, Value::Int(current + 1))?;
            Ok(Value::Null)
        }),
    );
    let derived = model.define_subclass("FancyCounter", base);

    let c = model.construct(derived, &[]).unwrap();
    let bump = model.interner().intern("bump");
    model.invoke(&c, bump, &[]).unwrap();
    model.invoke(&c, bump, &[]).unwrap();
    let count = model.interner().intern("count");
    assert_eq!(
        model.read(c.as_object().unwrap(), count).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn test_deep_eq_on_records_and_cycles() {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let node = model.define_class("Node");
    model.add_field(node, "next", Value::Null);
    model.add_field(node, "tag", Value::Int(0));

    let a = model.construct(node, &[]).unwrap();
    let b = model.construct(node, &[]).unwrap();
    assert!(model.deep_eq(&a, &b));

    // Self-cycles on both sides still terminate and compare equal.
    let next = model.interner().intern("next");
    model.write(a.as_object().unwrap(), next, a.clone()).unwrap();
    model.write(b.as_object().unwrap(), next, b.clone()).unwrap();
    assert!(model.deep_eq(&a, &b));

    let tag = model.interner().intern("tag");
    model
        .write(b.as_object().unwrap(), tag, Value::Int(1))
        .unwrap();
    assert!(!model.deep_eq(&a, &b));
}

#[test]
fn test_proxy_parts() {
    let interner = SharedInterner::new();
    let model = DynamicModel::new(interner);
    let proxy_ty = model.define_proxy_class("Remote");
    let p = model.construct(proxy_ty, &[Value::string("handler")]).unwrap();
    let (ty, handler) = model.proxy_parts(p.as_object().unwrap()).unwrap();
    assert_eq!(ty, proxy_ty);
    assert_eq!(handler, Value::string("handler"));
}
