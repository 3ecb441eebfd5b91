//! Registry-driven object model.
//!
//! `DynamicModel` is the bundled [`ObjectModel`] implementation: classes
//! are registered at startup (name, supertype, fields with defaults,
//! constructor overloads, methods as closures), instances live in an
//! internal arena and are addressed by [`ObjId`]. Constructor and method
//! resolution walks candidates in declaration order and accepts the first
//! overload whose arguments are assignable, with numeric widening from
//! int to float.
//!
//! Sequence types are synthesized on demand per component type; proxy
//! classes reconstruct from their handler value.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use replay_ir::{Name, SharedInterner};

use crate::{ModelError, ModelResult, ObjId, ObjectModel, TypeId, TypeShape, Value};

/// An instance method: receives the model, the receiver, and evaluated
/// arguments.
pub type MethodFn = Rc<dyn Fn(&DynamicModel, &Value, &[Value]) -> ModelResult<Value>>;

struct FieldDef {
    name: Name,
    default: Value,
}

struct ClassDef {
    name: String,
    supertype: Option<TypeId>,
    shape: TypeShape,
    /// Fields declared at exactly this class.
    fields: Vec<FieldDef>,
    /// Constructor overloads: ordered field names each overload fills.
    ctors: Vec<Vec<Name>>,
    methods: FxHashMap<Name, MethodFn>,
}

struct Instance {
    ty: TypeId,
    fields: FxHashMap<Name, Value>,
    elems: Vec<Value>,
    proxy: Option<(TypeId, Value)>,
}

/// Built-in type handles.
struct Builtins {
    meta: TypeId,
    int: TypeId,
    float: TypeId,
    bool_: TypeId,
    str_: TypeId,
    list: TypeId,
    null: TypeId,
}

/// The bundled registry-driven object model.
pub struct DynamicModel {
    interner: SharedInterner,
    classes: RefCell<Vec<ClassDef>>,
    by_name: RefCell<FxHashMap<String, TypeId>>,
    instances: RefCell<Vec<Instance>>,
    /// component type -> synthesized sequence type
    sequences: RefCell<FxHashMap<TypeId, TypeId>>,
    builtins: Builtins,
    named: Name,
}

impl DynamicModel {
    /// Create a model sharing the given interner.
    pub fn new(interner: SharedInterner) -> Self {
        let named = interner.intern("named");
        let model = DynamicModel {
            interner,
            classes: RefCell::new(Vec::new()),
            by_name: RefCell::new(FxHashMap::default()),
            instances: RefCell::new(Vec::new()),
            sequences: RefCell::new(FxHashMap::default()),
            builtins: Builtins {
                meta: TypeId::new(0),
                int: TypeId::new(1),
                float: TypeId::new(2),
                bool_: TypeId::new(3),
                str_: TypeId::new(4),
                list: TypeId::new(5),
                null: TypeId::new(6),
            },
            named,
        };
        for name in ["Type", "Int", "Float", "Bool", "Str", "List", "Null"] {
            model.register_class(name, None, TypeShape::Scalar);
        }
        model
    }

    /// The interner names in this model are drawn from.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    fn register_class(&self, name: &str, supertype: Option<TypeId>, shape: TypeShape) -> TypeId {
        let mut classes = self.classes.borrow_mut();
        let ty = TypeId::new(u32::try_from(classes.len()).unwrap_or(u32::MAX));
        classes.push(ClassDef {
            name: name.to_owned(),
            supertype,
            shape,
            fields: Vec::new(),
            ctors: Vec::new(),
            methods: FxHashMap::default(),
        });
        self.by_name.borrow_mut().insert(name.to_owned(), ty);
        ty
    }

    /// Register a record class with no supertype.
    pub fn define_class(&self, name: &str) -> TypeId {
        self.register_class(name, None, TypeShape::Record)
    }

    /// Register a record class extending `supertype`.
    pub fn define_subclass(&self, name: &str, supertype: TypeId) -> TypeId {
        self.register_class(name, Some(supertype), TypeShape::Record)
    }

    /// Register a proxy class; instances reconstruct from their handler.
    pub fn define_proxy_class(&self, name: &str) -> TypeId {
        self.register_class(name, None, TypeShape::Proxy)
    }

    /// Declare a field with its default value.
    pub fn add_field(&self, ty: TypeId, name: &str, default: Value) {
        let field = self.interner.intern(name);
        self.classes.borrow_mut()[ty.index()].fields.push(FieldDef {
            name: field,
            default,
        });
    }

    /// Declare a constructor overload filling the named fields in order.
    pub fn add_constructor(&self, ty: TypeId, fields: &[&str]) {
        let names = fields.iter().map(|f| self.interner.intern(f)).collect();
        self.classes.borrow_mut()[ty.index()].ctors.push(names);
    }

    /// Attach a method to a class.
    pub fn add_method(&self, ty: TypeId, name: &str, f: MethodFn) {
        let method = self.interner.intern(name);
        self.classes.borrow_mut()[ty.index()].methods.insert(method, f);
    }

    /// The synthesized sequence type for a component type.
    pub fn sequence_type(&self, component: TypeId) -> TypeId {
        if let Some(&ty) = self.sequences.borrow().get(&component) {
            return ty;
        }
        let name = format!("{}Array", self.type_name(component));
        let ty = self.register_class(&name, None, TypeShape::Sequence { component });
        self.sequences.borrow_mut().insert(component, ty);
        ty
    }

    /// Allocate a sequence instance with `len` null elements.
    pub fn new_sequence(&self, component: TypeId, len: usize) -> Value {
        let ty = self.sequence_type(component);
        self.alloc(Instance {
            ty,
            fields: FxHashMap::default(),
            elems: vec![Value::Null; len],
            proxy: None,
        })
    }

    /// Allocate a proxy instance around a handler value.
    pub fn new_proxy(&self, ty: TypeId, handler: Value) -> Value {
        self.alloc(Instance {
            ty,
            fields: FxHashMap::default(),
            elems: Vec::new(),
            proxy: Some((ty, handler)),
        })
    }

    fn alloc(&self, instance: Instance) -> Value {
        let mut instances = self.instances.borrow_mut();
        let id = ObjId::new(u32::try_from(instances.len()).unwrap_or(u32::MAX));
        instances.push(instance);
        Value::Object(id)
    }

    /// Field names and defaults along the supertype chain, ancestors first.
    fn chain_fields(&self, ty: TypeId) -> Vec<(Name, Value)> {
        let mut chain = Vec::new();
        let mut cursor = Some(ty);
        while let Some(t) = cursor {
            chain.push(t);
            cursor = self.classes.borrow()[t.index()].supertype;
        }
        let mut fields = Vec::new();
        for t in chain.into_iter().rev() {
            let classes = self.classes.borrow();
            for f in &classes[t.index()].fields {
                fields.push((f.name, f.default.clone()));
            }
        }
        fields
    }

    fn field_declared(&self, ty: TypeId, name: Name) -> bool {
        self.chain_fields(ty).iter().any(|(f, _)| *f == name)
    }

    /// Whether `arg` may fill a slot whose declared default is `slot`.
    ///
    /// Null matches any slot, an untyped (null-default) slot takes
    /// anything, and ints widen to float slots.
    fn assignable(&self, slot: &Value, arg: &Value) -> bool {
        match (slot, arg) {
            (_, Value::Null) | (Value::Null, _) => true,
            (Value::Int(_), Value::Int(_)) => true,
            (Value::Float(_), Value::Int(_) | Value::Float(_)) => true,
            (Value::Bool(_), Value::Bool(_)) => true,
            (Value::Str(_), Value::Str(_)) => true,
            (Value::List(_), Value::List(_)) => true,
            (Value::Type(_), Value::Type(_)) => true,
            (Value::Object(slot_obj), Value::Object(arg_obj)) => {
                let want = self.object_type(*slot_obj);
                let mut cursor = Some(self.object_type(*arg_obj));
                while let Some(t) = cursor {
                    if t == want {
                        return true;
                    }
                    cursor = self.classes.borrow()[t.index()].supertype;
                }
                false
            }
            _ => false,
        }
    }

    /// Widen an argument into a slot (int to float when needed).
    fn coerce(slot: &Value, arg: Value) -> Value {
        match (slot, &arg) {
            (Value::Float(_), Value::Int(n)) => {
                #[allow(clippy::cast_precision_loss)]
                let widened = *n as f64;
                Value::Float(widened)
            }
            _ => arg,
        }
    }

    fn object_type(&self, obj: ObjId) -> TypeId {
        self.instances.borrow()[obj.index()].ty
    }

    fn find_method(&self, ty: TypeId, method: Name) -> Option<MethodFn> {
        let mut cursor = Some(ty);
        while let Some(t) = cursor {
            let classes = self.classes.borrow();
            let class = &classes[t.index()];
            if let Some(f) = class.methods.get(&method) {
                return Some(Rc::clone(f));
            }
            cursor = class.supertype;
        }
        None
    }

    fn deep_eq_inner(&self, a: &Value, b: &Value, seen: &mut FxHashSet<(ObjId, ObjId)>) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Type(x), Value::Type(y)) => x == y,
            (Value::List(xs), Value::List(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(x, y)| self.deep_eq_inner(x, y, seen))
            }
            (Value::Object(x), Value::Object(y)) => {
                if x == y {
                    return true;
                }
                // A pair already under comparison is presumed equal; this
                // is what terminates cyclic graphs.
                if !seen.insert((*x, *y)) {
                    return true;
                }
                let (tx, ty_) = (self.object_type(*x), self.object_type(*y));
                if tx != ty_ {
                    return false;
                }
                match self.shape(tx) {
                    TypeShape::Sequence { .. } => {
                        let (xs, ys) = {
                            let instances = self.instances.borrow();
                            (
                                instances[x.index()].elems.clone(),
                                instances[y.index()].elems.clone(),
                            )
                        };
                        xs.len() == ys.len()
                            && xs
                                .iter()
                                .zip(ys.iter())
                                .all(|(ex, ey)| self.deep_eq_inner(ex, ey, seen))
                    }
                    TypeShape::Proxy => {
                        let (px, py) = {
                            let instances = self.instances.borrow();
                            (
                                instances[x.index()].proxy.clone(),
                                instances[y.index()].proxy.clone(),
                            )
                        };
                        match (px, py) {
                            (Some((ix, hx)), Some((iy, hy))) => {
                                ix == iy && self.deep_eq_inner(&hx, &hy, seen)
                            }
                            _ => false,
                        }
                    }
                    TypeShape::Record | TypeShape::Scalar => {
                        for (field, _) in self.chain_fields(tx) {
                            let (vx, vy) = {
                                let instances = self.instances.borrow();
                                (
                                    instances[x.index()].fields.get(&field).cloned(),
                                    instances[y.index()].fields.get(&field).cloned(),
                                )
                            };
                            let vx = vx.unwrap_or(Value::Null);
                            let vy = vy.unwrap_or(Value::Null);
                            if !self.deep_eq_inner(&vx, &vy, seen) {
                                return false;
                            }
                        }
                        true
                    }
                }
            }
            _ => false,
        }
    }
}

impl ObjectModel for DynamicModel {
    fn meta_type(&self) -> TypeId {
        self.builtins.meta
    }

    fn lookup_type(&self, name: &str) -> ModelResult<TypeId> {
        self.by_name
            .borrow()
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::unknown_type(name))
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.classes.borrow()[ty.index()].name.clone()
    }

    fn supertype(&self, ty: TypeId) -> Option<TypeId> {
        self.classes.borrow()[ty.index()].supertype
    }

    fn shape(&self, ty: TypeId) -> TypeShape {
        self.classes.borrow()[ty.index()].shape
    }

    fn type_of(&self, value: &Value) -> TypeId {
        match value {
            Value::Null => self.builtins.null,
            Value::Bool(_) => self.builtins.bool_,
            Value::Int(_) => self.builtins.int,
            Value::Float(_) => self.builtins.float,
            Value::Str(_) => self.builtins.str_,
            Value::List(_) => self.builtins.list,
            Value::Type(_) => self.builtins.meta,
            Value::Object(obj) => self.object_type(*obj),
        }
    }

    fn declared_properties(&self, ty: TypeId) -> Vec<Name> {
        self.classes.borrow()[ty.index()]
            .fields
            .iter()
            .map(|f| f.name)
            .collect()
    }

    fn read(&self, obj: ObjId, property: Name) -> ModelResult<Value> {
        let instances = self.instances.borrow();
        let instance = &instances[obj.index()];
        if let Some(v) = instance.fields.get(&property) {
            return Ok(v.clone());
        }
        Err(ModelError::no_such_property(
            &self.type_name(instance.ty),
            self.interner.lookup(property),
        ))
    }

    fn write(&self, obj: ObjId, property: Name, value: Value) -> ModelResult<()> {
        let ty = self.object_type(obj);
        if !self.field_declared(ty, property) {
            return Err(ModelError::no_such_property(
                &self.type_name(ty),
                self.interner.lookup(property),
            ));
        }
        self.instances.borrow_mut()[obj.index()]
            .fields
            .insert(property, value);
        Ok(())
    }

    fn read_index(&self, obj: ObjId, index: usize) -> ModelResult<Value> {
        let instances = self.instances.borrow();
        let elems = &instances[obj.index()].elems;
        elems
            .get(index)
            .cloned()
            .ok_or(ModelError::IndexOutOfBounds {
                index,
                len: elems.len(),
            })
    }

    fn write_index(&self, obj: ObjId, index: usize, value: Value) -> ModelResult<()> {
        let mut instances = self.instances.borrow_mut();
        let elems = &mut instances[obj.index()].elems;
        let len = elems.len();
        match elems.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ModelError::IndexOutOfBounds { index, len }),
        }
    }

    fn length(&self, obj: ObjId) -> ModelResult<usize> {
        Ok(self.instances.borrow()[obj.index()].elems.len())
    }

    fn invoke(&self, receiver: &Value, method: Name, args: &[Value]) -> ModelResult<Value> {
        match receiver {
            Value::Object(obj) => {
                let ty = self.object_type(*obj);
                match self.find_method(ty, method) {
                    Some(f) => f(self, receiver, args),
                    None => Err(ModelError::no_such_method(
                        &self.type_name(ty),
                        self.interner.lookup(method),
                    )),
                }
            }
            Value::Type(ty) => {
                // The meta type resolves other types by name.
                if *ty == self.builtins.meta && method == self.named {
                    if let [Value::Str(name)] = args {
                        return self.lookup_type(name).map(Value::Type);
                    }
                }
                match self.find_method(*ty, method) {
                    Some(f) => f(self, receiver, args),
                    None => Err(ModelError::no_such_method(
                        &self.type_name(*ty),
                        self.interner.lookup(method),
                    )),
                }
            }
            other => Err(ModelError::NotAnObject {
                kind: other.kind_name(),
            }),
        }
    }

    fn construct(&self, ty: TypeId, args: &[Value]) -> ModelResult<Value> {
        let shape = self.shape(ty);
        match shape {
            TypeShape::Sequence { .. } => {
                if let [Value::Int(len)] = args {
                    let len = usize::try_from(*len).map_err(|_| {
                        ModelError::no_matching_constructor(&self.type_name(ty), args.len())
                    })?;
                    let instance = Instance {
                        ty,
                        fields: FxHashMap::default(),
                        elems: vec![Value::Null; len],
                        proxy: None,
                    };
                    Ok(self.alloc(instance))
                } else {
                    Err(ModelError::no_matching_constructor(
                        &self.type_name(ty),
                        args.len(),
                    ))
                }
            }
            TypeShape::Proxy => {
                if let [handler] = args {
                    Ok(self.new_proxy(ty, handler.clone()))
                } else {
                    Err(ModelError::no_matching_constructor(
                        &self.type_name(ty),
                        args.len(),
                    ))
                }
            }
            TypeShape::Scalar => {
                // Builtin scalar types rebuild from their literal.
                match args {
                    [v] if self.type_of(v) == ty => Ok(v.clone()),
                    [Value::Int(n)] if ty == self.builtins.float => {
                        #[allow(clippy::cast_precision_loss)]
                        let widened = *n as f64;
                        Ok(Value::Float(widened))
                    }
                    _ => Err(ModelError::no_matching_constructor(
                        &self.type_name(ty),
                        args.len(),
                    )),
                }
            }
            TypeShape::Record => {
                let defaults = self.chain_fields(ty);
                if args.is_empty() {
                    let fields = defaults.into_iter().collect();
                    return Ok(self.alloc(Instance {
                        ty,
                        fields,
                        elems: Vec::new(),
                        proxy: None,
                    }));
                }
                let ctors = self.classes.borrow()[ty.index()].ctors.clone();
                // First declared overload whose slots accept the arguments.
                for ctor in &ctors {
                    if ctor.len() != args.len() {
                        continue;
                    }
                    let slots: Vec<Option<Value>> = ctor
                        .iter()
                        .map(|f| {
                            defaults
                                .iter()
                                .find(|(name, _)| name == f)
                                .map(|(_, d)| d.clone())
                        })
                        .collect();
                    let ok = slots.iter().zip(args).all(|(slot, arg)| match slot {
                        Some(default) => self.assignable(default, arg),
                        None => false,
                    });
                    if !ok {
                        continue;
                    }
                    let mut fields: FxHashMap<Name, Value> = defaults.into_iter().collect();
                    for ((field, slot), arg) in ctor.iter().zip(&slots).zip(args) {
                        let default = slot.clone().unwrap_or(Value::Null);
                        fields.insert(*field, Self::coerce(&default, arg.clone()));
                    }
                    return Ok(self.alloc(Instance {
                        ty,
                        fields,
                        elems: Vec::new(),
                        proxy: None,
                    }));
                }
                Err(ModelError::no_matching_constructor(
                    &self.type_name(ty),
                    args.len(),
                ))
            }
        }
    }

    fn proxy_parts(&self, obj: ObjId) -> ModelResult<(TypeId, Value)> {
        self.instances.borrow()[obj.index()]
            .proxy
            .clone()
            .ok_or(ModelError::NotAnObject { kind: "non-proxy" })
    }

    fn deep_eq(&self, a: &Value, b: &Value) -> bool {
        self.deep_eq_inner(a, b, &mut FxHashSet::default())
    }
}

#[cfg(test)]
mod tests;
