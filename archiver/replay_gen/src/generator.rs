//! The serializer core.
//!
//! `write_node` is the whole algorithm: diff against the prototype, short
//! circuit through the identity map, mint a name, ask the registry how to
//! construct and initialize, resolve template splices by recursion, walk
//! the declared properties, and fold everything into a `block` whose
//! trailing operand is the object's symbol.

use tracing::warn;

use replay_eval::{Environment, EvalResult, Evaluator};
use replay_ir::{simplify, Node, StringInterner};
use replay_meta::{Registry, StrategyContext, Template};
use replay_model::{ObjectModel, Value};

use crate::{GenError, GenerationSession, InstanceKey};

/// Serializes object graphs into expression trees.
///
/// Long-lived: one generator (model + frozen registry + interner) serves
/// many `generate` calls, each with its own discarded session.
pub struct ExpressionGenerator<'a> {
    model: &'a dyn ObjectModel,
    registry: &'a Registry,
    interner: &'a StringInterner,
}

impl<'a> ExpressionGenerator<'a> {
    /// Create a generator over a model and a frozen registry.
    pub fn new(
        model: &'a dyn ObjectModel,
        registry: &'a Registry,
        interner: &'a StringInterner,
    ) -> Self {
        ExpressionGenerator {
            model,
            registry,
            interner,
        }
    }

    /// Archive a root value into one simplified expression tree.
    pub fn generate(&self, root: &Value) -> Node {
        let mut session = GenerationSession::new(self.model, self.interner);
        self.generate_in(root, &mut session)
    }

    /// Archive into a caller-provided session.
    ///
    /// The session environment survives the call; renderers that need to
    /// resolve session bindings (and tests) read it afterwards.
    pub fn generate_in(&self, root: &Value, session: &mut GenerationSession) -> Node {
        let raw = self.write_root(root, session);
        simplify(&raw)
    }

    fn write_root(&self, root: &Value, session: &mut GenerationSession) -> Node {
        // A root already equal to a fresh default instance archives as a
        // bare symbol; the binding lives in the session environment.
        if let Value::Object(_) = root {
            let ty = self.model.type_of(root);
            if let Ok(fresh) = self.model.construct(ty, &[]) {
                if self.model.deep_eq(root, &fresh) {
                    let type_name = self.model.type_name(ty);
                    let name = session.mint(self.interner, ty, &type_name, false);
                    if let Some(key) = InstanceKey::of(root) {
                        session.record(key, name);
                    }
                    session.env_mut().define(name, fresh);
                    return Node::name(name);
                }
            }
        }
        self.write_node(session, root, None).unwrap_or_else(Node::null)
    }

    /// Emit the statement (or expression) reconstructing `value` at the
    /// position described by `ctx`. `None` means nothing needs emitting:
    /// replay already produces the right value there.
    ///
    /// Failures inside degrade per node: the error is logged and a bare
    /// reference to the minted symbol stands in, so siblings complete.
    fn write_node(
        &self,
        session: &mut GenerationSession,
        value: &Value,
        ctx: Option<&Node>,
    ) -> Option<Node> {
        match self.try_write_node(session, value, ctx) {
            Ok(node) => node,
            Err(e) => {
                warn!(
                    value = value.kind_name(),
                    error = %e,
                    "failed to archive node; substituting a bare reference"
                );
                InstanceKey::of(value)
                    .and_then(|key| session.identity(key))
                    .map(Node::name)
            }
        }
    }

    fn try_write_node(
        &self,
        session: &mut GenerationSession,
        value: &Value,
        ctx: Option<&Node>,
    ) -> Result<Option<Node>, GenError> {
        // The prototype: whatever already exists at this position in the
        // partially replayed world.
        let prototype = match ctx {
            Some(expr) => self.evaluate(session, expr)?,
            None => Value::Null,
        };

        match value {
            Value::Null => {
                if prototype.is_null() {
                    return Ok(None);
                }
                // Overwrite a non-null default with an explicit null.
                let Some(ctx) = ctx else { return Ok(None) };
                let statement = Node::assign(ctx.clone(), Node::null());
                self.evaluate(session, &statement)?;
                Ok(Some(statement))
            }
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => {
                self.write_scalar(session, value, &prototype, ctx)
            }
            Value::List(items) => {
                if self.model.deep_eq(value, &prototype) {
                    return Ok(None);
                }
                let elements = items
                    .iter()
                    .map(|item| {
                        self.write_node(session, item, None)
                            .unwrap_or_else(Node::null)
                    })
                    .collect();
                self.finish_value(session, Node::array(elements), ctx)
            }
            Value::Object(_) | Value::Type(_) => {
                self.write_instance(session, value, &prototype, ctx)
            }
        }
    }

    /// Scalars have value semantics: equal-to-prototype costs nothing,
    /// anything else is its literal.
    fn write_scalar(
        &self,
        session: &mut GenerationSession,
        value: &Value,
        prototype: &Value,
        ctx: Option<&Node>,
    ) -> Result<Option<Node>, GenError> {
        if self.model.deep_eq(value, prototype) {
            return Ok(None);
        }
        let literal = match value {
            Value::Bool(b) => Node::bool(*b),
            Value::Int(n) => Node::int(*n),
            Value::Float(x) => Node::float(*x),
            Value::Str(s) => Node::Literal(replay_ir::Literal::Str(s.clone())),
            _ => Node::null(),
        };
        self.finish_value(session, literal, ctx)
    }

    /// Wrap an expression into its context assignment (and evaluate the
    /// result so later prototypes see it), or return it bare.
    fn finish_value(
        &self,
        session: &mut GenerationSession,
        expr: Node,
        ctx: Option<&Node>,
    ) -> Result<Option<Node>, GenError> {
        match ctx {
            Some(target) => {
                let statement = Node::assign(target.clone(), expr);
                self.evaluate(session, &statement)?;
                Ok(Some(statement))
            }
            None => Ok(Some(expr)),
        }
    }

    fn write_instance(
        &self,
        session: &mut GenerationSession,
        value: &Value,
        prototype: &Value,
        ctx: Option<&Node>,
    ) -> Result<Option<Node>, GenError> {
        let key = match InstanceKey::of(value) {
            Some(key) => key,
            None => return Ok(None),
        };

        // Sharing and cycles: a node seen before resolves to its symbol.
        if let Some(name) = session.identity(key) {
            return match ctx {
                None => Ok(Some(Node::name(name))),
                Some(target) => {
                    let bound = session.environment().lookup(name).cloned();
                    // Identity match: replay already has this object here.
                    if bound.as_ref() == Some(prototype) {
                        return Ok(None);
                    }
                    let statement = Node::assign(target.clone(), Node::name(name));
                    self.evaluate(session, &statement)?;
                    Ok(Some(statement))
                }
            };
        }

        let ty = self.model.type_of(value);
        let type_name = self.model.type_name(ty);
        let bare = matches!(value, Value::Type(_));
        let name = session.mint(self.interner, ty, &type_name, bare);
        // Recorded before the construction template is resolved: any path
        // back to this object terminates at the name.
        session.record(key, name);

        let cx = StrategyContext {
            model: self.model,
            interner: self.interner,
        };

        let construction = self.registry.construction(&cx, value, prototype)?;
        let lead = match construction {
            Some(template) => {
                let ctor = self.resolve_template(session, &template);
                let instantiation = Node::assign(Node::name(name), ctor);
                let full = match ctx {
                    Some(target) => Node::assign(target.clone(), instantiation),
                    None => instantiation,
                };
                // Builds the replica and binds the symbol in one step.
                self.evaluate(session, &full)?;
                full
            }
            None => {
                // Adopt the prototype: bind the symbol to the existing
                // value and emit only the binding statement.
                session.env_mut().define(name, prototype.clone());
                match ctx {
                    Some(target) => Node::assign(Node::name(name), target.clone()),
                    None => Node::name(name),
                }
            }
        };

        let mut statements = Vec::new();
        for template in self.registry.initializers(&cx, value, prototype)? {
            let statement = self.resolve_template(session, &template);
            self.evaluate(session, &statement)?;
            statements.push(statement);
        }

        if let Value::Object(obj) = value {
            for property in self.registry.properties(&cx, ty) {
                match self.model.read(*obj, property) {
                    Ok(live) => {
                        let getter = Node::access(Node::name(name), Node::name(property));
                        if let Some(statement) =
                            self.write_node(session, &live, Some(&getter))
                        {
                            statements.push(statement);
                        }
                    }
                    Err(e) => {
                        // Degrade per property: siblings still archive.
                        warn!(
                            type_name = %type_name,
                            property = self.interner.lookup(property),
                            error = %e,
                            "failed to read property; continuing"
                        );
                    }
                }
            }
        }

        Ok(Some(make_block(name, lead, statements)))
    }

    /// Resolve every splice in a template by recursive generation.
    fn resolve_template(&self, session: &mut GenerationSession, template: &Template) -> Node {
        match template {
            Template::Lit(lit) => Node::Literal(lit.clone()),
            Template::Sym(sym) => Node::Symbol(*sym),
            Template::Splice(value) => self
                .write_node(session, value, None)
                .unwrap_or_else(Node::null),
            Template::Form(head, args) => Node::form(
                self.resolve_template(session, head),
                args.iter()
                    .map(|arg| self.resolve_template(session, arg))
                    .collect(),
            ),
        }
    }

    fn evaluate(&self, session: &mut GenerationSession, node: &Node) -> EvalResult {
        let evaluator = Evaluator::new(self.model, self.interner);
        evaluator.evaluate(node, session.env_mut())
    }

    /// The session environment a replay of `generate_in` output resolves
    /// bare references against.
    pub fn replay_environment(&self) -> Environment {
        Environment::with_prelude(self.model, self.interner)
    }
}

/// Fold a lead statement and its initializers into a block naming the
/// instance, or keep the bare lead when there is nothing else.
fn make_block(name: replay_ir::Name, lead: Node, statements: Vec<Node>) -> Node {
    if statements.is_empty() {
        return lead;
    }
    let mut all = Vec::with_capacity(statements.len() + 2);
    all.push(lead);
    all.extend(statements);
    all.push(Node::name(name));
    Node::block(all)
}
