//! The evaluator proper.
//!
//! Dispatch is an exhaustive match over the closed [`Op`] enum. Each
//! operator independently decides which of its unevaluated operands to
//! evaluate: `=` never evaluates a plain-name target as a value lookup,
//! `.` never evaluates a selector, `block` evaluates every operand in
//! order and keeps only the last.

use tracing::trace;

use replay_ir::{Form, Literal, Node, Op, StringInterner, Symbol};
use replay_model::{ModelError, ObjectModel, Value};

use crate::{Environment, EvalError, EvalResult};

/// Evaluates nodes against a namespace, reflecting through an object model.
pub struct Evaluator<'a> {
    model: &'a dyn ObjectModel,
    interner: &'a StringInterner,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over the given model and interner.
    pub fn new(model: &'a dyn ObjectModel, interner: &'a StringInterner) -> Self {
        Evaluator { model, interner }
    }

    /// Evaluate a node.
    pub fn evaluate(&self, node: &Node, env: &mut Environment) -> EvalResult {
        match node {
            Node::Literal(lit) => Ok(literal_value(lit)),
            Node::Symbol(Symbol::Name(name)) => env
                .lookup(*name)
                .cloned()
                .ok_or_else(|| EvalError::unbound(self.interner.lookup(*name))),
            Node::Symbol(Symbol::Op(op)) => Err(EvalError::malformed(
                op.spelling(),
                "operator outside form head position",
            )),
            Node::Form(form) => self.eval_form(form, env),
        }
    }

    fn eval_form(&self, form: &Form, env: &mut Environment) -> EvalResult {
        match form.head {
            Node::Symbol(Symbol::Op(op)) => {
                trace!(operator = op.spelling(), "evaluating form");
                match op {
                    Op::Quote => self.eval_quote(form),
                    Op::Access => self.eval_access(form, env),
                    Op::Assign => self.eval_assign(form, env),
                    Op::Block => self.eval_block(form, env),
                    Op::Array => self.eval_array(form, env),
                    Op::New => Err(EvalError::malformed(
                        "new",
                        "constructor selector outside an access form",
                    )),
                }
            }
            _ => {
                // The head evaluates first; whatever value it yields, no
                // value is invocable outside the operator vocabulary.
                let head = self.evaluate(&form.head, env)?;
                Err(EvalError::no_matching_operation(&head))
            }
        }
    }

    /// `quote` returns its single literal operand verbatim.
    fn eval_quote(&self, form: &Form) -> EvalResult {
        match form.args.as_slice() {
            [Node::Literal(lit)] => Ok(literal_value(lit)),
            _ => Err(EvalError::malformed("quote", "expects one literal operand")),
        }
    }

    /// `.` - property read, indexed read, invocation, or construction.
    fn eval_access(&self, form: &Form, env: &mut Environment) -> EvalResult {
        let [receiver_node, selector] = form.args.as_slice() else {
            return Err(EvalError::malformed(".", "expects receiver and selector"));
        };
        let receiver = self.evaluate(receiver_node, env)?;
        match selector {
            // Plain name: a property read.
            Node::Symbol(Symbol::Name(property)) => match receiver {
                Value::Object(obj) => Ok(self.model.read(obj, *property)?),
                other => Err(EvalError::Model(ModelError::NotAnObject {
                    kind: other.kind_name(),
                })),
            },
            // Integer literal: an indexed read.
            Node::Literal(Literal::Int(index)) => {
                let index = to_index(*index)?;
                match receiver {
                    Value::Object(obj) => Ok(self.model.read_index(obj, index)?),
                    Value::List(items) => {
                        items
                            .get(index)
                            .cloned()
                            .ok_or(EvalError::Model(ModelError::IndexOutOfBounds {
                                index,
                                len: items.len(),
                            }))
                    }
                    other => Err(EvalError::Model(ModelError::NotAnObject {
                        kind: other.kind_name(),
                    })),
                }
            }
            // Compound selector: an invocation or a construction.
            Node::Form(call) => {
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.evaluate(arg, env)?);
                }
                match call.head {
                    Node::Symbol(Symbol::Op(Op::New)) => match receiver {
                        Value::Type(ty) => Ok(self.model.construct(ty, &args)?),
                        other => Err(EvalError::malformed(
                            "new",
                            format!("receiver is {}, not a type", other.kind_name()),
                        )),
                    },
                    Node::Symbol(Symbol::Name(method)) => {
                        Ok(self.model.invoke(&receiver, method, &args)?)
                    }
                    _ => Err(EvalError::malformed(".", "selector head must be a name")),
                }
            }
            _ => Err(EvalError::malformed(".", "selector must be a name, index, or call")),
        }
    }

    /// `=` - name binding or property/indexed write. Returns the value.
    fn eval_assign(&self, form: &Form, env: &mut Environment) -> EvalResult {
        let [target, value_node] = form.args.as_slice() else {
            return Err(EvalError::malformed("=", "expects target and value"));
        };
        let value = self.evaluate(value_node, env)?;
        match target {
            Node::Symbol(Symbol::Name(name)) => {
                env.define(*name, value.clone());
                Ok(value)
            }
            Node::Form(access) if access.head == Node::Symbol(Symbol::Op(Op::Access)) => {
                let [receiver_node, selector] = access.args.as_slice() else {
                    return Err(EvalError::malformed("=", "malformed access target"));
                };
                let receiver = self.evaluate(receiver_node, env)?;
                let obj = receiver.as_object().ok_or(EvalError::Model(
                    ModelError::NotAnObject {
                        kind: receiver.kind_name(),
                    },
                ))?;
                match selector {
                    Node::Symbol(Symbol::Name(property)) => {
                        self.model.write(obj, *property, value.clone())?;
                        Ok(value)
                    }
                    Node::Literal(Literal::Int(index)) => {
                        self.model.write_index(obj, to_index(*index)?, value.clone())?;
                        Ok(value)
                    }
                    _ => Err(EvalError::malformed("=", "unwritable access target")),
                }
            }
            _ => Err(EvalError::malformed("=", "target must be a name or access")),
        }
    }

    /// `block` - evaluate every operand in order, return the last.
    fn eval_block(&self, form: &Form, env: &mut Environment) -> EvalResult {
        let Some((last, rest)) = form.args.split_last() else {
            return Err(EvalError::malformed("block", "expects at least one operand"));
        };
        for stmt in rest {
            self.evaluate(stmt, env)?;
        }
        self.evaluate(last, env)
    }

    /// `array` - evaluate every operand into an ordered list value.
    fn eval_array(&self, form: &Form, env: &mut Environment) -> EvalResult {
        let mut items = Vec::with_capacity(form.args.len());
        for arg in &form.args {
            items.push(self.evaluate(arg, env)?);
        }
        Ok(Value::list(items))
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(n) => Value::Int(*n),
        Literal::Float(x) => Value::Float(*x),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

fn to_index(raw: i64) -> Result<usize, EvalError> {
    usize::try_from(raw)
        .map_err(|_| EvalError::malformed(".", format!("negative index {raw}")))
}
