//! Strategy-supplied expression templates.
//!
//! A template is an expression shape with holes: [`Template::Splice`]
//! marks a position to be replaced by recursively generated code for a
//! live value. Keeping templates a separate type from `replay_ir::Node`
//! means a placeholder can never leak into replayable IR - the generator
//! must resolve every splice before anything is evaluated or rendered.

use replay_ir::{Literal, Name, Node, Op, Symbol};
use replay_model::Value;

/// An expression template with splice holes.
#[derive(Clone)]
pub enum Template {
    /// A literal node.
    Lit(Literal),
    /// A symbol node.
    Sym(Symbol),
    /// A hole: generate code for this live value and splice it in.
    Splice(Value),
    /// A compound form.
    Form(Box<Template>, Vec<Template>),
}

impl Template {
    /// Splice hole for a value.
    #[inline]
    pub fn splice(value: Value) -> Template {
        Template::Splice(value)
    }

    /// Name symbol.
    #[inline]
    pub fn name(name: Name) -> Template {
        Template::Sym(Symbol::Name(name))
    }

    /// Integer literal.
    #[inline]
    pub fn int(n: i64) -> Template {
        Template::Lit(Literal::Int(n))
    }

    /// String literal.
    #[inline]
    pub fn str(s: &str) -> Template {
        Template::Lit(Literal::Str(s.into()))
    }

    /// `(= target value)`
    pub fn assign(target: Template, value: Template) -> Template {
        Template::Form(
            Box::new(Template::Sym(Symbol::Op(Op::Assign))),
            vec![target, value],
        )
    }

    /// `(. receiver selector)`
    pub fn access(receiver: Template, selector: Template) -> Template {
        Template::Form(
            Box::new(Template::Sym(Symbol::Op(Op::Access))),
            vec![receiver, selector],
        )
    }

    /// `(. receiver (method args...))`
    pub fn call(receiver: Template, method: Name, args: Vec<Template>) -> Template {
        Template::access(
            receiver,
            Template::Form(Box::new(Template::name(method)), args),
        )
    }

    /// `(. receiver (new args...))`
    pub fn construct(receiver: Template, args: Vec<Template>) -> Template {
        Template::access(
            receiver,
            Template::Form(Box::new(Template::Sym(Symbol::Op(Op::New))), args),
        )
    }

    /// Lift a splice-free template into a node, if it has no holes.
    pub fn into_node(self) -> Option<Node> {
        match self {
            Template::Lit(lit) => Some(Node::Literal(lit)),
            Template::Sym(sym) => Some(Node::Symbol(sym)),
            Template::Splice(_) => None,
            Template::Form(head, args) => {
                let head = head.into_node()?;
                let args = args
                    .into_iter()
                    .map(Template::into_node)
                    .collect::<Option<Vec<_>>>()?;
                Some(Node::form(head, args))
            }
        }
    }
}
