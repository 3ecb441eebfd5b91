//! S-expression rendering of nodes for diagnostics and tests.
//!
//! This is the debugging surface, not the archive surface; the script
//! renderer lives in `replay_fmt`.

use std::fmt;

use crate::{Node, StringInterner, Symbol};

/// Adapter displaying a [`Node`] with names resolved through an interner.
pub struct NodeDisplay<'a> {
    node: &'a Node,
    interner: &'a StringInterner,
}

impl Node {
    /// Display this node as an s-expression, resolving names through
    /// `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> NodeDisplay<'a> {
        NodeDisplay {
            node: self,
            interner,
        }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write(self.node, self.interner, f)
    }
}

fn write(node: &Node, interner: &StringInterner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match node {
        Node::Literal(lit) => write!(f, "{lit}"),
        Node::Symbol(Symbol::Op(op)) => write!(f, "{}", op.spelling()),
        Node::Symbol(Symbol::Name(n)) => write!(f, "{}", interner.lookup(*n)),
        Node::Form(form) => {
            write!(f, "(")?;
            write(&form.head, interner, f)?;
            for arg in &form.args {
                write!(f, " ")?;
                write(arg, interner, f)?;
            }
            write!(f, ")")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Node, StringInterner};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sexpr_rendering() {
        let interner = StringInterner::new();
        let obj = interner.intern("Point0");
        let x = interner.intern("x");
        let node = Node::assign(Node::access(Node::name(obj), Node::name(x)), Node::int(3));
        assert_eq!(node.display(&interner).to_string(), "(= (. Point0 x) 3)");
    }
}
