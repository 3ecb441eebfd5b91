//! Replay Fmt - the script renderer.
//!
//! Renders an IR tree into the archive-script surface syntax:
//!
//! ```text
//! { Point0 = Point.new(3, 4); Pair0 = Pair.new(); Pair0.left = Point0; Pair0 }
//! ```
//!
//! The renderer is purely syntactic - it never consults an environment
//! and never alters IR semantics. `replay_parse` reads the same surface
//! back into identical node shapes.

use std::fmt::Write as _;

use replay_ir::{Form, Node, Op, StringInterner, Symbol};

/// Operator precedence levels, loosest first.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Assign,
    Postfix,
    Primary,
}

/// Render a node as archive-script text.
pub fn render(node: &Node, interner: &StringInterner) -> String {
    let mut out = String::new();
    write_node(&mut out, node, interner, Prec::Assign);
    out
}

fn write_node(out: &mut String, node: &Node, interner: &StringInterner, min: Prec) {
    match node {
        Node::Literal(lit) => {
            let _ = write!(out, "{lit}");
        }
        Node::Symbol(Symbol::Name(name)) => out.push_str(interner.lookup(*name)),
        // A bare operator has no surface form; render its spelling so a
        // malformed tree is at least visible.
        Node::Symbol(Symbol::Op(op)) => out.push_str(op.spelling()),
        Node::Form(form) => write_form(out, form, interner, min),
    }
}

fn write_form(out: &mut String, form: &Form, interner: &StringInterner, min: Prec) {
    match form.head {
        Node::Symbol(Symbol::Op(Op::Assign)) if form.args.len() == 2 => {
            let parens = min > Prec::Assign;
            if parens {
                out.push('(');
            }
            write_node(out, &form.args[0], interner, Prec::Postfix);
            out.push_str(" = ");
            // Right-associative: a chained assignment needs no parens.
            write_node(out, &form.args[1], interner, Prec::Assign);
            if parens {
                out.push(')');
            }
        }
        Node::Symbol(Symbol::Op(Op::Access)) if form.args.len() == 2 => {
            write_node(out, &form.args[0], interner, Prec::Postfix);
            write_selector(out, &form.args[1], interner);
        }
        Node::Symbol(Symbol::Op(Op::Block)) => {
            out.push_str("{ ");
            for (i, stmt) in form.args.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                write_node(out, stmt, interner, Prec::Assign);
            }
            out.push_str(" }");
        }
        Node::Symbol(Symbol::Op(Op::Array)) => {
            out.push('[');
            for (i, item) in form.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_node(out, item, interner, Prec::Assign);
            }
            out.push(']');
        }
        Node::Symbol(Symbol::Op(Op::Quote)) if form.args.len() == 1 => {
            // Strings are literals at the type level; a quote renders as
            // its operand.
            write_node(out, &form.args[0], interner, Prec::Primary);
        }
        _ => {
            // Selector forms reached directly (malformed trees): render
            // call-style.
            write_node(out, &form.head, interner, Prec::Primary);
            write_args(out, &form.args, interner);
        }
    }
}

fn write_selector(out: &mut String, selector: &Node, interner: &StringInterner) {
    match selector {
        Node::Symbol(Symbol::Name(name)) => {
            out.push('.');
            out.push_str(interner.lookup(*name));
        }
        // A bare operator selector has no surface form; render its
        // spelling so a malformed tree is at least visible.
        Node::Symbol(Symbol::Op(op)) => {
            out.push('.');
            out.push_str(op.spelling());
        }
        Node::Literal(lit) => {
            out.push('[');
            let _ = write!(out, "{lit}");
            out.push(']');
        }
        Node::Form(call) => {
            out.push('.');
            match call.head {
                Node::Symbol(Symbol::Op(Op::New)) => out.push_str("new"),
                _ => write_node(out, &call.head, interner, Prec::Primary),
            }
            write_args(out, &call.args, interner);
        }
    }
}

fn write_args(out: &mut String, args: &[Node], interner: &StringInterner) {
    out.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_node(out, arg, interner, Prec::Assign);
    }
    out.push(')');
}
