//! Fixed-point tree simplification.
//!
//! Generated trees carry scaffolding the final archive does not need:
//! single-use temporary bindings, pure statements left behind when a
//! property turned out to equal its default, and blocks reduced to their
//! trailing operand. `simplify` rewrites until a full pass makes no
//! change. Each pass is non-increasing in tree size, so the process
//! terminates.
//!
//! Three rules per pass:
//!
//! 1. A statement-position binding `(= name value)` whose name is used
//!    exactly once elsewhere is removed and its value substituted at the
//!    use site. A binding whose name is never used is unwrapped to its
//!    value in place (any position).
//! 2. A non-trailing block statement with no externally visible effect
//!    (a literal, a name, a property read) is dropped.
//! 3. A block left with only its trailing statement collapses to it.
//!
//! The trailing operand of a block names the value the block represents;
//! that reference is counted twice so rule 1 never dissolves the binding
//! a block's result depends on.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Form, Name, Node, Op, Symbol};

/// Simplify a tree to its fixed point.
pub fn simplify(node: &Node) -> Node {
    let mut current = node.clone();
    loop {
        let mut counts = FxHashMap::default();
        count_references(&current, &mut counts);

        let mut inlinable = FxHashMap::default();
        collect_inlinable(&current, &counts, &mut inlinable);

        let mut active = FxHashSet::default();
        let next = rewrite(&current, &counts, &inlinable, &mut active);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Count value-position occurrences of every name.
///
/// Binding targets, property/method selector names, and quoted operands
/// are not value references. The trailing operand of a block counts
/// double (see module docs).
fn count_references(node: &Node, counts: &mut FxHashMap<Name, usize>) {
    match node {
        Node::Literal(_) | Node::Symbol(Symbol::Op(_)) => {}
        Node::Symbol(Symbol::Name(n)) => {
            *counts.entry(*n).or_insert(0) += 1;
        }
        Node::Form(form) => count_form(form, counts),
    }
}

fn count_form(form: &Form, counts: &mut FxHashMap<Name, usize>) {
    match form.head {
        Node::Symbol(Symbol::Op(Op::Assign)) if form.args.len() == 2 => {
            // The target name is a binding position, not a use.
            if form.args[0].as_name().is_none() {
                count_references(&form.args[0], counts);
            }
            count_references(&form.args[1], counts);
        }
        Node::Symbol(Symbol::Op(Op::Access)) if form.args.len() == 2 => {
            count_references(&form.args[0], counts);
            count_selector(&form.args[1], counts);
        }
        Node::Symbol(Symbol::Op(Op::Quote)) => {}
        Node::Symbol(Symbol::Op(Op::Block)) => {
            let n = form.args.len();
            for (i, arg) in form.args.iter().enumerate() {
                if i + 1 == n {
                    if let Some(name) = arg.as_name() {
                        *counts.entry(name).or_insert(0) += 2;
                    } else {
                        count_references(arg, counts);
                    }
                } else {
                    count_references(arg, counts);
                }
            }
        }
        _ => {
            // Name heads (method selectors reached outside an access) are
            // not value references; anything else is.
            if form.head.as_name().is_none() {
                count_references(&form.head, counts);
            }
            for arg in &form.args {
                count_references(arg, counts);
            }
        }
    }
}

fn count_selector(selector: &Node, counts: &mut FxHashMap<Name, usize>) {
    match selector {
        // Property name or index: not a value reference.
        Node::Symbol(_) | Node::Literal(_) => {}
        Node::Form(call) => {
            // Method-call selector: the head is the method name.
            for arg in &call.args {
                count_references(arg, counts);
            }
        }
    }
}

/// Collect statement-position bindings eligible for inlining.
fn collect_inlinable(
    node: &Node,
    counts: &FxHashMap<Name, usize>,
    out: &mut FxHashMap<Name, Node>,
) {
    if let Node::Form(form) = node {
        if form.head == Node::Symbol(Symbol::Op(Op::Block)) {
            let n = form.args.len();
            for (i, stmt) in form.args.iter().enumerate() {
                if i + 1 < n {
                    if let Some((name, value)) = assign_parts(stmt) {
                        if counts.get(&name).copied().unwrap_or(0) == 1 {
                            out.insert(name, value.clone());
                        }
                    }
                }
            }
        }
        for arg in &form.args {
            collect_inlinable(arg, counts, out);
        }
        collect_inlinable(&form.head, counts, out);
    }
}

/// `(= name value)` decomposition for plain-name targets.
fn assign_parts(node: &Node) -> Option<(Name, &Node)> {
    let form = node.as_form()?;
    if form.head == Node::Symbol(Symbol::Op(Op::Assign)) && form.args.len() == 2 {
        Some((form.args[0].as_name()?, &form.args[1]))
    } else {
        None
    }
}

fn rewrite(
    node: &Node,
    counts: &FxHashMap<Name, usize>,
    inlinable: &FxHashMap<Name, Node>,
    active: &mut FxHashSet<Name>,
) -> Node {
    match node {
        Node::Literal(_) | Node::Symbol(Symbol::Op(_)) => node.clone(),
        Node::Symbol(Symbol::Name(n)) => {
            if let Some(value) = inlinable.get(n) {
                // Substitute the binding's value at its single use site.
                // The active set stops pathological mutually-referential
                // bindings from expanding forever.
                if active.insert(*n) {
                    let result = rewrite(value, counts, inlinable, active);
                    active.remove(n);
                    return result;
                }
            }
            node.clone()
        }
        Node::Form(form) => rewrite_form(form, counts, inlinable, active),
    }
}

fn rewrite_form(
    form: &Form,
    counts: &FxHashMap<Name, usize>,
    inlinable: &FxHashMap<Name, Node>,
    active: &mut FxHashSet<Name>,
) -> Node {
    match form.head {
        Node::Symbol(Symbol::Op(Op::Assign)) if form.args.len() == 2 => {
            if let Some(name) = form.args[0].as_name() {
                // Dead binding: nothing references the name, keep only the
                // value (which may still have effects).
                if counts.get(&name).copied().unwrap_or(0) == 0 {
                    return rewrite(&form.args[1], counts, inlinable, active);
                }
                let value = rewrite(&form.args[1], counts, inlinable, active);
                return Node::assign(form.args[0].clone(), value);
            }
            // Property or indexed write target.
            let target = rewrite(&form.args[0], counts, inlinable, active);
            let value = rewrite(&form.args[1], counts, inlinable, active);
            Node::assign(target, value)
        }
        Node::Symbol(Symbol::Op(Op::Access)) if form.args.len() == 2 => {
            let receiver = rewrite(&form.args[0], counts, inlinable, active);
            let selector = rewrite_selector(&form.args[1], counts, inlinable, active);
            Node::access(receiver, selector)
        }
        Node::Symbol(Symbol::Op(Op::Quote)) => Node::Form(std::rc::Rc::new(form.clone())),
        Node::Symbol(Symbol::Op(Op::Block)) => {
            let n = form.args.len();
            let mut stmts = Vec::with_capacity(n);
            for (i, stmt) in form.args.iter().enumerate() {
                if i + 1 < n {
                    // Bindings relocated by rule 1 vanish from statement
                    // position.
                    if let Some((name, _)) = assign_parts(stmt) {
                        if inlinable.contains_key(&name) {
                            continue;
                        }
                    }
                    let rewritten = rewrite(stmt, counts, inlinable, active);
                    if is_pure(&rewritten) {
                        continue;
                    }
                    stmts.push(rewritten);
                } else {
                    stmts.push(rewrite(stmt, counts, inlinable, active));
                }
            }
            if stmts.len() == 1 {
                stmts.remove(0)
            } else {
                Node::block(stmts)
            }
        }
        _ => {
            let head = if form.head.as_name().is_some() {
                form.head.clone()
            } else {
                rewrite(&form.head, counts, inlinable, active)
            };
            let args = form
                .args
                .iter()
                .map(|a| rewrite(a, counts, inlinable, active))
                .collect();
            Node::form(head, args)
        }
    }
}

fn rewrite_selector(
    selector: &Node,
    counts: &FxHashMap<Name, usize>,
    inlinable: &FxHashMap<Name, Node>,
    active: &mut FxHashSet<Name>,
) -> Node {
    match selector {
        // Property names and indices pass through untouched.
        Node::Symbol(_) | Node::Literal(_) => selector.clone(),
        Node::Form(call) => {
            let args = call
                .args
                .iter()
                .map(|a| rewrite(a, counts, inlinable, active))
                .collect();
            Node::form(call.head.clone(), args)
        }
    }
}

/// Whether a statement has no externally visible effect.
///
/// Invocations (access with a compound selector) and writes are effects;
/// property reads, literals, names, quotes, and arrays of pure items are
/// not. Blocks are conservatively treated as effectful.
fn is_pure(node: &Node) -> bool {
    match node {
        Node::Literal(_) | Node::Symbol(_) => true,
        Node::Form(form) => match form.head {
            Node::Symbol(Symbol::Op(Op::Quote)) => true,
            Node::Symbol(Symbol::Op(Op::Array)) => form.args.iter().all(is_pure),
            Node::Symbol(Symbol::Op(Op::Access)) if form.args.len() == 2 => {
                matches!(form.args[1], Node::Symbol(_) | Node::Literal(_))
                    && is_pure(&form.args[0])
            }
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests;
