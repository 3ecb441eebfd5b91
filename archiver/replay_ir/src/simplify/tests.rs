use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::{simplify, Name, Node};

fn n(i: u32) -> Name {
    Name::from_raw(i)
}

// Names used across the tests: 0 = obj, 1 = t, 2 = obj2, 3 = foo,
// 4 = A0, 5 = C0, 6 = left, 7 = right, 8 = ctx, 9 = Int0.

#[test]
fn test_single_use_binding_is_inlined() {
    // block[ (= t (. obj foo)), (= obj2 t), obj2 ]
    let tree = Node::block(vec![
        Node::assign(
            Node::name(n(1)),
            Node::access(Node::name(n(0)), Node::name(n(3))),
        ),
        Node::assign(Node::name(n(2)), Node::name(n(1))),
        Node::name(n(2)),
    ]);
    // => block[ (= obj2 (. obj foo)), obj2 ]
    let expected = Node::block(vec![
        Node::assign(
            Node::name(n(2)),
            Node::access(Node::name(n(0)), Node::name(n(3))),
        ),
        Node::name(n(2)),
    ]);
    assert_eq!(simplify(&tree), expected);
}

#[test]
fn test_shared_binding_is_preserved() {
    // Two sibling property writes referencing the same bound name: the
    // nested construction must not be duplicated into both sites.
    let ctor = Node::construct(Node::name(n(0)), vec![]);
    let tree = Node::block(vec![
        Node::assign(
            Node::access(Node::name(n(4)), Node::name(n(6))),
            Node::assign(Node::name(n(5)), ctor.clone()),
        ),
        Node::assign(
            Node::access(Node::name(n(4)), Node::name(n(7))),
            Node::name(n(5)),
        ),
        Node::name(n(4)),
    ]);
    let simplified = simplify(&tree);
    // The C0 binding survives and the second write still references it.
    let form = simplified.as_form().unwrap();
    assert_eq!(form.args.len(), 3);
    let second = form.args[1].as_form().unwrap();
    assert_eq!(second.args[1].as_name(), Some(n(5)));
}

#[test]
fn test_unused_nested_binding_unwraps() {
    // (= (. ctx x) (= Int0 42)) with Int0 never referenced
    // => (= (. ctx x) 42)
    let tree = Node::assign(
        Node::access(Node::name(n(8)), Node::name(n(3))),
        Node::assign(Node::name(n(9)), Node::int(42)),
    );
    let expected = Node::assign(
        Node::access(Node::name(n(8)), Node::name(n(3))),
        Node::int(42),
    );
    assert_eq!(simplify(&tree), expected);
}

#[test]
fn test_pure_statements_are_dropped() {
    // A bare property read in statement position has no effect.
    let tree = Node::block(vec![
        Node::assign(Node::name(n(4)), Node::int(1)),
        Node::access(Node::name(n(4)), Node::name(n(3))),
        Node::assign(
            Node::access(Node::name(n(4)), Node::name(n(6))),
            Node::int(2),
        ),
        Node::name(n(4)),
    ]);
    let simplified = simplify(&tree);
    let form = simplified.as_form().unwrap();
    assert_eq!(form.args.len(), 3);
}

#[test]
fn test_mutating_statements_are_kept() {
    // An invocation selector is an effect and must survive.
    let tree = Node::block(vec![
        Node::assign(Node::name(n(4)), Node::int(1)),
        Node::call(Node::name(n(4)), n(3), vec![Node::int(7)]),
        Node::name(n(4)),
    ]);
    assert_eq!(simplify(&tree), tree);
}

#[test]
fn test_block_collapses_to_trailing_statement() {
    let inner = Node::assign(
        Node::access(Node::name(n(0)), Node::name(n(3))),
        Node::int(1),
    );
    let tree = Node::block(vec![Node::int(5), inner.clone()]);
    assert_eq!(simplify(&tree), inner);
}

#[test]
fn test_dead_top_level_binding() {
    // (= t 42) with t unreferenced reduces to the literal.
    let tree = Node::assign(Node::name(n(1)), Node::int(42));
    assert_eq!(simplify(&tree), Node::int(42));
}

#[test]
fn test_property_name_is_not_a_reference() {
    // The selector `t` is a property name, not a use of the binding `t`.
    let tree = Node::block(vec![
        Node::assign(Node::name(n(1)), Node::int(3)),
        Node::assign(
            Node::access(Node::name(n(0)), Node::name(n(1))),
            Node::name(n(1)),
        ),
        Node::name(n(0)),
    ]);
    let simplified = simplify(&tree);
    let form = simplified.as_form().unwrap();
    // The binding was single-use and inlined into the write.
    assert_eq!(form.args.len(), 2);
    let write = form.args[0].as_form().unwrap();
    assert_eq!(write.args[1], Node::int(3));
}

#[test]
fn test_idempotent_on_examples() {
    let trees = vec![
        Node::block(vec![
            Node::assign(Node::name(n(1)), Node::int(1)),
            Node::assign(Node::name(n(2)), Node::name(n(1))),
            Node::name(n(2)),
        ]),
        Node::assign(Node::name(n(1)), Node::int(42)),
        Node::array(vec![Node::int(1), Node::name(n(0))]),
    ];
    for tree in trees {
        let once = simplify(&tree);
        assert_eq!(simplify(&once), once);
    }
}

fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        (0i64..100).prop_map(Node::int),
        any::<bool>().prop_map(Node::bool),
        (0u32..6).prop_map(|i| Node::name(Name::from_raw(i))),
        Just(Node::null()),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            ((0u32..6), inner.clone())
                .prop_map(|(i, v)| Node::assign(Node::name(Name::from_raw(i)), v)),
            (inner.clone(), (0u32..6)).prop_map(|(r, p)| Node::access(
                r,
                Node::name(Name::from_raw(p))
            )),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Node::block),
            prop::collection::vec(inner, 0..3).prop_map(Node::array),
        ]
    })
}

proptest! {
    #[test]
    fn prop_simplify_is_idempotent(tree in arb_node()) {
        let once = simplify(&tree);
        prop_assert_eq!(simplify(&once), once);
    }
}
