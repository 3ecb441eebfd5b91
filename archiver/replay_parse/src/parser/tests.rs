use pretty_assertions::assert_eq;
use proptest::prelude::*;

use replay_ir::{Node, StringInterner};

use crate::parse;

#[test]
fn test_parse_construction_statement() {
    let interner = StringInterner::new();
    let node = parse("Point0 = Point.new(3, 4)", &interner).unwrap();
    let p = interner.intern("Point0");
    let point = interner.intern("Point");
    assert_eq!(
        node,
        Node::assign(
            Node::name(p),
            Node::construct(Node::name(point), vec![Node::int(3), Node::int(4)]),
        )
    );
}

#[test]
fn test_parse_block_with_index_write() {
    let interner = StringInterner::new();
    let node = parse("{ Seq0[0] = 7; Seq0 }", &interner).unwrap();
    let s = interner.intern("Seq0");
    assert_eq!(
        node,
        Node::block(vec![
            Node::assign(Node::access(Node::name(s), Node::int(0)), Node::int(7)),
            Node::name(s),
        ])
    );
}

#[test]
fn test_parse_chained_assignment_is_right_associative() {
    let interner = StringInterner::new();
    let node = parse("a = b = 1", &interner).unwrap();
    let a = interner.intern("a");
    let b = interner.intern("b");
    assert_eq!(
        node,
        Node::assign(Node::name(a), Node::assign(Node::name(b), Node::int(1)))
    );
}

#[test]
fn test_parse_parenthesized_receiver() {
    let interner = StringInterner::new();
    let node = parse("(Point = Type.named(\"Point\")).new()", &interner).unwrap();
    let point = interner.intern("Point");
    let ty = interner.intern("Type");
    let named = interner.intern("named");
    assert_eq!(
        node,
        Node::construct(
            Node::assign(
                Node::name(point),
                Node::call(Node::name(ty), named, vec![Node::str("Point")]),
            ),
            vec![],
        )
    );
}

#[test]
fn test_parse_literals_and_arrays() {
    let interner = StringInterner::new();
    let node = parse("[null, true, 2.5, \"a\\\"b\"]", &interner).unwrap();
    assert_eq!(
        node,
        Node::array(vec![
            Node::null(),
            Node::bool(true),
            Node::float(2.5),
            Node::str("a\"b"),
        ])
    );
}

#[test]
fn test_parse_errors_carry_offsets() {
    let interner = StringInterner::new();
    let err = parse("a = ", &interner).unwrap_err();
    assert_eq!(err.offset, 4);
    assert!(parse("a b", &interner).is_err());
    assert!(parse("a.new", &interner).is_err());
}

#[test]
fn test_render_parse_round_trip_on_generated_shapes() {
    let interner = StringInterner::new();
    let p = interner.intern("Point0");
    let point = interner.intern("Point");
    let pair = interner.intern("Pair0");
    let left = interner.intern("left");
    let tree = Node::block(vec![
        Node::assign(
            Node::name(p),
            Node::construct(Node::name(point), vec![Node::int(3)]),
        ),
        Node::assign(
            Node::access(Node::name(pair), Node::name(left)),
            Node::name(p),
        ),
        Node::name(pair),
    ]);
    let text = replay_fmt::render(&tree, &interner);
    assert_eq!(parse(&text, &interner).unwrap(), tree);
}

/// One interner shared by the strategy and the assertions, so name ids
/// line up across generated cases.
fn shared_interner() -> &'static StringInterner {
    static INTERNER: std::sync::OnceLock<StringInterner> = std::sync::OnceLock::new();
    INTERNER.get_or_init(StringInterner::new)
}

const NAMES: [&str; 4] = ["a", "b", "Point0", "Seq0"];

fn arb_script_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        (-100i64..100).prop_map(Node::int),
        any::<bool>().prop_map(Node::bool),
        Just(Node::null()),
        "[a-z]{1,6}".prop_map(|s| Node::str(&s)),
        (0usize..NAMES.len()).prop_map(|i| Node::name(shared_interner().intern(NAMES[i]))),
    ];
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(r, v)| Node::assign(Node::access(r, Node::int(0)), v)),
            (inner.clone(), 0usize..NAMES.len()).prop_map(|(r, i)| Node::access(
                r,
                Node::name(shared_interner().intern(NAMES[i]))
            )),
            (inner.clone(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(r, args)| Node::construct(r, args)),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Node::block),
            prop::collection::vec(inner, 0..3).prop_map(Node::array),
        ]
    })
}

proptest! {
    #[test]
    fn prop_parse_render_identity(tree in arb_script_node()) {
        let interner = shared_interner();
        let text = replay_fmt::render(&tree, interner);
        prop_assert_eq!(parse(&text, interner).unwrap(), tree);
    }
}
