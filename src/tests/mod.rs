use crate::codegen::generate_expression;
use crate::config::ExpressionFormat;
use crate::mapping::{MappedObject, MappingTable};
use crate::statement::{
    Leaf, Node, NodeIndex, Operand, Operation, OperationFamily, OperationKind,
    OperationSubfamily, Statement, StatementBuilder,
};
use crate::traverse::Role;

fn leaf() -> Leaf {
    Leaf::host_scalar(1.0f32)
}

fn symbols(entries: &[(NodeIndex, Role, &str)]) -> MappingTable {
    let mut mapping = MappingTable::new();
    for (node, role, text) in entries {
        mapping.insert(*node, *role, MappedObject::symbol(text));
    }
    mapping
}

fn generate(statement: &Statement, root: NodeIndex, mapping: &MappingTable) -> String {
    generate_expression(statement, root, mapping, &ExpressionFormat::default()).unwrap()
}

#[test]
fn elementwise_binary_operator() {
    let mut builder = StatementBuilder::new();
    let root = builder.binary(OperationKind::Mult, leaf(), leaf());
    let statement = builder.build();
    let mapping = symbols(&[(root, Role::Lhs, "a"), (root, Role::Rhs, "b")]);

    assert_eq!(generate(&statement, root, &mapping), "(a*b)");
}

#[test]
fn unary_function() {
    let mut builder = StatementBuilder::new();
    let root = builder.unary(OperationKind::Abs, leaf());
    let statement = builder.build();
    let mapping = symbols(&[(root, Role::Lhs, "x")]);

    assert_eq!(generate(&statement, root, &mapping), "abs(x)");
}

#[test]
fn binary_function() {
    let mut builder = StatementBuilder::new();
    let root = builder.binary(OperationKind::ElementPow, leaf(), leaf());
    let statement = builder.build();
    let mapping = symbols(&[(root, Role::Lhs, "a"), (root, Role::Rhs, "b")]);

    assert_eq!(generate(&statement, root, &mapping), "pow(a,b)");
}

#[test]
fn composite_recursion() {
    let statement = Statement::new(vec![
        Node {
            op: Operation::of(OperationKind::Add),
            lhs: leaf().into(),
            rhs: Some(leaf().into()),
        },
        Node {
            op: Operation::of(OperationKind::Mult),
            lhs: Operand::Composite(NodeIndex(0)),
            rhs: Some(leaf().into()),
        },
    ]);
    let mapping = symbols(&[
        (NodeIndex(0), Role::Lhs, "a"),
        (NodeIndex(0), Role::Rhs, "b"),
        (NodeIndex(1), Role::Rhs, "c"),
    ]);

    assert_eq!(generate(&statement, NodeIndex(1), &mapping), "((a+b)*c)");
}

#[test]
fn every_node_is_parenthesized() {
    // a - (b - c) keeps its grouping and (a * b) + c keeps its parentheses too
    let mut builder = StatementBuilder::new();
    let inner = builder.binary(OperationKind::Sub, leaf(), leaf());
    let outer = builder.binary(OperationKind::Sub, leaf(), inner);
    let product = builder.binary(OperationKind::Mult, leaf(), leaf());
    let sum = builder.binary(OperationKind::Add, product, leaf());
    let statement = builder.build();
    let mapping = symbols(&[
        (inner, Role::Lhs, "b"),
        (inner, Role::Rhs, "c"),
        (outer, Role::Lhs, "a"),
        (product, Role::Lhs, "a"),
        (product, Role::Rhs, "b"),
        (sum, Role::Rhs, "c"),
    ]);

    assert_eq!(generate(&statement, outer, &mapping), "(a-(b-c))");
    assert_eq!(generate(&statement, sum, &mapping), "((a*b)+c)");
}

#[test]
fn relational_functions_take_two_arguments() {
    let mut builder = StatementBuilder::new();
    let lhs = builder.binary(OperationKind::ElementGeq, leaf(), leaf());
    let root = builder.binary(OperationKind::ElementFmin, lhs, leaf());
    let statement = builder.build();
    let mapping = symbols(&[
        (lhs, Role::Lhs, "x"),
        (lhs, Role::Rhs, "y"),
        (root, Role::Rhs, "z"),
    ]);

    assert_eq!(
        generate(&statement, root, &mapping),
        "fmin(isgreaterequal(x,y),z)"
    );
}

#[test]
fn generation_is_deterministic() {
    let mut builder = StatementBuilder::new();
    let dot = builder.binary(OperationKind::InnerProd, leaf(), leaf());
    let scaled = builder.binary(OperationKind::Div, leaf(), dot);
    let root = builder.binary(OperationKind::Assign, leaf(), scaled);
    let statement = builder.build();
    let mapping: MappingTable = [
        ((dot, Role::Parent), MappedObject::symbol("dot0")),
        ((scaled, Role::Lhs), MappedObject::Vector { name: "x".into() }),
        ((root, Role::Lhs), MappedObject::Vector { name: "y".into() }),
    ]
    .into_iter()
    .collect();
    let format = ExpressionFormat::new("gid", "0").with_simd_lane(1).unwrap();

    let first = generate_expression(&statement, root, &mapping, &format).unwrap();
    let second = generate_expression(&statement, root, &mapping, &format.clone()).unwrap();
    assert_eq!(first, "(y[gid].s1=(x[gid].s1/(dot0)))");
    assert_eq!(first, second);
}

#[test]
fn custom_operation_descriptors_follow_their_subfamily() {
    // a max reduction over columns, computed by its own kernel
    let mut builder = StatementBuilder::new();
    let reduced = builder.push(
        Operation::new(
            OperationFamily::ColumnsReduction,
            OperationSubfamily::Function,
            OperationKind::ElementFmax,
        ),
        leaf().into(),
        None,
    );
    let root = builder.binary(OperationKind::Sub, leaf(), reduced);
    let statement = builder.build();
    let mapping = symbols(&[(reduced, Role::Parent, "colmax"), (root, Role::Lhs, "v")]);

    assert_eq!(generate(&statement, root, &mapping), "(v-(colmax))");
}
