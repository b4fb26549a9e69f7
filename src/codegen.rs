//! Generation of the source text of a fused elementwise expression
//!
//! [`ExpressionGenerator`] is the visitor turning a statement into one fully parenthesized
//! expression. Every node gets its own pair of parentheses, whatever the precedence of its
//! operator, so the text can be spliced verbatim into any kernel body.

use crate::coding::KernelStream;
use crate::config::ExpressionFormat;
use crate::errors::{GeneratorError, Result};
use crate::mapping::MappingTable;
use crate::operators::token;
use crate::statement::{Node, NodeIndex, Operand, OperationSubfamily, Statement};
use crate::traverse::{traverse, Role, TraversalVisitor};
use tracing::debug;

/// Visitor writing the expression of a statement into a caller owned buffer
pub struct ExpressionGenerator<'a> {
    format: &'a ExpressionFormat,
    out: &'a mut String,
    mapping: &'a MappingTable,
}

impl<'a> ExpressionGenerator<'a> {
    pub fn new(
        format: &'a ExpressionFormat,
        out: &'a mut String,
        mapping: &'a MappingTable,
    ) -> Self {
        ExpressionGenerator {
            format,
            out,
            mapping,
        }
    }

    fn push_mapped(&mut self, index: NodeIndex, role: Role) -> Result<()> {
        let symbol = self.mapping.get(index, role)?.generate(self.format);
        self.out.push_str(&symbol);
        Ok(())
    }
}

impl TraversalVisitor for ExpressionGenerator<'_> {
    fn before_expansion(&mut self, _index: NodeIndex, node: &Node) -> Result<()> {
        if node.op.subfamily == OperationSubfamily::ElementwiseFunction {
            self.out.push_str(token(node.op.kind)?);
        }
        self.out.push('(');
        Ok(())
    }

    fn visit(&mut self, index: NodeIndex, node: &Node, role: Role) -> Result<()> {
        match role {
            Role::Parent => match node.op.subfamily {
                OperationSubfamily::Function => self.push_mapped(index, role)?,
                OperationSubfamily::ElementwiseOperator => {
                    self.out.push_str(token(node.op.kind)?)
                }
                // separates the arguments of a binary function
                OperationSubfamily::ElementwiseFunction => {
                    if node.rhs.is_some() {
                        self.out.push(',')
                    }
                }
            },
            Role::Lhs | Role::Rhs => self.push_mapped(index, role)?,
        }
        Ok(())
    }

    fn after_expansion(&mut self, _index: NodeIndex, _node: &Node) -> Result<()> {
        self.out.push(')');
        Ok(())
    }
}

/// Generates the expression rooted at `root`
///
/// # Errors
/// Any unsupported operator, missing mapping entry or invalid node index fails the whole
/// expression, no partial text is returned.
///
/// # Example
/// ```
/// use wgpu_kernelgen::codegen::generate_expression;
/// use wgpu_kernelgen::config::ExpressionFormat;
/// use wgpu_kernelgen::mapping::{MappedObject, MappingTable};
/// use wgpu_kernelgen::statement::{Leaf, OperationKind, StatementBuilder};
/// use wgpu_kernelgen::traverse::Role;
///
/// let mut builder = StatementBuilder::new();
/// let root = builder.binary(OperationKind::Mult, Leaf::host_scalar(1.0f32), Leaf::host_scalar(2.0f32));
/// let statement = builder.build();
///
/// let mut mapping = MappingTable::new();
/// mapping.insert(root, Role::Lhs, MappedObject::symbol("a"));
/// mapping.insert(root, Role::Rhs, MappedObject::symbol("b"));
///
/// let text = generate_expression(&statement, root, &mapping, &ExpressionFormat::default()).unwrap();
/// assert_eq!(text, "(a*b)");
/// ```
pub fn generate_expression(
    statement: &Statement,
    root: NodeIndex,
    mapping: &MappingTable,
    format: &ExpressionFormat,
) -> Result<String> {
    let mut out = String::new();
    append_expression(&mut out, statement, root, mapping, format)?;
    Ok(out)
}

/// Appends the expression rooted at `root` to `out`
///
/// On failure `out` is restored to what it held before the call.
pub fn append_expression(
    out: &mut String,
    statement: &Statement,
    root: NodeIndex,
    mapping: &MappingTable,
    format: &ExpressionFormat,
) -> Result<()> {
    let start = out.len();
    debug!(root = %root, nodes = statement.len(), "generating expression");
    let result = traverse(
        statement,
        root,
        &mut ExpressionGenerator::new(format, out, mapping),
    );
    match result {
        Ok(()) => {
            debug!(root = %root, length = out.len() - start, "expression generated");
            Ok(())
        }
        Err(error) => {
            out.truncate(start);
            debug!(root = %root, %error, "expression generation failed");
            Err(error)
        }
    }
}

fn generate_side(
    statement: &Statement,
    root: NodeIndex,
    operand: Option<&Operand>,
    role: Role,
    mapping: &MappingTable,
    format: &ExpressionFormat,
) -> Result<String> {
    match operand {
        Some(Operand::Composite(child)) => generate_expression(statement, *child, mapping, format),
        Some(Operand::Leaf(_)) => Ok(mapping.get(root, role)?.generate(format)),
        None => Err(GeneratorError::MissingOperand { node: root, role }),
    }
}

/// Generates only the lhs operand of `root`, typically the target of an assignment
pub fn generate_all_lhs(
    statement: &Statement,
    root: NodeIndex,
    mapping: &MappingTable,
    format: &ExpressionFormat,
) -> Result<String> {
    let node = statement.node(root)?;
    generate_side(statement, root, Some(&node.lhs), Role::Lhs, mapping, format)
}

/// Generates only the rhs operand of `root`
pub fn generate_all_rhs(
    statement: &Statement,
    root: NodeIndex,
    mapping: &MappingTable,
    format: &ExpressionFormat,
) -> Result<String> {
    let node = statement.node(root)?;
    generate_side(statement, root, node.rhs.as_ref(), Role::Rhs, mapping, format)
}

/// Writes the expression rooted at `root` as one statement line of a kernel body
pub fn write_statement(
    stream: &mut KernelStream,
    statement: &Statement,
    root: NodeIndex,
    mapping: &MappingTable,
    format: &ExpressionFormat,
) -> Result<()> {
    let expression = generate_expression(statement, root, mapping, format)?;
    stream.write_line(&format!("{expression};"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappedObject;
    use crate::statement::{Leaf, OperationKind, StatementBuilder};

    fn leaf() -> Leaf {
        Leaf::host_scalar(0.0f32)
    }

    fn map(entries: &[(usize, Role, &str)]) -> MappingTable {
        entries
            .iter()
            .map(|(node, role, text)| ((NodeIndex(*node), *role), MappedObject::symbol(text)))
            .collect()
    }

    #[test]
    fn kernel_computed_nodes_use_their_mapped_result() {
        let mut builder = StatementBuilder::new();
        let dot = builder.binary(OperationKind::InnerProd, leaf(), leaf());
        let root = builder.binary(OperationKind::Add, dot, leaf());
        let statement = builder.build();
        let mapping = map(&[(0, Role::Parent, "sum0"), (1, Role::Rhs, "c")]);

        let text =
            generate_expression(&statement, root, &mapping, &ExpressionFormat::default()).unwrap();
        assert_eq!(text, "((sum0)+c)");
    }

    #[test]
    fn nested_functions() {
        let mut builder = StatementBuilder::new();
        let max = builder.binary(OperationKind::ElementFmax, leaf(), leaf());
        let root = builder.unary(OperationKind::Abs, max);
        let statement = builder.build();
        let mapping = map(&[(0, Role::Lhs, "x"), (0, Role::Rhs, "y")]);

        let text =
            generate_expression(&statement, root, &mapping, &ExpressionFormat::default()).unwrap();
        assert_eq!(text, "abs(fmax(x,y))");
    }

    #[test]
    fn failures_leave_the_buffer_untouched() {
        let mut builder = StatementBuilder::new();
        let root = builder.binary(OperationKind::Add, leaf(), leaf());
        let statement = builder.build();
        let mapping = map(&[(0, Role::Lhs, "a")]);

        let mut out = String::from("x = ");
        let result = append_expression(
            &mut out,
            &statement,
            root,
            &mapping,
            &ExpressionFormat::default(),
        );
        assert_eq!(
            result,
            Err(GeneratorError::MappingLookupFailure {
                node: root,
                role: Role::Rhs
            })
        );
        assert_eq!(out, "x = ");
    }

    #[test]
    fn unsupported_operator_fails_the_expression() {
        let mut builder = StatementBuilder::new();
        let root = builder.unary(OperationKind::Exp, leaf());
        let statement = builder.build();
        let mapping = map(&[(0, Role::Lhs, "a")]);

        assert_eq!(
            generate_expression(&statement, root, &mapping, &ExpressionFormat::default()),
            Err(GeneratorError::UnsupportedOperator(OperationKind::Exp))
        );
    }

    #[test]
    fn sides_of_an_assignment() {
        let mut builder = StatementBuilder::new();
        let sum = builder.binary(OperationKind::Add, leaf(), leaf());
        let root = builder.binary(OperationKind::Assign, leaf(), sum);
        let statement = builder.build();
        let mapping = map(&[(0, Role::Lhs, "a"), (0, Role::Rhs, "b"), (1, Role::Lhs, "y")]);
        let format = ExpressionFormat::default();

        assert_eq!(
            generate_all_lhs(&statement, root, &mapping, &format).unwrap(),
            "y"
        );
        assert_eq!(
            generate_all_rhs(&statement, root, &mapping, &format).unwrap(),
            "(a+b)"
        );
        assert_eq!(
            generate_all_rhs(&statement, sum, &mapping, &format).unwrap(),
            "b"
        );
    }

    #[test]
    fn missing_rhs_side() {
        let mut builder = StatementBuilder::new();
        let root = builder.unary(OperationKind::Abs, leaf());
        let statement = builder.build();

        assert_eq!(
            generate_all_rhs(&statement, root, &MappingTable::new(), &ExpressionFormat::default()),
            Err(GeneratorError::MissingOperand {
                node: root,
                role: Role::Rhs
            })
        );
    }

    #[test]
    fn statements_are_written_as_indented_lines() {
        let mut builder = StatementBuilder::new();
        let root = builder.binary(OperationKind::InplaceAdd, leaf(), leaf());
        let statement = builder.build();
        let mapping = map(&[(0, Role::Lhs, "y[i]"), (0, Role::Rhs, "x[i]")]);

        let mut stream = KernelStream::new();
        stream.indent();
        write_statement(
            &mut stream,
            &statement,
            root,
            &mapping,
            &ExpressionFormat::default(),
        )
        .unwrap();
        assert_eq!(stream.as_str(), "    (y[i]+=x[i]);\n");
    }
}
