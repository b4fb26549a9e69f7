//! Generic recursive walk over a [`Statement`]
//!
//! The walk drives a [`TraversalVisitor`] through a fixed protocol for every node:
//! `before_expansion`, the lhs operand, the node itself (`Role::Parent`), the rhs operand,
//! `after_expansion`. Composite operands are recursed into, leaf operands are handed to
//! the visitor. Because every node is opened and closed by the visitor, the output never
//! depends on the operator precedence of the target language.

use crate::errors::{GeneratorError, Result};
use crate::operators::requires_kernel;
use crate::statement::{Node, NodeIndex, Operand, Statement};
use tracing::trace;

/// Position from which a node is visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Lhs,
    Parent,
    Rhs,
}

/// Hooks called by [`Traversal::run`]
///
/// Any error returned by a hook stops the walk and is returned to the caller.
pub trait TraversalVisitor {
    fn before_expansion(&mut self, _index: NodeIndex, _node: &Node) -> Result<()> {
        Ok(())
    }

    /// Called with [`Role::Parent`] for every node, and with [`Role::Lhs`]/[`Role::Rhs`]
    /// for the leaf operands of a node
    fn visit(&mut self, index: NodeIndex, node: &Node, role: Role) -> Result<()>;

    fn after_expansion(&mut self, _index: NodeIndex, _node: &Node) -> Result<()> {
        Ok(())
    }
}

/// Walk configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Traversal {
    inspect: bool,
}

impl Traversal {
    /// A walk that stops at nodes computed by a dedicated kernel: their operands are
    /// not visited, only the node itself
    pub fn new() -> Self {
        Traversal { inspect: false }
    }

    /// A walk that also expands the operands of kernel computed nodes
    pub fn inspecting() -> Self {
        Traversal { inspect: true }
    }

    pub fn run<V: TraversalVisitor>(
        &self,
        statement: &Statement,
        root: NodeIndex,
        visitor: &mut V,
    ) -> Result<()> {
        self.expand(statement, root, visitor, 0)
    }

    fn expand<V: TraversalVisitor>(
        &self,
        statement: &Statement,
        index: NodeIndex,
        visitor: &mut V,
        depth: usize,
    ) -> Result<()> {
        // a walk deeper than the statement went around a cycle
        if depth > statement.len() {
            return Err(GeneratorError::CyclicStatement(index));
        }
        let node = statement.node(index)?;
        let recurse = self.inspect || !requires_kernel(&node.op);
        trace!(node = %index, depth, kind = ?node.op.kind, "expanding node");

        visitor.before_expansion(index, node)?;
        if recurse {
            self.operand(statement, index, node, &node.lhs, Role::Lhs, visitor, depth)?;
        }
        visitor.visit(index, node, Role::Parent)?;
        if recurse {
            if let Some(rhs) = &node.rhs {
                self.operand(statement, index, node, rhs, Role::Rhs, visitor, depth)?;
            }
        }
        visitor.after_expansion(index, node)
    }

    #[allow(clippy::too_many_arguments)]
    fn operand<V: TraversalVisitor>(
        &self,
        statement: &Statement,
        index: NodeIndex,
        node: &Node,
        operand: &Operand,
        role: Role,
        visitor: &mut V,
        depth: usize,
    ) -> Result<()> {
        match operand {
            Operand::Composite(child) => self.expand(statement, *child, visitor, depth + 1),
            Operand::Leaf(_) => visitor.visit(index, node, role),
        }
    }
}

/// Walks the statement from `root` with the default [`Traversal`]
pub fn traverse<V: TraversalVisitor>(
    statement: &Statement,
    root: NodeIndex,
    visitor: &mut V,
) -> Result<()> {
    Traversal::new().run(statement, root, visitor)
}
