//! Tree rewriting.
//!
//! A visitor sees each node before its children. Role-typed hooks get the
//! owning box, so a hook can substitute the node in place; the substitute is
//! the one whose children are walked next.

use super::{AstNode, ImperativeNode, ManipulationNode, ValueNode};

pub trait AstVisitor {
    fn visit_value(&mut self, _node: &mut Box<dyn ValueNode>) {}

    fn visit_imperative(&mut self, _node: &mut Box<dyn ImperativeNode>) {}

    fn visit_manipulation(&mut self, _node: &mut Box<dyn ManipulationNode>) {}

    /// Called before the children of `node` are visited.
    fn push(&mut self, _node: &dyn AstNode) {}

    /// Called after the children of the last pushed node were visited.
    fn pop(&mut self) {}
}

pub fn visit_value_node(node: &mut Box<dyn ValueNode>, visitor: &mut dyn AstVisitor) {
    visitor.visit_value(node);
    visitor.push(&**node);
    node.visit_children(visitor);
    visitor.pop();
}

pub fn visit_imperative_node(node: &mut Box<dyn ImperativeNode>, visitor: &mut dyn AstVisitor) {
    visitor.visit_imperative(node);
    visitor.push(&**node);
    node.visit_children(visitor);
    visitor.pop();
}

pub fn visit_manipulation_node(
    node: &mut Box<dyn ManipulationNode>,
    visitor: &mut dyn AstVisitor,
) {
    visitor.visit_manipulation(node);
    visitor.push(&**node);
    node.visit_children(visitor);
    visitor.pop();
}

/// Reports whether any node of a tree needs the parent stack.
#[derive(Debug, Default)]
pub struct NeedsParentStackScan {
    found: bool,
}

impl NeedsParentStackScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn scan_value(node: &mut Box<dyn ValueNode>) -> bool {
        let mut scan = Self::new();
        visit_value_node(node, &mut scan);
        scan.found
    }

    pub fn scan_imperative(node: &mut Box<dyn ImperativeNode>) -> bool {
        let mut scan = Self::new();
        visit_imperative_node(node, &mut scan);
        scan.found
    }
}

impl AstVisitor for NeedsParentStackScan {
    fn push(&mut self, node: &dyn AstNode) {
        self.found |= node.needs_parent_stack();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitConfiguration;
    use crate::context::EmitContext;
    use crate::nodes::{BeginInitNode, RuntimeCastNode, StringConstantNode};
    use crate::testing::{Fixture, RecordingEmitter};
    use markup_codegen_core::{LineInfo, OpCode, Operand, TypeRef};

    /// Replaces every string constant with a fixed one.
    struct Rewrite {
        string: TypeRef,
        depth: usize,
        max_depth: usize,
    }

    impl AstVisitor for Rewrite {
        fn visit_value(&mut self, node: &mut Box<dyn ValueNode>) {
            if node.node_name() == "StringConstantNode" {
                *node = Box::new(StringConstantNode::new(&self.string, "rewritten", node.line()));
            }
        }

        fn push(&mut self, _node: &dyn AstNode) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
        }

        fn pop(&mut self) {
            self.depth -= 1;
        }
    }

    #[test]
    fn substitutes_nested_nodes() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let mut root: Box<dyn ValueNode> = Box::new(BeginInitNode::new(Box::new(
            RuntimeCastNode::new(
                Box::new(StringConstantNode::new(&fx.core.string, "before", LineInfo::new(1, 1))),
                &fx.core.string,
                LineInfo::synthetic(),
            ),
        )));

        let mut rewrite = Rewrite {
            string: fx.core.string.clone(),
            depth: 0,
            max_depth: 0,
        };
        visit_value_node(&mut root, &mut rewrite);
        assert_eq!(rewrite.depth, 0);
        assert_eq!(rewrite.max_depth, 3);

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        ctx.emit_value(&*root, &mut codegen, &fx.core.string).unwrap();
        assert_eq!(
            codegen.instructions[0],
            (OpCode::Ldstr, Operand::String("rewritten".into()))
        );
    }
}
