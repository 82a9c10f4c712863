//! The node emission protocol.
//!
//! Every IR node plays exactly one role:
//!
//! - [`ValueNode`] leaves exactly one value of a known type on the stack
//! - [`ImperativeNode`] leaves the stack as it found it
//! - [`ManipulationNode`] consumes one ambient value that its parent pushed
//!
//! Nodes lower themselves by emitting their children through the
//! [`EmitContext`](crate::EmitContext) and their own instructions through the
//! [`CodeEmitter`] they are handed. They never share mutable state with each
//! other; values travel on the evaluation stack or through locals.

mod visitor;

use markup_codegen_core::{CodeEmitter, EmitResult, LineInfo, TypeRef};

use crate::context::EmitContext;
use crate::result::NodeEmitResult;

pub use visitor::{
    AstVisitor, NeedsParentStackScan, visit_imperative_node, visit_manipulation_node,
    visit_value_node,
};

/// Behavior shared by every node, whatever its role.
pub trait AstNode {
    /// Source position, for diagnostics and debug mapping.
    fn line(&self) -> LineInfo;

    /// Short node name used in diagnostics.
    fn node_name(&self) -> &'static str;

    /// Whether emitting this node needs the chain of its ancestors.
    fn needs_parent_stack(&self) -> bool {
        false
    }
}

/// A node that produces one value.
pub trait ValueNode: AstNode {
    /// Static type of the produced value.
    fn value_type(&self) -> TypeRef;

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult>;

    fn visit_children(&mut self, _visitor: &mut dyn AstVisitor) {}
}

/// A node executed for its side effects only.
pub trait ImperativeNode: AstNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult>;

    fn visit_children(&mut self, _visitor: &mut dyn AstVisitor) {}
}

/// A node that operates on a value its parent left on the stack.
pub trait ManipulationNode: AstNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult>;

    fn visit_children(&mut self, _visitor: &mut dyn AstVisitor) {}
}
