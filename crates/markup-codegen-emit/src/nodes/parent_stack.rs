use markup_codegen_core::{CodeEmitter, EmitResult, LineInfo, TypeRef};

use crate::ast::{AstNode, AstVisitor, ValueNode, visit_value_node};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Wraps a value whose evaluation walks the chain of enclosing objects.
pub struct NeedsParentStackNode {
    value: Box<dyn ValueNode>,
    line: LineInfo,
}

impl NeedsParentStackNode {
    pub fn new(value: Box<dyn ValueNode>, line: LineInfo) -> Self {
        Self { value, line }
    }
}

impl AstNode for NeedsParentStackNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "NeedsParentStackNode"
    }

    fn needs_parent_stack(&self) -> bool {
        true
    }
}

impl ValueNode for NeedsParentStackNode {
    fn value_type(&self) -> TypeRef {
        self.value.value_type()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        ctx.verify_parent_stack(self.node_name(), self.line)?;
        let value_type = self.value.value_type();
        ctx.emit_value(&*self.value, codegen, &value_type)
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_value_node(&mut self.value, visitor);
    }
}
