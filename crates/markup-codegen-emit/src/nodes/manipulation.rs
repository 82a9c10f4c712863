//! Adapters between the imperative and manipulation roles.

use markup_codegen_core::{CodeEmitter, EmitResult, EmitterExt, LineInfo};

use crate::ast::{
    AstNode, AstVisitor, ImperativeNode, ManipulationNode, ValueNode, visit_imperative_node,
    visit_manipulation_node, visit_value_node,
};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Runs an imperative node where a manipulation is expected, discarding the
/// ambient value.
pub struct ManipulationImperativeNode {
    imperative: Box<dyn ImperativeNode>,
    line: LineInfo,
}

impl ManipulationImperativeNode {
    pub fn new(imperative: Box<dyn ImperativeNode>, line: LineInfo) -> Self {
        Self { imperative, line }
    }
}

impl AstNode for ManipulationImperativeNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "ManipulationImperativeNode"
    }
}

impl ManipulationNode for ManipulationImperativeNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        codegen.pop()?;
        ctx.emit_imperative(&*self.imperative, codegen)?;
        Ok(NodeEmitResult::void(1))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_imperative_node(&mut self.imperative, visitor);
    }
}

/// Pushes a value and hands it to a manipulation. Leaves no residue.
pub struct ValueManipulationNode {
    value: Box<dyn ValueNode>,
    manipulation: Box<dyn ManipulationNode>,
    line: LineInfo,
}

impl ValueManipulationNode {
    pub fn new(
        value: Box<dyn ValueNode>,
        manipulation: Box<dyn ManipulationNode>,
        line: LineInfo,
    ) -> Self {
        Self {
            value,
            manipulation,
            line,
        }
    }
}

impl AstNode for ValueManipulationNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "ValueManipulationNode"
    }
}

impl ImperativeNode for ValueManipulationNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let value_type = self.value.value_type();
        ctx.emit_value(&*self.value, codegen, &value_type)?;
        ctx.emit_manipulation(&*self.manipulation, codegen)?;
        Ok(NodeEmitResult::void(0))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_value_node(&mut self.value, visitor);
        visit_manipulation_node(&mut self.manipulation, visitor);
    }
}
