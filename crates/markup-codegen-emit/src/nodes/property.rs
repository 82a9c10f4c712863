use markup_codegen_core::{
    CodeEmitter, EmitError, EmitResult, EmitterExt, LineInfo, PropertyRef,
};

use crate::ast::{AstNode, AstVisitor, ManipulationNode, ValueNode, visit_value_node};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Assigns a property of the ambient object.
pub struct PropertyAssignmentNode {
    property: PropertyRef,
    value: Box<dyn ValueNode>,
    line: LineInfo,
}

impl PropertyAssignmentNode {
    pub fn new(property: &PropertyRef, value: Box<dyn ValueNode>, line: LineInfo) -> Self {
        Self {
            property: property.clone(),
            value,
            line,
        }
    }

    pub fn property(&self) -> &PropertyRef {
        &self.property
    }
}

impl AstNode for PropertyAssignmentNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "PropertyAssignmentNode"
    }
}

impl ManipulationNode for PropertyAssignmentNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let setter = self.property.setter().ok_or_else(|| EmitError::StackContract {
            node: self.node_name(),
            line: self.line,
            message: format!(
                "property '{}' of '{}' has no setter",
                self.property.name(),
                self.property.declaring_type()
            ),
        })?;
        ctx.emit_value(&*self.value, codegen, self.property.property_type())?;
        codegen.emit_call(setter)?;
        Ok(NodeEmitResult::void(1))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_value_node(&mut self.value, visitor);
    }
}
