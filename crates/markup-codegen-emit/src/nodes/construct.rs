use markup_codegen_core::{
    CodeEmitter, ConstructorRef, EmitError, EmitResult, EmitterExt, LineInfo, TypeRef,
};

use crate::ast::{AstNode, AstVisitor, ValueNode, visit_value_node};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Creates an object through one of its constructors.
pub struct NewObjectNode {
    ctor: ConstructorRef,
    arguments: Vec<Box<dyn ValueNode>>,
    line: LineInfo,
}

impl NewObjectNode {
    pub fn new(ctor: &ConstructorRef, arguments: Vec<Box<dyn ValueNode>>, line: LineInfo) -> Self {
        Self {
            ctor: ctor.clone(),
            arguments,
            line,
        }
    }

    pub fn constructor(&self) -> &ConstructorRef {
        &self.ctor
    }
}

impl AstNode for NewObjectNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "NewObjectNode"
    }
}

impl ValueNode for NewObjectNode {
    fn value_type(&self) -> TypeRef {
        self.ctor.declaring_type().clone()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let params = self.ctor.parameters();
        if params.len() != self.arguments.len() {
            return Err(EmitError::StackContract {
                node: self.node_name(),
                line: self.line,
                message: format!(
                    "'{}' takes {} argument(s), {} supplied",
                    self.ctor,
                    params.len(),
                    self.arguments.len()
                ),
            });
        }
        for (arg, param) in self.arguments.iter().zip(params) {
            ctx.emit_value(&**arg, codegen, param)?;
        }
        codegen.newobj(&self.ctor)?;
        Ok(NodeEmitResult::value(self.value_type()))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        for arg in &mut self.arguments {
            visit_value_node(arg, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitConfiguration;
    use crate::nodes::StringConstantNode;
    use crate::testing::{Fixture, RecordingEmitter};
    use markup_codegen_core::OpCode;

    #[test]
    fn arguments_precede_newobj() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let ctor = ConstructorRef::new(&fx.control, std::slice::from_ref(&fx.core.object));
        let node = NewObjectNode::new(
            &ctor,
            vec![Box::new(StringConstantNode::new(&fx.core.string, "a", LineInfo::synthetic()))],
            LineInfo::synthetic(),
        );

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        let result = ctx.emit_value(&node, &mut codegen, &fx.control).unwrap();

        assert_eq!(result.return_type, Some(fx.control.clone()));
        assert_eq!(codegen.opcodes(), vec![OpCode::Ldstr, OpCode::Newobj]);
    }

    #[test]
    fn arity_mismatch() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let node = NewObjectNode::new(
            &fx.control_ctor(),
            vec![Box::new(StringConstantNode::new(&fx.core.string, "a", LineInfo::synthetic()))],
            LineInfo::new(1, 4),
        );

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        assert!(matches!(
            ctx.emit_value(&node, &mut codegen, &fx.control),
            Err(EmitError::StackContract { node: "NewObjectNode", .. })
        ));
    }

    #[test]
    fn boxes_when_object_is_expected_of_value_type() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let node = NewObjectNode::new(
            &ConstructorRef::new(&fx.point, &[]),
            Vec::new(),
            LineInfo::synthetic(),
        );

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        let result = ctx.emit_value(&node, &mut codegen, &fx.core.object).unwrap();

        assert_eq!(result.return_type, Some(fx.core.object.clone()));
        assert_eq!(codegen.opcodes(), vec![OpCode::Newobj, OpCode::Box]);
    }
}
