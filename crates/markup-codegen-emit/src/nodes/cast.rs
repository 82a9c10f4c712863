use markup_codegen_core::{CodeEmitter, EmitResult, EmitterExt, LineInfo, TypeRef};

use crate::ast::{AstNode, AstVisitor, ValueNode, visit_value_node};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Checked conversion of an object reference to a destination type.
///
/// The operand is always delivered as the root object type, boxing value
/// types on the way. Value-type destinations are unboxed, everything else
/// goes through `castclass`. A failing cast surfaces at run time only.
pub struct RuntimeCastNode {
    value: Box<dyn ValueNode>,
    target: TypeRef,
    line: LineInfo,
}

impl RuntimeCastNode {
    pub fn new(value: Box<dyn ValueNode>, target: &TypeRef, line: LineInfo) -> Self {
        Self {
            value,
            target: target.clone(),
            line,
        }
    }

    pub fn target(&self) -> &TypeRef {
        &self.target
    }
}

impl AstNode for RuntimeCastNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "RuntimeCastNode"
    }
}

impl ValueNode for RuntimeCastNode {
    fn value_type(&self) -> TypeRef {
        self.target.clone()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let object = &ctx.config().well_known.object;
        ctx.emit_value(&*self.value, codegen, object)?;
        if self.target.is_value_type() {
            codegen.unbox_any(&self.target)?;
        } else {
            codegen.castclass(&self.target)?;
        }
        Ok(NodeEmitResult::value(self.target.clone()))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_value_node(&mut self.value, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitConfiguration;
    use crate::nodes::{ContextLocalNode, StringConstantNode};
    use crate::testing::{Fixture, RecordingEmitter};
    use markup_codegen_core::{Local, OpCode, Operand};

    #[test]
    fn value_type_destination_unboxes() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let node = RuntimeCastNode::new(
            Box::new(ContextLocalNode::new(&fx.core.object, LineInfo::synthetic())),
            &fx.point,
            LineInfo::synthetic(),
        );

        let mut ctx = EmitContext::new(&config)
            .with_context_local(Local::new(0, fx.core.object.clone()));
        let mut codegen = RecordingEmitter::new();
        let result = ctx.emit_value(&node, &mut codegen, &fx.point).unwrap();

        assert_eq!(result.return_type, Some(fx.point.clone()));
        assert_eq!(codegen.opcodes(), vec![OpCode::Ldloc, OpCode::UnboxAny]);
        assert_eq!(codegen.instructions[1].1, Operand::Type(fx.point.clone()));
    }

    #[test]
    fn reference_destination_casts() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let node = RuntimeCastNode::new(
            Box::new(StringConstantNode::new(&fx.core.string, "x", LineInfo::synthetic())),
            &fx.control,
            LineInfo::synthetic(),
        );

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        let result = ctx.emit_value(&node, &mut codegen, &fx.control).unwrap();

        assert_eq!(result.return_type, Some(fx.control.clone()));
        assert_eq!(codegen.opcodes(), vec![OpCode::Ldstr, OpCode::Castclass]);
    }

    #[test]
    fn value_type_operand_is_boxed_first() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let slot = Local::new(0, fx.point.clone());
        let node = RuntimeCastNode::new(
            Box::new(ContextLocalNode::new(&fx.point, LineInfo::synthetic())),
            &fx.point,
            LineInfo::synthetic(),
        );

        let mut ctx = EmitContext::new(&config).with_context_local(slot);
        let mut codegen = RecordingEmitter::new();
        ctx.emit_value(&node, &mut codegen, &fx.point).unwrap();

        assert_eq!(
            codegen.opcodes(),
            vec![OpCode::Ldloc, OpCode::Box, OpCode::UnboxAny]
        );
    }
}
