//! Two-phase initialization of freshly created objects.

use markup_codegen_core::{CodeEmitter, EmitResult, EmitterExt, LineInfo, TypeRef};

use crate::ast::{AstNode, AstVisitor, ValueNode, visit_value_node};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Evaluates a value and, when its type supports the initialization hook,
/// calls the begin hook on it. The value stays on the stack either way.
pub struct BeginInitNode {
    value: Box<dyn ValueNode>,
}

impl BeginInitNode {
    pub fn new(value: Box<dyn ValueNode>) -> Self {
        Self { value }
    }
}

impl AstNode for BeginInitNode {
    fn line(&self) -> LineInfo {
        self.value.line()
    }

    fn node_name(&self) -> &'static str {
        "BeginInitNode"
    }
}

impl ValueNode for BeginInitNode {
    fn value_type(&self) -> TypeRef {
        self.value.value_type()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let value_type = self.value.value_type();
        let result = ctx.emit_value(&*self.value, codegen, &value_type)?;
        if let Some(begin_init) = ctx.config().mappings.begin_init_for(&value_type) {
            codegen.dup()?.emit_call(begin_init)?;
        }
        Ok(result)
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_value_node(&mut self.value, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmitConfiguration, SupportInitialize};
    use crate::nodes::{NewObjectNode, StringConstantNode};
    use crate::testing::{Fixture, RecordingEmitter};
    use markup_codegen_core::{OpCode, Operand};

    fn config(fx: &Fixture) -> EmitConfiguration {
        EmitConfiguration::new(&fx.core)
            .with_support_initialize(SupportInitialize::new(&fx.init, &fx.begin_init).unwrap())
    }

    fn stack_delta(codegen: &RecordingEmitter) -> i32 {
        codegen
            .opcodes()
            .iter()
            .map(|op| match op {
                OpCode::Newobj | OpCode::Dup | OpCode::Ldstr => 1,
                OpCode::Callvirt => -1,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn calls_hook_on_supporting_type() {
        let fx = Fixture::new();
        let config = config(&fx);
        let node = BeginInitNode::new(Box::new(NewObjectNode::new(
            &fx.control_ctor(),
            Vec::new(),
            LineInfo::synthetic(),
        )));

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        let result = ctx.emit_value(&node, &mut codegen, &fx.control).unwrap();

        assert_eq!(result.return_type, Some(fx.control.clone()));
        assert_eq!(
            codegen.opcodes(),
            vec![OpCode::Newobj, OpCode::Dup, OpCode::Callvirt]
        );
        assert_eq!(codegen.instructions[2].1, Operand::Method(fx.begin_init.clone()));
        assert_eq!(stack_delta(&codegen), 1);
    }

    #[test]
    fn passes_through_other_types() {
        let fx = Fixture::new();
        let config = config(&fx);
        let node = BeginInitNode::new(Box::new(StringConstantNode::new(
            &fx.core.string,
            "hello",
            LineInfo::synthetic(),
        )));

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        ctx.emit_value(&node, &mut codegen, &fx.core.string).unwrap();

        assert_eq!(codegen.opcodes(), vec![OpCode::Ldstr]);
        assert_eq!(stack_delta(&codegen), 1);
    }

    #[test]
    fn no_hook_without_mapping() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let node = BeginInitNode::new(Box::new(NewObjectNode::new(
            &fx.control_ctor(),
            Vec::new(),
            LineInfo::synthetic(),
        )));

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        ctx.emit_value(&node, &mut codegen, &fx.control).unwrap();
        assert_eq!(codegen.opcodes(), vec![OpCode::Newobj]);
    }
}
