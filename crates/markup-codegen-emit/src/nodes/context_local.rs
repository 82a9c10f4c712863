use markup_codegen_core::{CodeEmitter, EmitError, EmitResult, EmitterExt, LineInfo, TypeRef};

use crate::ast::{AstNode, ValueNode};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Loads the runtime context object of the method being compiled.
pub struct ContextLocalNode {
    ty: TypeRef,
    line: LineInfo,
}

impl ContextLocalNode {
    pub fn new(ty: &TypeRef, line: LineInfo) -> Self {
        Self {
            ty: ty.clone(),
            line,
        }
    }
}

impl AstNode for ContextLocalNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "ContextLocalNode"
    }
}

impl ValueNode for ContextLocalNode {
    fn value_type(&self) -> TypeRef {
        self.ty.clone()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let local = ctx
            .context_local()
            .ok_or(EmitError::MissingContextLocal { line: self.line })?;
        codegen.ldloc(local)?;
        Ok(NodeEmitResult::value(self.ty.clone()))
    }
}
