use markup_codegen_core::{CodeEmitter, EmitResult, EmitterExt, LineInfo, TypeRef};

use crate::ast::{AstNode, ValueNode};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// A string literal taken from markup text.
pub struct StringConstantNode {
    ty: TypeRef,
    value: String,
    line: LineInfo,
}

impl StringConstantNode {
    /// `ty` is the runtime string type.
    pub fn new(ty: &TypeRef, value: &str, line: LineInfo) -> Self {
        Self {
            ty: ty.clone(),
            value: value.to_string(),
            line,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl AstNode for StringConstantNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "StringConstantNode"
    }
}

impl ValueNode for StringConstantNode {
    fn value_type(&self) -> TypeRef {
        self.ty.clone()
    }

    fn emit<'n>(
        &'n self,
        _ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        codegen.ldstr(&self.value)?;
        Ok(NodeEmitResult::value(self.ty.clone()))
    }
}
