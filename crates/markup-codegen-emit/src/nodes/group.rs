use markup_codegen_core::{CodeEmitter, EmitResult, EmitterExt, LineInfo};

use crate::ast::{
    AstNode, AstVisitor, ImperativeNode, ManipulationNode, visit_imperative_node,
    visit_manipulation_node,
};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

/// Applies several manipulations to the same ambient value.
pub struct ManipulationGroupNode {
    children: Vec<Box<dyn ManipulationNode>>,
    line: LineInfo,
}

impl ManipulationGroupNode {
    pub fn new(children: Vec<Box<dyn ManipulationNode>>, line: LineInfo) -> Self {
        Self { children, line }
    }

    pub fn push(&mut self, child: Box<dyn ManipulationNode>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl AstNode for ManipulationGroupNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "ManipulationGroupNode"
    }
}

impl ManipulationNode for ManipulationGroupNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let Some((last, rest)) = self.children.split_last() else {
            codegen.pop()?;
            return Ok(NodeEmitResult::void(1));
        };
        // Every child consumes the ambient value, so all but the last get a copy.
        for child in rest {
            codegen.dup()?;
            ctx.emit_manipulation(&**child, codegen)?;
        }
        ctx.emit_manipulation(&**last, codegen)?;
        Ok(NodeEmitResult::void(1))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        for child in &mut self.children {
            visit_manipulation_node(child, visitor);
        }
    }
}

/// Imperative statements executed in order.
pub struct ImperativeBlockNode {
    children: Vec<Box<dyn ImperativeNode>>,
    line: LineInfo,
}

impl ImperativeBlockNode {
    pub fn new(children: Vec<Box<dyn ImperativeNode>>, line: LineInfo) -> Self {
        Self { children, line }
    }
}

impl AstNode for ImperativeBlockNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "ImperativeBlockNode"
    }
}

impl ImperativeNode for ImperativeBlockNode {
    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        for child in &self.children {
            ctx.emit_imperative(&**child, codegen)?;
        }
        Ok(NodeEmitResult::void(0))
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        for child in &mut self.children {
            visit_imperative_node(child, visitor);
        }
    }
}
