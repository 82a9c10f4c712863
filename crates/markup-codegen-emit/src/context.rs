//! Per-method emission state.
//!
//! [`EmitContext`] dispatches node emission and checks every result against
//! what the caller asked for. It also owns the state nodes share while one
//! method body is generated: the ancestor chain, the locals that back
//! compiler-introduced temporaries, and the context local.

use markup_codegen_core::{
    CodeEmitter, EmitError, EmitResult, EmitterExt, FileSource, LineInfo, Local, TypeRef,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ast::{AstNode, ImperativeNode, ManipulationNode, ValueNode};
use crate::config::EmitConfiguration;
use crate::nodes::CompilerLocal;
use crate::result::NodeEmitResult;

/// State of one method body compilation.
///
/// `'n` is the lifetime of the node tree being emitted.
pub struct EmitContext<'n> {
    config: &'n EmitConfiguration,
    file: Option<&'n dyn FileSource>,
    context_local: Option<Local>,
    ancestors: Vec<&'n dyn AstNode>,
    locals: FxHashMap<u64, Local>,
    parent_stack_verified: bool,
}

impl<'n> EmitContext<'n> {
    pub fn new(config: &'n EmitConfiguration) -> Self {
        Self {
            config,
            file: None,
            context_local: None,
            ancestors: Vec::new(),
            locals: FxHashMap::default(),
            parent_stack_verified: false,
        }
    }

    /// Map every node with a source position to `file`.
    pub fn with_file(mut self, file: &'n dyn FileSource) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_context_local(mut self, local: Local) -> Self {
        self.context_local = Some(local);
        self
    }

    pub fn config(&self) -> &'n EmitConfiguration {
        self.config
    }

    pub fn context_local(&self) -> Option<&Local> {
        self.context_local.as_ref()
    }

    /// Ancestors of the node being emitted, outermost first.
    pub fn parent_nodes(&self) -> &[&'n dyn AstNode] {
        match self.ancestors.split_last() {
            Some((_, parents)) => parents,
            None => &[],
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Emit a value node whose result must be assignable to `expected`.
    ///
    /// A value type delivered where a reference type is expected is boxed,
    /// and the result then reports `expected`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn emit_value(
        &mut self,
        node: &'n dyn ValueNode,
        codegen: &mut dyn CodeEmitter,
        expected: &TypeRef,
    ) -> EmitResult<NodeEmitResult> {
        let result = self.dispatch(node, codegen, |ctx, codegen| node.emit(ctx, codegen))?;

        if result.consumed != 0 {
            return Err(contract(
                node,
                format!("value node consumed {} stack item(s)", result.consumed),
            ));
        }
        let Some(actual) = &result.return_type else {
            return Err(contract(
                node,
                format!("resulted in void while caller expected '{expected}'"),
            ));
        };
        if !expected.is_assignable_from(actual) {
            return Err(contract(
                node,
                format!("resulted in '{actual}', which is not assignable to '{expected}'"),
            ));
        }
        if actual.is_value_type() && !expected.is_value_type() {
            codegen.box_value(actual)?;
            return Ok(NodeEmitResult::value(expected.clone()));
        }
        Ok(result)
    }

    /// Emit a node that must leave the stack untouched.
    pub fn emit_imperative(
        &mut self,
        node: &'n dyn ImperativeNode,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let result = self.dispatch(node, codegen, |ctx, codegen| node.emit(ctx, codegen))?;
        if let Some(ty) = &result.return_type {
            return Err(contract(
                node,
                format!("resulted in '{ty}' while caller expected void"),
            ));
        }
        if result.consumed != 0 {
            return Err(contract(
                node,
                format!("imperative node consumed {} stack item(s)", result.consumed),
            ));
        }
        Ok(result)
    }

    /// Emit a node that consumes the one value on top of the stack.
    pub fn emit_manipulation(
        &mut self,
        node: &'n dyn ManipulationNode,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let result = self.dispatch(node, codegen, |ctx, codegen| node.emit(ctx, codegen))?;
        if let Some(ty) = &result.return_type {
            return Err(contract(
                node,
                format!("resulted in '{ty}' while caller expected void"),
            ));
        }
        if result.consumed != 1 {
            return Err(contract(
                node,
                format!(
                    "manipulation node consumed {} stack item(s) instead of 1",
                    result.consumed
                ),
            ));
        }
        Ok(result)
    }

    fn dispatch<F>(
        &mut self,
        node: &'n dyn AstNode,
        codegen: &mut dyn CodeEmitter,
        emit: F,
    ) -> EmitResult<NodeEmitResult>
    where
        F: FnOnce(&mut Self, &mut dyn CodeEmitter) -> EmitResult<NodeEmitResult>,
    {
        trace!(
            node = node.node_name(),
            line = %node.line(),
            depth = self.ancestors.len(),
            "emit node"
        );
        self.ancestors.push(node);
        let result = self.emit_mapped(node.line(), codegen, emit);
        self.ancestors.pop();
        result
    }

    fn emit_mapped<F>(
        &mut self,
        line: LineInfo,
        codegen: &mut dyn CodeEmitter,
        emit: F,
    ) -> EmitResult<NodeEmitResult>
    where
        F: FnOnce(&mut Self, &mut dyn CodeEmitter) -> EmitResult<NodeEmitResult>,
    {
        match self.file {
            Some(file) if !line.is_synthetic() => {
                let mut block = codegen.begin_debug_block(file, line.line, line.position)?;
                emit(self, &mut *block)
            }
            _ => emit(self, codegen),
        }
    }

    // ========================================================================
    // Compiler locals
    // ========================================================================

    /// Load the value cached in `local`.
    pub fn load_local(
        &self,
        local: &CompilerLocal,
        codegen: &mut dyn CodeEmitter,
        line: LineInfo,
    ) -> EmitResult<()> {
        let slot = self
            .locals
            .get(&local.key())
            .ok_or(EmitError::UninitializedLocal { line })?;
        codegen.ldloc(slot)?;
        Ok(())
    }

    /// Store the value on top of the stack into `local`, defining its slot
    /// on first use.
    pub fn store_local(
        &mut self,
        local: &CompilerLocal,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<()> {
        let slot = match self.locals.get(&local.key()) {
            Some(slot) => slot.clone(),
            None => {
                let slot = codegen.define_local(local.local_type())?;
                self.locals.insert(local.key(), slot.clone());
                slot
            }
        };
        codegen.stloc(&slot)?;
        Ok(())
    }

    pub fn is_local_initialized(&self, local: &CompilerLocal) -> bool {
        self.locals.contains_key(&local.key())
    }

    // ========================================================================
    // Parent stack
    // ========================================================================

    /// Check, once per compilation, that the node being emitted has ancestors.
    pub fn verify_parent_stack(&mut self, node: &'static str, line: LineInfo) -> EmitResult<()> {
        if self.parent_stack_verified {
            return Ok(());
        }
        if self.parent_nodes().is_empty() {
            return Err(EmitError::MissingParentStack { node, line });
        }
        self.parent_stack_verified = true;
        Ok(())
    }
}

fn contract(node: &dyn AstNode, message: String) -> EmitError {
    EmitError::StackContract {
        node: node.node_name(),
        line: node.line(),
        message,
    }
}
