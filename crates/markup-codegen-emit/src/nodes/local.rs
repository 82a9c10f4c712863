//! Compiler locals: cached sub-results shared between nodes.
//!
//! A [`CompilerLocal`] is created by a compiler pass, initialized once by a
//! [`LocalInitNode`] and read any number of times through [`LocalRefNode`]s.
//! The slot behind it is allocated lazily, on the first store, by the
//! [`EmitContext`] of the method being compiled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use markup_codegen_core::{CodeEmitter, EmitResult, EmitterExt, LineInfo, TypeRef};

use crate::ast::{AstNode, AstVisitor, ValueNode, visit_value_node};
use crate::context::EmitContext;
use crate::result::NodeEmitResult;

#[derive(Debug)]
struct LocalData {
    /// Never reused, unlike the allocation address.
    id: u64,
    ty: TypeRef,
    name: Option<String>,
}

/// Identity handle for a compiler-introduced local.
///
/// Clones refer to the same local.
#[derive(Debug, Clone)]
pub struct CompilerLocal(Arc<LocalData>);

impl CompilerLocal {
    pub fn new(ty: &TypeRef) -> Self {
        Self::build(ty, None)
    }

    /// A local with a name, for diagnostics only.
    pub fn named(ty: &TypeRef, name: &str) -> Self {
        Self::build(ty, Some(name.to_string()))
    }

    fn build(ty: &TypeRef, name: Option<String>) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(Arc::new(LocalData {
            id: NEXT.fetch_add(1, Ordering::Relaxed),
            ty: ty.clone(),
            name,
        }))
    }

    pub fn local_type(&self) -> &TypeRef {
        &self.0.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub(crate) fn key(&self) -> u64 {
        self.0.id
    }
}

impl PartialEq for CompilerLocal {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for CompilerLocal {}

/// Loads an initialized compiler local.
pub struct LocalRefNode {
    local: CompilerLocal,
    line: LineInfo,
}

impl LocalRefNode {
    pub fn new(local: &CompilerLocal, line: LineInfo) -> Self {
        Self {
            local: local.clone(),
            line,
        }
    }

    pub fn local(&self) -> &CompilerLocal {
        &self.local
    }
}

impl AstNode for LocalRefNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "LocalRefNode"
    }
}

impl ValueNode for LocalRefNode {
    fn value_type(&self) -> TypeRef {
        self.local.local_type().clone()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        ctx.load_local(&self.local, codegen, self.line)?;
        Ok(NodeEmitResult::value(self.local.local_type().clone()))
    }
}

/// Evaluates a value once and caches it in a local, leaving the value on
/// the stack.
pub struct LocalInitNode {
    local: CompilerLocal,
    value: Box<dyn ValueNode>,
    line: LineInfo,
}

impl LocalInitNode {
    pub fn new(local: &CompilerLocal, value: Box<dyn ValueNode>, line: LineInfo) -> Self {
        Self {
            local: local.clone(),
            value,
            line,
        }
    }

    pub fn local(&self) -> &CompilerLocal {
        &self.local
    }
}

impl AstNode for LocalInitNode {
    fn line(&self) -> LineInfo {
        self.line
    }

    fn node_name(&self) -> &'static str {
        "LocalInitNode"
    }
}

impl ValueNode for LocalInitNode {
    fn value_type(&self) -> TypeRef {
        self.value.value_type()
    }

    fn emit<'n>(
        &'n self,
        ctx: &mut EmitContext<'n>,
        codegen: &mut dyn CodeEmitter,
    ) -> EmitResult<NodeEmitResult> {
        let value = ctx.emit_value(&*self.value, codegen, self.local.local_type())?;
        codegen.dup()?;
        ctx.store_local(&self.local, codegen)?;
        Ok(value)
    }

    fn visit_children(&mut self, visitor: &mut dyn AstVisitor) {
        visit_value_node(&mut self.value, visitor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitConfiguration;
    use crate::nodes::NewObjectNode;
    use crate::testing::{Fixture, RecordingEmitter};
    use markup_codegen_core::{EmitError, OpCode, Operand};

    #[test]
    fn init_once_then_load_many() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let local = CompilerLocal::new(&fx.control);
        let init = LocalInitNode::new(
            &local,
            Box::new(NewObjectNode::new(&fx.control_ctor(), Vec::new(), LineInfo::synthetic())),
            LineInfo::synthetic(),
        );
        let reads: Vec<LocalRefNode> = (0..3)
            .map(|_| LocalRefNode::new(&local, LineInfo::synthetic()))
            .collect();

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        let result = ctx.emit_value(&init, &mut codegen, &fx.control).unwrap();
        assert_eq!(result.return_type, Some(fx.control.clone()));
        codegen.pop().unwrap();
        for read in &reads {
            ctx.emit_value(read, &mut codegen, &fx.control).unwrap();
            codegen.pop().unwrap();
        }

        assert_eq!(codegen.count(OpCode::Newobj), 1);
        assert_eq!(codegen.count(OpCode::Stloc), 1);
        assert_eq!(codegen.count(OpCode::Ldloc), 3);
        assert_eq!(codegen.locals.len(), 1);
        assert!(matches!(&codegen.instructions[4].1, Operand::Local(l) if l.index() == 0));
    }

    #[test]
    fn read_before_init_fails() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let local = CompilerLocal::named(&fx.control, "root");
        let read = LocalRefNode::new(&local, LineInfo::new(3, 5));

        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();
        let err = ctx.emit_value(&read, &mut codegen, &fx.control).unwrap_err();
        assert_eq!(
            err,
            EmitError::UninitializedLocal {
                line: LineInfo::new(3, 5)
            }
        );
        assert!(codegen.instructions.is_empty());
    }

    #[test]
    fn clones_share_identity() {
        let fx = Fixture::new();
        let a = CompilerLocal::new(&fx.control);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, CompilerLocal::new(&fx.control));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn dropped_local_does_not_alias_a_new_one() {
        let fx = Fixture::new();
        let config = EmitConfiguration::new(&fx.core);
        let mut ctx = EmitContext::new(&config);
        let mut codegen = RecordingEmitter::new();

        let first = CompilerLocal::new(&fx.control);
        let first_key = first.key();
        ctx.store_local(&first, &mut codegen).unwrap();
        assert!(ctx.is_local_initialized(&first));
        drop(first);

        for _ in 0..16 {
            let fresh = CompilerLocal::new(&fx.control);
            assert_ne!(fresh.key(), first_key);
            assert!(!ctx.is_local_initialized(&fresh));
        }
    }
}
