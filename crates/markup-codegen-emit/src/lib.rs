//! Markup Codegen Emit
//!
//! Lowers the markup compiler's IR tree into instructions. Each node emits
//! itself through an [`EmitContext`], which checks the node's stack effect
//! against what its parent expected and maps it to its source position.
//!
//! ## Modules
//!
//! - [`ast`]: Node roles and the rewriting visitor
//! - [`context`]: Dispatch and per-method emission state
//! - [`config`]: Well-known types and type mappings
//! - [`nodes`]: Concrete nodes
//! - [`result`]: Per-node stack effect

pub mod ast;
pub mod config;
pub mod context;
pub mod nodes;
pub mod result;

#[cfg(test)]
mod testing;

pub use ast::{
    AstNode, AstVisitor, ImperativeNode, ManipulationNode, NeedsParentStackScan, ValueNode,
    visit_imperative_node, visit_manipulation_node, visit_value_node,
};
pub use config::{EmitConfiguration, InitHookPredicate, SupportInitialize, TypeMappings, WellKnownTypes};
pub use context::EmitContext;
pub use nodes::{
    BeginInitNode, CompilerLocal, ContextLocalNode, ImperativeBlockNode, LocalInitNode,
    LocalRefNode, ManipulationGroupNode, ManipulationImperativeNode, NeedsParentStackNode,
    NewObjectNode, PropertyAssignmentNode, RuntimeCastNode, StringConstantNode,
    ValueManipulationNode,
};
pub use result::NodeEmitResult;
