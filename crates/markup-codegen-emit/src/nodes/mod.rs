//! Concrete IR nodes.
//!
//! | Node | Role | Stack effect |
//! |------|------|--------------|
//! | [`LocalRefNode`] | value | `ldloc` of an initialized compiler local |
//! | [`LocalInitNode`] | value | value, `dup`, `stloc` |
//! | [`BeginInitNode`] | value | value, then `dup` + begin hook when supported |
//! | [`ContextLocalNode`] | value | `ldloc` of the context local |
//! | [`RuntimeCastNode`] | value | value as object, `unbox.any` or `castclass` |
//! | [`NeedsParentStackNode`] | value | delegates after checking ancestors |
//! | [`NewObjectNode`] | value | arguments, `newobj` |
//! | [`StringConstantNode`] | value | `ldstr` |
//! | [`ManipulationImperativeNode`] | manipulation | `pop`, statement |
//! | [`PropertyAssignmentNode`] | manipulation | value, setter call |
//! | [`ManipulationGroupNode`] | manipulation | `dup` before each child but the last |
//! | [`ValueManipulationNode`] | imperative | value, manipulation |
//! | [`ImperativeBlockNode`] | imperative | statements in order |

mod begin_init;
mod cast;
mod construct;
mod context_local;
mod group;
mod literal;
mod local;
mod manipulation;
mod parent_stack;
mod property;

pub use begin_init::BeginInitNode;
pub use cast::RuntimeCastNode;
pub use construct::NewObjectNode;
pub use context_local::ContextLocalNode;
pub use group::{ImperativeBlockNode, ManipulationGroupNode};
pub use literal::StringConstantNode;
pub use local::{CompilerLocal, LocalInitNode, LocalRefNode};
pub use manipulation::{ManipulationImperativeNode, ValueManipulationNode};
pub use parent_stack::NeedsParentStackNode;
pub use property::PropertyAssignmentNode;
