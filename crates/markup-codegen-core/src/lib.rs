//! Markup Codegen Core
//!
//! Shared vocabulary of the markup code generator: type and member handles,
//! the instruction set, and the two capability contracts a backend implements.
//!
//! ## Modules
//!
//! - [`types`]: Type and member handles, attribute flags, core runtime types
//! - [`opcode`]: Opcodes and the operand kinds they accept
//! - [`operand`]: Instruction operands, locals and labels
//! - [`emitter`]: The [`CodeEmitter`] contract, helpers and debug capture
//! - [`builder`]: The [`TypeBuilder`] contract
//! - [`source`]: Source positions and source files
//! - [`error`]: The [`EmitError`] taxonomy

pub mod builder;
pub mod emitter;
pub mod error;
pub mod opcode;
pub mod operand;
pub mod source;
mod type_hash;
pub mod types;

pub use builder::{MethodDecl, TypeBuilder};
pub use emitter::{CodeEmitter, DebugBlock, DebugCapture, EmitterExt};
pub use error::{EmitError, EmitResult};
pub use opcode::{OpCode, OperandType};
pub use operand::{Label, Local, Operand};
pub use source::{FileSource, InMemorySource, LineInfo};
pub use type_hash::{TypeHash, hash_domains};
pub use types::{
    ConstructorRef, CoreTypes, FieldAttributes, FieldRef, MemberDef, MethodAttributes, MethodRef,
    ModuleId, PropertyRef, TypeAttributes, TypeDescriptor, TypeKind, TypeOrigin, TypeRef,
    TypeVisibility,
};
