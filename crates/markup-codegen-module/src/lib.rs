//! Markup Codegen Module
//!
//! The module-writing backend. A [`ModuleDef`] collects the types, members
//! and method bodies of one generated module; [`ModuleTypeBuilder`] and
//! [`ModuleEmitter`] implement the core construction and emission contracts
//! on top of it.
//!
//! ## Modules
//!
//! - [`module`]: The module and its definition tables
//! - [`type_builder`]: Type and member definition
//! - [`emitter`]: Method body emission and finalization
//! - [`body`]: Finalized method bodies
//! - [`debug`]: Sequence points and debug scopes
//! - [`documents`]: Per-module debug document cache
//! - [`tokens`]: Metadata tokens and reference tables

pub mod body;
pub mod debug;
pub mod documents;
pub mod emitter;
mod labels;
pub mod module;
pub mod tokens;
pub mod type_builder;

pub use body::{Instruction, MethodBody, ResolvedOperand};
pub use debug::{DebugScope, MethodDebugInfo, SequencePoint};
pub use documents::{Document, DocumentCache, DocumentKind, HashAlgorithm};
pub use emitter::ModuleEmitter;
pub use module::{BodyOwner, FieldDef, MethodDef, ModuleDef, PropertyDef, TypeDef};
pub use tokens::{ImportTables, MemberRefEntry, MemberRefKind, Token, TypeRefEntry, TypeSpecEntry};
pub use type_builder::ModuleTypeBuilder;
