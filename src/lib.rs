//! Markup Codegen
//!
//! Code generation backend of a declarative markup compiler. The compiler
//! front end lowers markup into an IR tree; this crate turns that tree into
//! method bodies and type definitions of a generated module.
//!
//! - [`core`]: type handles, instruction set and the emitter/builder contracts
//! - [`module`]: the module-writing backend
//! - [`emit`]: the node emission protocol and concrete nodes
//!
//! # Example
//!
//! ```ignore
//! use markup_codegen::prelude::*;
//!
//! let module = ModuleDef::new("Views", CoreTypes::default());
//! let mut view = module.define_type(
//!     "Views",
//!     "MainView",
//!     None,
//!     TypeAttributes::empty(),
//!     TypeVisibility::Public,
//! )?;
//! let build = view.define_method(MethodDecl::new("Build", &module.core_types().void).public())?;
//!
//! let config = EmitConfiguration::new(module.core_types());
//! let mut codegen = module.emitter(&build)?;
//! EmitContext::new(&config)
//!     .with_file(&source)
//!     .emit_imperative(&root, &mut codegen)?;
//! codegen.ret()?;
//! codegen.finish()?;
//! ```

pub use markup_codegen_core as core;
pub use markup_codegen_emit as emit;
pub use markup_codegen_module as module;

pub mod prelude {
    pub use markup_codegen_core::{
        CodeEmitter, ConstructorRef, CoreTypes, EmitError, EmitResult, EmitterExt, FieldRef,
        FileSource, InMemorySource, Label, LineInfo, Local, MethodDecl, MethodRef, OpCode,
        Operand, PropertyRef, TypeAttributes, TypeBuilder, TypeDescriptor, TypeKind, TypeRef,
        TypeVisibility,
    };
    pub use markup_codegen_emit::{
        AstNode, AstVisitor, EmitConfiguration, EmitContext, ImperativeNode, ManipulationNode,
        NodeEmitResult, SupportInitialize, ValueNode,
    };
    pub use markup_codegen_module::{MethodBody, ModuleDef, ModuleEmitter, ModuleTypeBuilder};
}
