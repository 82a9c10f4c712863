//! Errors raised while generating code.
//!
//! Every variant is a compile-time defect that aborts the method or module
//! being generated. Nothing here is retried, and a method body that produced
//! an error is never finalized into the module.
//!
//! ```text
//! EmitError
//! ├── Instruction stream   - UnsupportedOperand, ShortFormOutOfRange, UnresolvedLabel,
//! │                          UnknownLabel, ArgumentOutOfRange, LocalOutOfRange
//! ├── Node protocol        - StackContract, UninitializedLocal, MissingContextLocal,
//! │                          MissingParentStack, InitHookMismatch
//! └── Module construction  - ForeignMember, BodyAlreadyFinalized, InvalidDefinition
//! ```

use thiserror::Error;

use crate::{Label, LineInfo, OpCode};

/// Errors produced by emitters, type builders and IR nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    /// An opcode was paired with an operand kind the backend cannot encode.
    #[error("opcode '{opcode}' does not accept an operand of kind '{operand}'")]
    UnsupportedOperand {
        opcode: OpCode,
        operand: &'static str,
    },

    /// A short-form opcode was given an immediate, slot or branch
    /// displacement that does not fit its 8-bit encoding.
    #[error("'{opcode}' cannot encode {value} in its short form")]
    ShortFormOutOfRange { opcode: OpCode, value: i64 },

    /// A branch targets a label that was never marked.
    #[error("branch at instruction {instruction} targets {label}, which was never marked")]
    UnresolvedLabel { label: Label, instruction: usize },

    /// A label that this emitter did not define.
    #[error("{label} was not defined by this emitter")]
    UnknownLabel { label: Label },

    /// Argument slot index outside the method's parameter list.
    #[error("argument index {index} is out of range for '{method}' ({count} slots)")]
    ArgumentOutOfRange {
        index: i32,
        count: usize,
        method: String,
    },

    /// Local slot index outside the method's locals table.
    #[error("local index {index} is out of range ({count} locals defined)")]
    LocalOutOfRange { index: i32, count: usize },

    /// A node broke its stack contract or the one its caller expected.
    #[error("{node} at {line}: {message}")]
    StackContract {
        node: &'static str,
        line: LineInfo,
        message: String,
    },

    /// A compiler local was read before any node stored into it.
    #[error("attempt to read uninitialized local variable at {line}")]
    UninitializedLocal { line: LineInfo },

    /// The method being compiled has no context local.
    #[error("no context local is available at {line}")]
    MissingContextLocal { line: LineInfo },

    /// A node that depends on its ancestors was emitted without any.
    #[error("{node} at {line} requires the parent node stack, but none was recorded")]
    MissingParentStack { node: &'static str, line: LineInfo },

    /// The configured initialization hook is not callable on its hook type.
    #[error("initialization hook '{method}' is not declared on '{hook_type}'")]
    InitHookMismatch { hook_type: String, method: String },

    /// A member handle that does not belong to the module it was used with.
    #[error("'{member}' is not defined in {module}")]
    ForeignMember { member: String, module: String },

    /// A method body can only be finalized once.
    #[error("body of '{method}' has already been finalized")]
    BodyAlreadyFinalized { method: String },

    /// A definition request that the module cannot represent.
    #[error("invalid definition: {message}")]
    InvalidDefinition { message: String },
}

/// Result type used throughout code generation.
pub type EmitResult<T> = Result<T, EmitError>;
