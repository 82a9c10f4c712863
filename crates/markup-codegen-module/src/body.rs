//! Finalized method bodies.
//!
//! A [`MethodBody`] is what an emitter leaves behind on the method definition
//! once [`finish`](crate::ModuleEmitter::finish) succeeds: instructions with
//! byte offsets, operands reduced to tokens and slot indices, branch targets
//! resolved to instruction indices.

use std::fmt;

use markup_codegen_core::{OpCode, TypeRef};

use crate::debug::MethodDebugInfo;
use crate::tokens::Token;

/// Operand of a finalized instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedOperand {
    None,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Type, field, method, constructor or string token.
    Token(Token),
    /// Local slot index.
    Local(u16),
    /// Implicit instance argument.
    This,
    /// Index into the declared parameter list.
    Parameter(u16),
    /// Index of the target instruction.
    Target(usize),
}

impl fmt::Display for ResolvedOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedOperand::None => Ok(()),
            ResolvedOperand::Int(v) => write!(f, "{v}"),
            ResolvedOperand::Long(v) => write!(f, "{v}"),
            ResolvedOperand::Float(v) => write!(f, "{v}"),
            ResolvedOperand::Double(v) => write!(f, "{v}"),
            ResolvedOperand::Token(t) => write!(f, "{t}"),
            ResolvedOperand::Local(i) => write!(f, "V_{i}"),
            ResolvedOperand::This => f.write_str("this"),
            ResolvedOperand::Parameter(i) => write!(f, "A_{i}"),
            ResolvedOperand::Target(i) => write!(f, "IL#{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset from the start of the body.
    pub offset: u32,
    pub opcode: OpCode,
    pub operand: ResolvedOperand,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04x}: {}", self.offset, self.opcode)?;
        if self.operand != ResolvedOperand::None {
            write!(f, " {}", self.operand)?;
        }
        Ok(())
    }
}

/// The body stored on a method definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodBody {
    pub instructions: Vec<Instruction>,
    pub locals: Vec<TypeRef>,
    /// Total encoded size in bytes.
    pub code_size: u32,
    pub debug: MethodDebugInfo,
}

impl MethodBody {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions.iter().map(|i| i.opcode).collect()
    }

    /// Byte offset a branch at `index` jumps to.
    pub fn branch_target_offset(&self, index: usize) -> Option<u32> {
        match self.instructions.get(index)?.operand {
            ResolvedOperand::Target(target) => self.instructions.get(target).map(|i| i.offset),
            _ => None,
        }
    }

    /// Listing in assembler syntax, one instruction per line.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for instruction in &self.instructions {
            out.push_str(&instruction.to_string());
            out.push('\n');
        }
        out
    }
}
