//! Instruction operands and the per-method handles they refer to.

use std::fmt;

use crate::types::{ConstructorRef, FieldRef, MethodRef, TypeRef};

/// A typed, method-scoped local slot.
///
/// Only meaningful to the emitter that defined it.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    index: u16,
    ty: TypeRef,
}

impl Local {
    pub fn new(index: u16, ty: TypeRef) -> Self {
        Self { index, ty }
    }

    /// Slot index in the method's locals table.
    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn local_type(&self) -> &TypeRef {
        &self.ty
    }
}

/// A branch target, bound to an instruction before the method is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(u32);

impl Label {
    pub fn new(id: u32) -> Self {
        Label(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// The operand passed alongside an opcode.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Field(FieldRef),
    Method(MethodRef),
    Constructor(ConstructorRef),
    Type(TypeRef),
    Local(Local),
    Label(Label),
}

impl Operand {
    /// Short name of the operand kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::None => "none",
            Operand::Int(_) => "int32",
            Operand::Long(_) => "int64",
            Operand::Float(_) => "float32",
            Operand::Double(_) => "float64",
            Operand::String(_) => "string",
            Operand::Field(_) => "field",
            Operand::Method(_) => "method",
            Operand::Constructor(_) => "constructor",
            Operand::Type(_) => "type",
            Operand::Local(_) => "local",
            Operand::Label(_) => "label",
        }
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Int(value)
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Long(value)
    }
}

impl From<f32> for Operand {
    fn from(value: f32) -> Self {
        Operand::Float(value)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Double(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::String(value.to_string())
    }
}

impl From<&FieldRef> for Operand {
    fn from(value: &FieldRef) -> Self {
        Operand::Field(value.clone())
    }
}

impl From<&MethodRef> for Operand {
    fn from(value: &MethodRef) -> Self {
        Operand::Method(value.clone())
    }
}

impl From<&ConstructorRef> for Operand {
    fn from(value: &ConstructorRef) -> Self {
        Operand::Constructor(value.clone())
    }
}

impl From<&TypeRef> for Operand {
    fn from(value: &TypeRef) -> Self {
        Operand::Type(value.clone())
    }
}

impl From<&Local> for Operand {
    fn from(value: &Local) -> Self {
        Operand::Local(value.clone())
    }
}

impl From<Label> for Operand {
    fn from(value: Label) -> Self {
        Operand::Label(value)
    }
}
