//! The instruction emitter contract.
//!
//! [`CodeEmitter`] is the backend-neutral sink a method body is written into.
//! IR nodes only ever see `&mut dyn CodeEmitter`, so any backend that honors
//! this contract can be substituted without touching node emission.
//!
//! [`EmitterExt`] adds chainable helpers for the common instruction shapes,
//! and [`DebugBlock`] is the scoped guard returned by
//! [`EmitterExt::begin_debug_block`].
//!
//! # Example
//!
//! ```ignore
//! let local = codegen.define_local(&button)?;
//! codegen
//!     .newobj(&button_ctor)?
//!     .dup()?
//!     .stloc(&local)?;
//! ```

use std::ops::{Deref, DerefMut};

use crate::{
    ConstructorRef, EmitResult, FieldRef, FileSource, Label, Local, MethodRef, OpCode, Operand,
    TypeRef,
};

/// Handle to an in-progress debug capture, returned by
/// [`CodeEmitter::begin_debug_point`] and handed back on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugCapture(u32);

impl DebugCapture {
    pub fn new(id: u32) -> Self {
        DebugCapture(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Per-method instruction sink.
///
/// Instructions are appended strictly in order. Locals and labels are only
/// valid with the emitter that created them.
pub trait CodeEmitter {
    /// Append one instruction.
    ///
    /// Fails with [`EmitError::UnsupportedOperand`](crate::EmitError::UnsupportedOperand)
    /// when the opcode cannot take the operand.
    fn emit(&mut self, opcode: OpCode, operand: Operand) -> EmitResult<&mut dyn CodeEmitter>;

    /// Allocate a new typed local slot.
    fn define_local(&mut self, ty: &TypeRef) -> EmitResult<Local>;

    /// Create an unbound label.
    fn define_label(&mut self) -> Label;

    /// Bind `label` to the next appended instruction.
    ///
    /// Several labels may be marked before that instruction exists; all of
    /// them resolve to it.
    fn mark_label(&mut self, label: Label) -> EmitResult<&mut dyn CodeEmitter>;

    /// Number of instructions appended so far.
    fn instruction_count(&self) -> usize;

    /// Start mapping the instructions that follow to a source position.
    ///
    /// Returns `None` when the capture collapses into the previous one
    /// because no instruction was appended in between. Prefer
    /// [`EmitterExt::begin_debug_block`], which guarantees the release.
    fn begin_debug_point(
        &mut self,
        file: &dyn FileSource,
        line: u32,
        position: u32,
    ) -> EmitResult<Option<DebugCapture>>;

    /// Release a capture started by [`begin_debug_point`](Self::begin_debug_point).
    fn end_debug_point(&mut self, capture: DebugCapture);
}

/// Chainable helpers available on every [`CodeEmitter`], including trait objects.
pub trait EmitterExt: CodeEmitter {
    fn nop(&mut self) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Nop, Operand::None)
    }

    fn dup(&mut self) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Dup, Operand::None)
    }

    fn pop(&mut self) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Pop, Operand::None)
    }

    fn ret(&mut self) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ret, Operand::None)
    }

    fn ldnull(&mut self) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldnull, Operand::None)
    }

    /// Push an int32 constant using the shortest encoding.
    fn ldc_i4(&mut self, value: i32) -> EmitResult<&mut dyn CodeEmitter> {
        let short = match value {
            -1 => Some(OpCode::LdcI4M1),
            0 => Some(OpCode::LdcI4_0),
            1 => Some(OpCode::LdcI4_1),
            2 => Some(OpCode::LdcI4_2),
            3 => Some(OpCode::LdcI4_3),
            4 => Some(OpCode::LdcI4_4),
            5 => Some(OpCode::LdcI4_5),
            6 => Some(OpCode::LdcI4_6),
            7 => Some(OpCode::LdcI4_7),
            8 => Some(OpCode::LdcI4_8),
            _ => None,
        };
        match short {
            Some(op) => self.emit(op, Operand::None),
            None if (-128..=127).contains(&value) => self.emit(OpCode::LdcI4S, Operand::Int(value)),
            None => self.emit(OpCode::LdcI4, Operand::Int(value)),
        }
    }

    fn ldc_i8(&mut self, value: i64) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::LdcI8, Operand::Long(value))
    }

    fn ldc_r4(&mut self, value: f32) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::LdcR4, Operand::Float(value))
    }

    fn ldc_r8(&mut self, value: f64) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::LdcR8, Operand::Double(value))
    }

    fn ldstr(&mut self, value: &str) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldstr, Operand::String(value.to_string()))
    }

    fn ldloc(&mut self, local: &Local) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldloc, Operand::Local(local.clone()))
    }

    fn ldloca(&mut self, local: &Local) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldloca, Operand::Local(local.clone()))
    }

    fn stloc(&mut self, local: &Local) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Stloc, Operand::Local(local.clone()))
    }

    /// Load an argument; for instance methods index 0 is `this`.
    fn ldarg(&mut self, index: u16) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldarg, Operand::Int(i32::from(index)))
    }

    fn starg(&mut self, index: u16) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Starg, Operand::Int(i32::from(index)))
    }

    fn ldfld(&mut self, field: &FieldRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldfld, Operand::Field(field.clone()))
    }

    fn stfld(&mut self, field: &FieldRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Stfld, Operand::Field(field.clone()))
    }

    fn ldsfld(&mut self, field: &FieldRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Ldsfld, Operand::Field(field.clone()))
    }

    fn stsfld(&mut self, field: &FieldRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Stsfld, Operand::Field(field.clone()))
    }

    fn newobj(&mut self, ctor: &ConstructorRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Newobj, Operand::Constructor(ctor.clone()))
    }

    /// Call a method, using `callvirt` for reference-type instance methods.
    fn emit_call(&mut self, method: &MethodRef) -> EmitResult<&mut dyn CodeEmitter> {
        let op = if method.is_static() || method.declaring_type().is_value_type() {
            OpCode::Call
        } else {
            OpCode::Callvirt
        };
        self.emit(op, Operand::Method(method.clone()))
    }

    fn box_value(&mut self, ty: &TypeRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Box, Operand::Type(ty.clone()))
    }

    fn unbox_any(&mut self, ty: &TypeRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::UnboxAny, Operand::Type(ty.clone()))
    }

    fn castclass(&mut self, ty: &TypeRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Castclass, Operand::Type(ty.clone()))
    }

    fn isinst(&mut self, ty: &TypeRef) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Isinst, Operand::Type(ty.clone()))
    }

    fn br(&mut self, label: Label) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Br, Operand::Label(label))
    }

    fn brtrue(&mut self, label: Label) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Brtrue, Operand::Label(label))
    }

    fn brfalse(&mut self, label: Label) -> EmitResult<&mut dyn CodeEmitter> {
        self.emit(OpCode::Brfalse, Operand::Label(label))
    }

    /// Map the instructions emitted through the returned guard to a source
    /// position. The mapping is finalized when the guard is dropped, on every
    /// exit path.
    fn begin_debug_block(
        &mut self,
        file: &dyn FileSource,
        line: u32,
        position: u32,
    ) -> EmitResult<DebugBlock<'_, Self>> {
        let capture = self.begin_debug_point(file, line, position)?;
        Ok(DebugBlock {
            emitter: self,
            capture,
        })
    }
}

impl<T: CodeEmitter + ?Sized> EmitterExt for T {}

/// Scoped debug capture.
///
/// Dereferences to the emitter so emission continues through the guard.
pub struct DebugBlock<'e, E: CodeEmitter + ?Sized> {
    emitter: &'e mut E,
    capture: Option<DebugCapture>,
}

impl<E: CodeEmitter + ?Sized> DebugBlock<'_, E> {
    /// `false` when the capture collapsed into the previous one.
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }
}

impl<E: CodeEmitter + ?Sized> Deref for DebugBlock<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.emitter
    }
}

impl<E: CodeEmitter + ?Sized> DerefMut for DebugBlock<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.emitter
    }
}

impl<E: CodeEmitter + ?Sized> Drop for DebugBlock<'_, E> {
    fn drop(&mut self) {
        if let Some(capture) = self.capture.take() {
            self.emitter.end_debug_point(capture);
        }
    }
}
