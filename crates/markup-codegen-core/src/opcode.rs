//! Instruction set of the target stack machine.
//!
//! Opcodes carry their metadata encoding as the discriminant: single-byte
//! opcodes use their byte value, two-byte opcodes are prefixed with `0xFE`.
//! Each opcode declares the [`OperandType`] it expects, which is what
//! backends check operands against.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Kind of inline operand an opcode expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    InlineNone,
    /// Signed 8-bit immediate.
    ShortInlineI,
    /// Signed 32-bit immediate.
    InlineI,
    /// Signed 64-bit immediate.
    InlineI8,
    /// 32-bit float immediate.
    ShortInlineR,
    /// 64-bit float immediate.
    InlineR,
    InlineString,
    InlineField,
    InlineMethod,
    InlineType,
    /// Local slot, 8-bit index.
    ShortInlineVar,
    /// Local slot, 16-bit index.
    InlineVar,
    /// Argument slot, 8-bit index.
    ShortInlineArg,
    /// Argument slot, 16-bit index.
    InlineArg,
    /// Branch target, 8-bit displacement.
    ShortInlineBrTarget,
    /// Branch target, 32-bit displacement.
    InlineBrTarget,
}

impl OperandType {
    /// Encoded size of the operand in bytes.
    pub fn size(self) -> usize {
        match self {
            OperandType::InlineNone => 0,
            OperandType::ShortInlineI
            | OperandType::ShortInlineVar
            | OperandType::ShortInlineArg
            | OperandType::ShortInlineBrTarget => 1,
            OperandType::InlineVar | OperandType::InlineArg => 2,
            OperandType::InlineI
            | OperandType::ShortInlineR
            | OperandType::InlineString
            | OperandType::InlineField
            | OperandType::InlineMethod
            | OperandType::InlineType
            | OperandType::InlineBrTarget => 4,
            OperandType::InlineI8 | OperandType::InlineR => 8,
        }
    }

    /// Whether the operand addresses an argument slot.
    pub fn is_argument(self) -> bool {
        matches!(self, OperandType::ShortInlineArg | OperandType::InlineArg)
    }

    /// Whether the operand addresses a local slot.
    pub fn is_variable(self) -> bool {
        matches!(self, OperandType::ShortInlineVar | OperandType::InlineVar)
    }

    pub fn is_branch_target(self) -> bool {
        matches!(
            self,
            OperandType::ShortInlineBrTarget | OperandType::InlineBrTarget
        )
    }

    /// Whether `value` survives the 8-bit encoding of a short operand.
    ///
    /// Immediates and branch displacements are signed; slot indices are
    /// unsigned, and negative ones are left to slot resolution.
    pub fn fits_short_form(self, value: i64) -> bool {
        match self {
            OperandType::ShortInlineI | OperandType::ShortInlineBrTarget => {
                i8::try_from(value).is_ok()
            }
            OperandType::ShortInlineVar | OperandType::ShortInlineArg => {
                value <= i64::from(u8::MAX)
            }
            _ => true,
        }
    }
}

/// Operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum OpCode {
    // =========================================================================
    // Arguments and locals, short forms
    // =========================================================================
    Nop = 0x00,
    LdargS = 0x0E,
    LdargaS = 0x0F,
    StargS = 0x10,
    LdlocS = 0x11,
    LdlocaS = 0x12,
    StlocS = 0x13,

    // =========================================================================
    // Constants
    // =========================================================================
    Ldnull = 0x14,
    LdcI4M1 = 0x15,
    LdcI4_0 = 0x16,
    LdcI4_1 = 0x17,
    LdcI4_2 = 0x18,
    LdcI4_3 = 0x19,
    LdcI4_4 = 0x1A,
    LdcI4_5 = 0x1B,
    LdcI4_6 = 0x1C,
    LdcI4_7 = 0x1D,
    LdcI4_8 = 0x1E,
    LdcI4S = 0x1F,
    LdcI4 = 0x20,
    LdcI8 = 0x21,
    LdcR4 = 0x22,
    LdcR8 = 0x23,

    // =========================================================================
    // Stack and calls
    // =========================================================================
    Dup = 0x25,
    Pop = 0x26,
    Call = 0x28,
    Ret = 0x2A,

    // =========================================================================
    // Branches
    // =========================================================================
    BrS = 0x2B,
    BrfalseS = 0x2C,
    BrtrueS = 0x2D,
    Br = 0x38,
    Brfalse = 0x39,
    Brtrue = 0x3A,

    // =========================================================================
    // Objects
    // =========================================================================
    Callvirt = 0x6F,
    Ldstr = 0x72,
    Newobj = 0x73,
    Castclass = 0x74,
    Isinst = 0x75,
    Ldfld = 0x7B,
    Stfld = 0x7D,
    Ldsfld = 0x7E,
    Stsfld = 0x80,
    Box = 0x8C,
    UnboxAny = 0xA5,

    // =========================================================================
    // Arguments and locals, two-byte forms
    // =========================================================================
    Ldarg = 0xFE09,
    Ldarga = 0xFE0A,
    Starg = 0xFE0B,
    Ldloc = 0xFE0C,
    Ldloca = 0xFE0D,
    Stloc = 0xFE0E,
}

impl OpCode {
    /// Decode an opcode from its metadata encoding.
    pub fn from_u16(value: u16) -> Option<Self> {
        OpCode::try_from(value).ok()
    }

    /// Metadata encoding of this opcode.
    pub fn value(self) -> u16 {
        self.into()
    }

    /// Encoded size of the opcode itself (1 or 2 bytes).
    pub fn size(self) -> usize {
        if self.value() > 0xFF { 2 } else { 1 }
    }

    /// Encoded size of opcode plus operand.
    pub fn encoded_size(self) -> usize {
        self.size() + self.operand_type().size()
    }

    /// The operand this opcode expects.
    pub fn operand_type(self) -> OperandType {
        use OpCode::*;
        match self {
            LdargS | LdargaS | StargS => OperandType::ShortInlineArg,
            Ldarg | Ldarga | Starg => OperandType::InlineArg,
            LdlocS | LdlocaS | StlocS => OperandType::ShortInlineVar,
            Ldloc | Ldloca | Stloc => OperandType::InlineVar,
            LdcI4S => OperandType::ShortInlineI,
            LdcI4 => OperandType::InlineI,
            LdcI8 => OperandType::InlineI8,
            LdcR4 => OperandType::ShortInlineR,
            LdcR8 => OperandType::InlineR,
            Ldstr => OperandType::InlineString,
            Call | Callvirt | Newobj => OperandType::InlineMethod,
            Ldfld | Stfld | Ldsfld | Stsfld => OperandType::InlineField,
            Castclass | Isinst | Box | UnboxAny => OperandType::InlineType,
            BrS | BrfalseS | BrtrueS => OperandType::ShortInlineBrTarget,
            Br | Brfalse | Brtrue => OperandType::InlineBrTarget,
            Nop | Ldnull | LdcI4M1 | LdcI4_0 | LdcI4_1 | LdcI4_2 | LdcI4_3 | LdcI4_4 | LdcI4_5
            | LdcI4_6 | LdcI4_7 | LdcI4_8 | Dup | Pop | Ret => OperandType::InlineNone,
        }
    }

    /// Assembly mnemonic, e.g. `unbox.any`.
    pub fn name(self) -> &'static str {
        use OpCode::*;
        match self {
            Nop => "nop",
            LdargS => "ldarg.s",
            LdargaS => "ldarga.s",
            StargS => "starg.s",
            LdlocS => "ldloc.s",
            LdlocaS => "ldloca.s",
            StlocS => "stloc.s",
            Ldnull => "ldnull",
            LdcI4M1 => "ldc.i4.m1",
            LdcI4_0 => "ldc.i4.0",
            LdcI4_1 => "ldc.i4.1",
            LdcI4_2 => "ldc.i4.2",
            LdcI4_3 => "ldc.i4.3",
            LdcI4_4 => "ldc.i4.4",
            LdcI4_5 => "ldc.i4.5",
            LdcI4_6 => "ldc.i4.6",
            LdcI4_7 => "ldc.i4.7",
            LdcI4_8 => "ldc.i4.8",
            LdcI4S => "ldc.i4.s",
            LdcI4 => "ldc.i4",
            LdcI8 => "ldc.i8",
            LdcR4 => "ldc.r4",
            LdcR8 => "ldc.r8",
            Dup => "dup",
            Pop => "pop",
            Call => "call",
            Ret => "ret",
            BrS => "br.s",
            BrfalseS => "brfalse.s",
            BrtrueS => "brtrue.s",
            Br => "br",
            Brfalse => "brfalse",
            Brtrue => "brtrue",
            Callvirt => "callvirt",
            Ldstr => "ldstr",
            Newobj => "newobj",
            Castclass => "castclass",
            Isinst => "isinst",
            Ldfld => "ldfld",
            Stfld => "stfld",
            Ldsfld => "ldsfld",
            Stsfld => "stsfld",
            Box => "box",
            UnboxAny => "unbox.any",
            Ldarg => "ldarg",
            Ldarga => "ldarga",
            Starg => "starg",
            Ldloc => "ldloc",
            Ldloca => "ldloca",
            Stloc => "stloc",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_encoding() {
        assert_eq!(OpCode::Nop.value(), 0x00);
        assert_eq!(OpCode::Ldloc.value(), 0xFE0C);
        assert_eq!(OpCode::from_u16(0x72), Some(OpCode::Ldstr));
        assert_eq!(OpCode::from_u16(0x01), None);
        assert_eq!(OpCode::Ldloc.size(), 2);
    }

    #[test]
    fn opcode_sizes() {
        assert_eq!(OpCode::Dup.encoded_size(), 1);
        assert_eq!(OpCode::BrS.encoded_size(), 2);
        assert_eq!(OpCode::Call.encoded_size(), 5);
        assert_eq!(OpCode::Ldloc.encoded_size(), 4);
        assert_eq!(OpCode::LdcI8.encoded_size(), 9);
    }

    #[test]
    fn operand_types() {
        assert!(OpCode::LdargS.operand_type().is_argument());
        assert!(OpCode::Starg.operand_type().is_argument());
        assert!(OpCode::StlocS.operand_type().is_variable());
        assert_eq!(OpCode::Ret.operand_type(), OperandType::InlineNone);
        assert!(OpCode::Brtrue.operand_type().is_branch_target());
        assert_eq!(OpCode::UnboxAny.operand_type(), OperandType::InlineType);
        assert_eq!(OpCode::Pop.operand_type(), OperandType::InlineNone);
    }

    #[test]
    fn short_form_ranges() {
        assert!(OperandType::ShortInlineI.fits_short_form(-128));
        assert!(!OperandType::ShortInlineI.fits_short_form(128));
        assert!(OperandType::ShortInlineVar.fits_short_form(255));
        assert!(!OperandType::ShortInlineArg.fits_short_form(256));
        assert!(!OperandType::ShortInlineBrTarget.fits_short_form(-129));
        assert!(OperandType::InlineI.fits_short_form(i64::from(i32::MAX)));
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::UnboxAny.name(), "unbox.any");
        assert_eq!(OpCode::Castclass.to_string(), "castclass");
    }
}
