//! [`CodeEmitter`] implementation that writes method bodies into a [`ModuleDef`].
//!
//! Operands are checked against the opcode and reduced to tokens and slot
//! indices as they are appended. Branch operands keep their label until
//! [`ModuleEmitter::finish`] resolves them, computes byte offsets and
//! installs the body on the method definition. Dropping an emitter without
//! finishing abandons the body.

use std::sync::Arc;

use markup_codegen_core::{
    CodeEmitter, DebugCapture, EmitError, EmitResult, FileSource, Label, Local, OpCode, Operand,
    OperandType, TypeRef,
};
use tracing::{debug, trace};

use crate::body::{Instruction, MethodBody, ResolvedOperand};
use crate::debug::{MethodDebugInfo, SequencePoint};
use crate::documents::Document;
use crate::labels::LabelTable;
use crate::module::ModuleDef;

#[derive(Debug)]
enum PendingOperand {
    Ready(ResolvedOperand),
    Branch(Label),
}

#[derive(Debug)]
struct PendingInstruction {
    opcode: OpCode,
    operand: PendingOperand,
}

#[derive(Debug)]
struct OpenDebugPoint {
    capture: DebugCapture,
    document: Arc<Document>,
    line: u32,
    position: u32,
    start: usize,
}

/// Writes the body of one method or constructor.
#[derive(Debug)]
pub struct ModuleEmitter<'m> {
    module: &'m ModuleDef,
    method: u32,
    method_name: String,
    has_this: bool,
    param_count: usize,
    instructions: Vec<PendingInstruction>,
    locals: Vec<TypeRef>,
    labels: LabelTable,
    debug: MethodDebugInfo,
    open_points: Vec<OpenDebugPoint>,
    last_point_start: Option<usize>,
    next_capture: u32,
}

impl<'m> ModuleEmitter<'m> {
    pub(crate) fn new(
        module: &'m ModuleDef,
        method: u32,
        method_name: String,
        has_this: bool,
        param_count: usize,
    ) -> Self {
        Self {
            module,
            method,
            method_name,
            has_this,
            param_count,
            instructions: Vec::new(),
            locals: Vec::new(),
            labels: LabelTable::new(),
            debug: MethodDebugInfo::default(),
            open_points: Vec::new(),
            last_point_start: None,
            next_capture: 0,
        }
    }

    pub fn module(&self) -> &'m ModuleDef {
        self.module
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    /// Resolve labels, compute offsets and install the body on the method.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn finish(mut self) -> EmitResult<()> {
        if self.labels.has_staged() {
            debug!(method = %self.method_name, "labels marked past the last instruction");
            self.labels.unbind_staged();
        }
        while let Some(point) = self.open_points.last() {
            let capture = point.capture;
            self.end_debug_point(capture);
        }

        let mut offsets = Vec::with_capacity(self.instructions.len());
        let mut offset = 0u32;
        for pending in &self.instructions {
            offsets.push(offset);
            offset += pending.opcode.encoded_size() as u32;
        }

        let mut instructions = Vec::with_capacity(self.instructions.len());
        for (index, pending) in self.instructions.into_iter().enumerate() {
            let operand = match pending.operand {
                PendingOperand::Ready(operand) => operand,
                PendingOperand::Branch(label) => {
                    let target = self.labels.resolve(label).ok_or(EmitError::UnresolvedLabel {
                        label,
                        instruction: index,
                    })?;
                    let displacement = i64::from(offsets[target])
                        - i64::from(offsets[index] + pending.opcode.encoded_size() as u32);
                    if !pending.opcode.operand_type().fits_short_form(displacement) {
                        return Err(EmitError::ShortFormOutOfRange {
                            opcode: pending.opcode,
                            value: displacement,
                        });
                    }
                    ResolvedOperand::Target(target)
                }
            };
            instructions.push(Instruction {
                offset: offsets[index],
                opcode: pending.opcode,
                operand,
            });
        }

        self.debug
            .sequence_points
            .sort_by_key(|point| point.instruction);

        let body = MethodBody {
            instructions,
            locals: self.locals,
            code_size: offset,
            debug: self.debug,
        };
        self.module.install_body(self.method, &self.method_name, body)
    }

    fn resolve_operand(&mut self, opcode: OpCode, operand: Operand) -> EmitResult<PendingOperand> {
        let operand_type = opcode.operand_type();
        let kind = operand.kind_name();
        let unsupported = || EmitError::UnsupportedOperand {
            opcode,
            operand: kind,
        };

        let short_value = match &operand {
            Operand::Int(v) => Some(i64::from(*v)),
            Operand::Local(local) => Some(i64::from(local.index())),
            _ => None,
        };
        if let Some(value) = short_value
            && !operand_type.fits_short_form(value)
        {
            return Err(EmitError::ShortFormOutOfRange { opcode, value });
        }

        let resolved = match (operand_type, operand) {
            (OperandType::InlineNone, Operand::None) => ResolvedOperand::None,
            (OperandType::ShortInlineI | OperandType::InlineI, Operand::Int(v)) => {
                ResolvedOperand::Int(v)
            }
            (OperandType::InlineI8, Operand::Long(v)) => ResolvedOperand::Long(v),
            (OperandType::ShortInlineR, Operand::Float(v)) => ResolvedOperand::Float(v),
            (OperandType::InlineR, Operand::Double(v)) => ResolvedOperand::Double(v),
            (OperandType::InlineString, Operand::String(s)) => ResolvedOperand::Token(
                self.module.with_imports(|imports, _| imports.intern_string(&s)),
            ),
            (OperandType::InlineField, Operand::Field(f)) => {
                ResolvedOperand::Token(self.module.import_field(&f))
            }
            (OperandType::InlineMethod, Operand::Method(m)) => {
                ResolvedOperand::Token(self.module.import_method(&m))
            }
            (OperandType::InlineMethod, Operand::Constructor(c)) => {
                ResolvedOperand::Token(self.module.import_constructor(&c))
            }
            (OperandType::InlineType, Operand::Type(t)) => {
                ResolvedOperand::Token(self.module.import_type(&t))
            }
            (t, Operand::Int(index)) if t.is_argument() => self.resolve_argument(index)?,
            (t, Operand::Int(index)) if t.is_variable() => {
                ResolvedOperand::Local(self.resolve_local_index(index)?)
            }
            (t, Operand::Local(local)) if t.is_variable() => {
                ResolvedOperand::Local(self.resolve_local(&local)?)
            }
            (t, Operand::Label(label)) if t.is_branch_target() => {
                self.labels.check(label)?;
                return Ok(PendingOperand::Branch(label));
            }
            _ => return Err(unsupported()),
        };
        Ok(PendingOperand::Ready(resolved))
    }

    /// Instance methods see `this` at index 0 and their parameters after it.
    fn resolve_argument(&self, index: i32) -> EmitResult<ResolvedOperand> {
        let count = self.param_count + usize::from(self.has_this);
        let slot = usize::try_from(index)
            .ok()
            .filter(|&slot| slot < count)
            .ok_or_else(|| EmitError::ArgumentOutOfRange {
                index,
                count,
                method: self.method_name.clone(),
            })?;
        Ok(match (self.has_this, slot) {
            (true, 0) => ResolvedOperand::This,
            (true, slot) => ResolvedOperand::Parameter((slot - 1) as u16),
            (false, slot) => ResolvedOperand::Parameter(slot as u16),
        })
    }

    fn resolve_local_index(&self, index: i32) -> EmitResult<u16> {
        usize::try_from(index)
            .ok()
            .filter(|&slot| slot < self.locals.len())
            .map(|slot| slot as u16)
            .ok_or(EmitError::LocalOutOfRange {
                index,
                count: self.locals.len(),
            })
    }

    fn resolve_local(&self, local: &Local) -> EmitResult<u16> {
        match self.locals.get(local.index() as usize) {
            Some(ty) if ty == local.local_type() => Ok(local.index()),
            _ => Err(EmitError::LocalOutOfRange {
                index: i32::from(local.index()),
                count: self.locals.len(),
            }),
        }
    }
}

impl CodeEmitter for ModuleEmitter<'_> {
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn emit(&mut self, opcode: OpCode, operand: Operand) -> EmitResult<&mut dyn CodeEmitter> {
        let operand = self.resolve_operand(opcode, operand)?;
        let index = self.instructions.len();
        trace!(index, %opcode, "emit");
        self.instructions.push(PendingInstruction { opcode, operand });
        self.labels.bind_staged(index);
        Ok(self)
    }

    fn define_local(&mut self, ty: &TypeRef) -> EmitResult<Local> {
        let index = u16::try_from(self.locals.len()).map_err(|_| EmitError::InvalidDefinition {
            message: format!("too many locals in '{}'", self.method_name),
        })?;
        self.module.import_type(ty);
        self.locals.push(ty.clone());
        Ok(Local::new(index, ty.clone()))
    }

    fn define_label(&mut self) -> Label {
        self.labels.define()
    }

    fn mark_label(&mut self, label: Label) -> EmitResult<&mut dyn CodeEmitter> {
        self.labels.stage(label)?;
        Ok(self)
    }

    fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    fn begin_debug_point(
        &mut self,
        file: &dyn FileSource,
        line: u32,
        position: u32,
    ) -> EmitResult<Option<DebugCapture>> {
        let document = self.module.document_cache().get_or_create(file);
        let start = self.instructions.len();
        if self.last_point_start == Some(start) {
            return Ok(None);
        }
        self.last_point_start = Some(start);

        let capture = DebugCapture::new(self.next_capture);
        self.next_capture += 1;
        self.open_points.push(OpenDebugPoint {
            capture,
            document,
            line,
            position,
            start,
        });
        Ok(Some(capture))
    }

    fn end_debug_point(&mut self, capture: DebugCapture) {
        let Some(at) = self.open_points.iter().position(|p| p.capture == capture) else {
            return;
        };
        let point = self.open_points.remove(at);
        if self.instructions.len() <= point.start {
            return;
        }
        self.debug.add_point(SequencePoint {
            instruction: point.start,
            document: point.document,
            start_line: point.line,
            start_column: point.position,
            end_line: point.line,
            end_column: point.position + 1,
        });
    }
}
