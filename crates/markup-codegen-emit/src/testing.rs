//! In-memory emitter and fixtures for node tests.

use markup_codegen_core::{
    CodeEmitter, ConstructorRef, CoreTypes, DebugCapture, EmitResult, FileSource, Label, Local,
    MethodAttributes, MethodRef, OpCode, Operand, PropertyRef, TypeDescriptor, TypeKind, TypeRef,
};

/// A debug capture as seen by [`RecordingEmitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPoint {
    pub path: String,
    pub line: u32,
    pub position: u32,
    pub start: usize,
    pub end: Option<usize>,
}

/// Records instructions as `(opcode, operand)` pairs without resolving them.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub instructions: Vec<(OpCode, Operand)>,
    pub locals: Vec<Local>,
    pub labels: u32,
    pub points: Vec<RecordedPoint>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opcodes(&self) -> Vec<OpCode> {
        self.instructions.iter().map(|(op, _)| *op).collect()
    }

    pub fn count(&self, opcode: OpCode) -> usize {
        self.instructions.iter().filter(|(op, _)| *op == opcode).count()
    }
}

impl CodeEmitter for RecordingEmitter {
    fn emit(&mut self, opcode: OpCode, operand: Operand) -> EmitResult<&mut dyn CodeEmitter> {
        self.instructions.push((opcode, operand));
        Ok(self)
    }

    fn define_local(&mut self, ty: &TypeRef) -> EmitResult<Local> {
        let local = Local::new(self.locals.len() as u16, ty.clone());
        self.locals.push(local.clone());
        Ok(local)
    }

    fn define_label(&mut self) -> Label {
        self.labels += 1;
        Label::new(self.labels - 1)
    }

    fn mark_label(&mut self, _label: Label) -> EmitResult<&mut dyn CodeEmitter> {
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
        self.points.push(RecordedPoint {
            path: file.file_path().to_string(),
            line,
            position,
            start: self.instructions.len(),
            end: None,
        });
        Ok(Some(DebugCapture::new(self.points.len() as u32 - 1)))
    }

    fn end_debug_point(&mut self, capture: DebugCapture) {
        if let Some(point) = self.points.get_mut(capture.id() as usize) {
            point.end = Some(self.instructions.len());
        }
    }
}

/// Runtime types shared by node tests.
pub struct Fixture {
    pub core: CoreTypes,
    pub control: TypeRef,
    pub point: TypeRef,
    pub init: TypeRef,
    pub begin_init: MethodRef,
}

impl Fixture {
    pub fn new() -> Self {
        let core = CoreTypes::default();
        let init = TypeRef::external(
            "System.ComponentModel",
            "System.ComponentModel.ISupportInitialize",
            TypeKind::Interface,
        );
        let begin_init = MethodRef::new(&init, "BeginInit", &core.void, &[], MethodAttributes::PUBLIC);
        let control = TypeRef::new(
            TypeDescriptor::external("Controls", "Controls.Control", TypeKind::Class)
                .with_base(&core.object)
                .with_interface(&init),
        );
        let point = TypeRef::new(
            TypeDescriptor::external("Controls", "Controls.Point", TypeKind::ValueType)
                .with_base(&core.value_type),
        );
        Self {
            core,
            control,
            point,
            init,
            begin_init,
        }
    }

    pub fn control_ctor(&self) -> ConstructorRef {
        ConstructorRef::new(&self.control, &[])
    }

    pub fn text_property(&self) -> PropertyRef {
        let setter = MethodRef::new(
            &self.control,
            "set_Text",
            &self.core.void,
            std::slice::from_ref(&self.core.string),
            MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL,
        );
        PropertyRef::new(&self.control, "Text", &self.core.string, None, Some(&setter))
    }
}
