//! Label bookkeeping for a single method body.
//!
//! Labels are plain ids. Marking stages a label; the next appended
//! instruction binds every staged label to its index. Branch operands keep
//! the label id until the body is finalized, so a label that is re-marked
//! later moves every branch that targets it.

use markup_codegen_core::{EmitError, EmitResult, Label};

/// Tracks label definitions and their bindings.
#[derive(Debug, Default)]
pub struct LabelTable {
    /// Bound instruction index per label id.
    bindings: Vec<Option<usize>>,
    /// Labels waiting for the next instruction.
    staged: Vec<Label>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new unbound label.
    pub fn define(&mut self) -> Label {
        let label = Label::new(self.bindings.len() as u32);
        self.bindings.push(None);
        label
    }

    /// Check that `label` came from this table.
    pub fn check(&self, label: Label) -> EmitResult<()> {
        if (label.id() as usize) < self.bindings.len() {
            Ok(())
        } else {
            Err(EmitError::UnknownLabel { label })
        }
    }

    /// Stage `label` for binding to the next instruction.
    pub fn stage(&mut self, label: Label) -> EmitResult<()> {
        self.check(label)?;
        if !self.staged.contains(&label) {
            self.staged.push(label);
        }
        Ok(())
    }

    /// Bind every staged label to `instruction`.
    pub fn bind_staged(&mut self, instruction: usize) {
        for label in self.staged.drain(..) {
            self.bindings[label.id() as usize] = Some(instruction);
        }
    }

    /// Labels marked after the last instruction lose any earlier binding.
    pub fn unbind_staged(&mut self) {
        for label in self.staged.drain(..) {
            self.bindings[label.id() as usize] = None;
        }
    }

    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Instruction index `label` is bound to, if any.
    pub fn resolve(&self, label: Label) -> Option<usize> {
        self.bindings.get(label.id() as usize).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_label_is_unbound() {
        let mut table = LabelTable::new();
        let label = table.define();
        assert_eq!(table.resolve(label), None);
        assert!(table.check(label).is_ok());
    }

    #[test]
    fn staged_labels_bind_together() {
        let mut table = LabelTable::new();
        let a = table.define();
        let b = table.define();
        table.stage(a).unwrap();
        table.stage(b).unwrap();
        assert!(table.has_staged());

        table.bind_staged(4);
        assert_eq!(table.resolve(a), Some(4));
        assert_eq!(table.resolve(b), Some(4));
        assert!(!table.has_staged());
    }

    #[test]
    fn rebinding_moves_label() {
        let mut table = LabelTable::new();
        let label = table.define();
        table.stage(label).unwrap();
        table.bind_staged(1);
        table.stage(label).unwrap();
        table.bind_staged(6);
        assert_eq!(table.resolve(label), Some(6));
    }

    #[test]
    fn unknown_label_rejected() {
        let mut table = LabelTable::new();
        let foreign = Label::new(3);
        assert_eq!(
            table.stage(foreign),
            Err(EmitError::UnknownLabel { label: foreign })
        );
    }

    #[test]
    fn trailing_marks_unbind() {
        let mut table = LabelTable::new();
        let label = table.define();
        table.stage(label).unwrap();
        table.bind_staged(0);
        table.stage(label).unwrap();
        table.unbind_staged();
        assert_eq!(table.resolve(label), None);
    }
}
