//! Source mapping of finalized method bodies.

use std::sync::Arc;

use crate::documents::Document;

/// Maps the instruction at `instruction` to a source range.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePoint {
    /// Index of the anchored instruction.
    pub instruction: usize,
    pub document: Arc<Document>,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// Outer lexical scope of a method, opened by its first sequence point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugScope {
    pub start: usize,
    /// `None` extends the scope to the end of the body.
    pub end: Option<usize>,
    /// Index into the module's import scopes; 0 is the default context.
    pub import_scope: u32,
}

impl DebugScope {
    pub fn open(start: usize) -> Self {
        Self {
            start,
            end: None,
            import_scope: 0,
        }
    }
}

/// Debug information attached to a method body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodDebugInfo {
    pub scope: Option<DebugScope>,
    pub sequence_points: Vec<SequencePoint>,
}

impl MethodDebugInfo {
    pub fn is_empty(&self) -> bool {
        self.sequence_points.is_empty()
    }

    pub(crate) fn add_point(&mut self, point: SequencePoint) {
        if self.scope.is_none() {
            self.scope = Some(DebugScope::open(point.instruction));
        }
        self.sequence_points.push(point);
    }
}
