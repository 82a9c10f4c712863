//! Source locations and source files.
//!
//! [`LineInfo`] is the position IR nodes carry for diagnostics and debug
//! mapping. [`FileSource`] is the view of a markup file the debug point
//! tracker needs: its path and its raw bytes for hashing.

use std::fmt;

/// A position in a markup source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineInfo {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub position: u32,
}

impl LineInfo {
    /// Create a new position.
    #[inline]
    pub fn new(line: u32, position: u32) -> Self {
        Self { line, position }
    }

    /// Position used for nodes synthesized by compiler passes.
    #[inline]
    pub fn synthetic() -> Self {
        Self::default()
    }

    /// Whether this position was synthesized rather than read from source.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Debug for LineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.position)
    }
}

impl fmt::Display for LineInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.position)
    }
}

/// A markup source file as seen by debug mapping.
pub trait FileSource {
    /// Path recorded in debug documents. Also the document cache key.
    fn file_path(&self) -> &str;

    /// Raw file contents, hashed for debugger integrity checks.
    fn file_contents(&self) -> &[u8];
}

/// A [`FileSource`] held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemorySource {
    path: String,
    contents: Vec<u8>,
}

impl InMemorySource {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

impl FileSource for InMemorySource {
    fn file_path(&self) -> &str {
        &self.path
    }

    fn file_contents(&self) -> &[u8] {
        &self.contents
    }
}
