//! Source positions. Every AST node carries one so diagnostics can
//! quote the offending line.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl Position {
    pub fn new(line: u32, column: u32, length: u32) -> Self {
        Position {
            line,
            column,
            length,
        }
    }

    /// A zero-length position used for synthetic nodes that have no
    /// direct textual counterpart (e.g. an imputed IRQ source).
    pub fn synthetic() -> Self {
        Position {
            line: 0,
            column: 0,
            length: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Pairs a value with the position of the syntax that produced it and
/// the name of the file it came from (a description included with a
/// prefix still reports positions against its own file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    pub value: T,
    pub position: Position,
    pub file: std::sync::Arc<str>,
}

impl<T> Located<T> {
    pub fn new(value: T, position: Position, file: std::sync::Arc<str>) -> Self {
        Located {
            value,
            position,
            file,
        }
    }
}
