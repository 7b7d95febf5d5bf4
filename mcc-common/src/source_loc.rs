//! Source location tracking for error reporting
//!
//! Locations are attached to every AST node and travel into every
//! error that names a construct in the input.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in a source file (line is 1-based, column is 0-based as
/// delivered by the parser)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

// Allow creating location with just line and column (common pattern in tests)
impl SourceLocation {
    pub fn new_simple(line: u32, column: u32) -> Self {
        Self {
            filename: "<input>".to_string(),
            line,
            column,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location() {
        let loc = SourceLocation::new("test.minic", 42, 10);
        assert_eq!(loc.filename, "test.minic");
        assert_eq!(loc.line, 42);
        assert_eq!(loc.column, 10);
        assert_eq!(format!("{}", loc), "test.minic:42:10");
    }

    #[test]
    fn test_simple_location_uses_input_placeholder() {
        let loc = SourceLocation::new_simple(3, 7);
        assert_eq!(loc.to_string(), "<input>:3:7");
    }

    #[test]
    fn test_default_is_dummy() {
        assert_eq!(SourceLocation::default(), SourceLocation::dummy());
    }
}
