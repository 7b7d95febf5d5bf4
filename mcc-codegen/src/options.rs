//! Output options for the assembly writer
//!
//! Options are plain serde data so the driver can load them from a JSON
//! file; every field falls back to its default when absent.

use serde::{Deserialize, Serialize};

/// Indentation unit applied once per nesting level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentStyle {
    Tabs,
    Spaces(usize),
}

impl IndentStyle {
    pub fn unit(self) -> String {
        match self {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces(n) => " ".repeat(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Formatting of the two pieces a generated line is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub indent: IndentStyle,
    pub line_ending: LineEnding,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            indent: IndentStyle::Tabs,
            line_ending: LineEnding::Lf,
        }
    }
}

/// Options controlling the fixed parts of the generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenOptions {
    /// Processor directive, e.g. `.386`
    pub processor: String,
    /// Operand of the `.model` directive
    pub memory_model: String,
    /// Operand of the `.stack` directive
    pub stack_size: u32,
    /// Procedure named by the closing `END` directive
    pub entry_point: String,
    pub indent: IndentStyle,
    pub line_ending: LineEnding,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            processor: ".386".to_string(),
            memory_model: "flat, stdcall".to_string(),
            stack_size: 4096,
            entry_point: "main".to_string(),
            indent: IndentStyle::Tabs,
            line_ending: LineEnding::Lf,
        }
    }
}

impl CodegenOptions {
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            indent: self.indent,
            line_ending: self.line_ending,
        }
    }

    /// Load options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
