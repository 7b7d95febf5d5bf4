//! Text buffer holding assembled lines at one nesting level

use crate::asm::AsmInst;
use crate::options::TextStyle;
use mcc_common::CompilerError;

/// Line buffer of a leaf emission node, and the result of assembling a
/// composite one
///
/// Every appended line is re-indented to the buffer's current nesting
/// level and terminated with the configured line ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmBuffer {
    text: String,
    nesting: usize,
    style: TextStyle,
}

impl AsmBuffer {
    pub fn new(style: TextStyle, nesting: usize) -> Self {
        Self {
            text: String::new(),
            nesting,
            style,
        }
    }

    /// Append code, one line per `\n`/`\r` separated piece; blank pieces are dropped
    pub fn add_code(&mut self, code: &str) {
        let indent = self.style.indent.unit().repeat(self.nesting);
        for line in code.split(['\n', '\r']) {
            let line = line.trim_start();
            if line.is_empty() {
                continue;
            }
            self.text.push_str(&indent);
            self.text.push_str(line);
            self.text.push_str(self.style.line_ending.as_str());
        }
    }

    pub fn add_inst(&mut self, inst: &AsmInst) {
        self.add_code(&inst.to_string());
    }

    /// Append already assembled text verbatim, keeping its indentation
    pub fn append_assembled(&mut self, other: &AsmBuffer) {
        self.text.push_str(&other.text);
    }

    pub fn enter_scope(&mut self) {
        self.nesting += 1;
    }

    /// Step one nesting level out; `scope` names the owner in the error
    pub fn leave_scope(&mut self, scope: &str) -> Result<(), CompilerError> {
        if self.nesting == 0 {
            return Err(CompilerError::NestingImbalance {
                scope: scope.to_string(),
            });
        }
        self.nesting -= 1;
        Ok(())
    }

    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Lines without indentation or line endings
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.lines().map(str::trim)
    }
}
