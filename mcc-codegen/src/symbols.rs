//! Symbol tables for code generation
//!
//! The file keeps the names of declared globals and functions; each
//! function keeps the frame offsets of its parameters and locals.

use crate::asm::Operand;
use std::collections::{HashMap, HashSet};

/// Width of one stack slot in bytes
pub const SLOT_SIZE: i32 = 4;

/// Offset of the first parameter: saved EBP and the return address sit below it
pub const FIRST_PARAM_OFFSET: i32 = 8;

/// File-level names. Registration is idempotent: the first declaration wins.
#[derive(Debug, Clone, Default)]
pub struct GlobalSymbols {
    variables: HashSet<String>,
    functions: HashSet<String>,
}

impl GlobalSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `name` was not declared before
    pub fn declare_variable(&mut self, name: &str) -> bool {
        self.variables.insert(name.to_string())
    }

    /// Returns true when `name` was not declared before
    pub fn declare_function(&mut self, name: &str) -> bool {
        self.functions.insert(name.to_string())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }
}

/// Where a name lives at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarLocation {
    Local(i32),
    Param(i32),
    Global(String),
}

impl VarLocation {
    pub fn operand(&self) -> Operand {
        match self {
            VarLocation::Local(offset) | VarLocation::Param(offset) => Operand::Frame(*offset),
            VarLocation::Global(name) => Operand::Global(name.clone()),
        }
    }
}

/// Stack frame layout of one function
#[derive(Debug, Clone)]
pub struct FunctionFrame {
    name: String,
    params: HashMap<String, i32>,
    locals: HashMap<String, i32>,
}

impl FunctionFrame {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            params: HashMap::new(),
            locals: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a parameter at the next positive offset. Returns the offset
    /// and whether the name was new.
    pub fn add_param(&mut self, name: &str) -> (i32, bool) {
        if let Some(&offset) = self.params.get(name) {
            return (offset, false);
        }
        let offset = FIRST_PARAM_OFFSET + self.params.len() as i32 * SLOT_SIZE;
        self.params.insert(name.to_string(), offset);
        (offset, true)
    }

    /// Register a local at the next negative offset. Returns the offset and
    /// whether the name was new.
    pub fn add_local(&mut self, name: &str) -> (i32, bool) {
        if let Some(&offset) = self.locals.get(name) {
            return (offset, false);
        }
        let offset = -(self.locals.len() as i32 + 1) * SLOT_SIZE;
        self.locals.insert(name.to_string(), offset);
        (offset, true)
    }

    pub fn param_offset(&self, name: &str) -> Option<i32> {
        self.params.get(name).copied()
    }

    pub fn local_offset(&self, name: &str) -> Option<i32> {
        self.locals.get(name).copied()
    }

    /// Lookup order local, parameter, global
    pub fn resolve(&self, name: &str) -> VarLocation {
        if let Some(offset) = self.local_offset(name) {
            VarLocation::Local(offset)
        } else if let Some(offset) = self.param_offset(name) {
            VarLocation::Param(offset)
        } else {
            VarLocation::Global(name.to_string())
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Bytes reserved below EBP for locals
    pub fn local_bytes(&self) -> i32 {
        self.locals.len() as i32 * SLOT_SIZE
    }

    /// Label jumped to by `return`, placed before the epilogue
    pub fn exit_label(&self) -> String {
        format!("{}_exit", self.name)
    }
}
