//! MiniC Compiler - Code Generation Backend
//!
//! This crate handles the final phase of compilation: turning the AST into
//! flat 32-bit MASM-style assembly text. It includes:
//!
//! - Instruction and register model
//! - Emission tree: nested containers assembled into text on demand
//! - Symbol tables and stack frame layout
//! - The code generator visiting the AST

pub mod asm;
pub mod emit;
pub mod generator;
pub mod options;
pub mod symbols;

pub use asm::{AsmInst, Condition, Operand, Reg};
pub use emit::{AsmBuffer, EmitContext, EmitId, EmitKind, EmitTree};
pub use generator::{CodeGenerator, Scope};
pub use options::{CodegenOptions, IndentStyle, LineEnding, TextStyle};
pub use symbols::{FunctionFrame, GlobalSymbols, VarLocation};

use mcc_common::CompilerError;
use mcc_frontend::Ast;

/// Main entry point for code generation
pub fn generate_assembly(ast: &Ast, options: &CodegenOptions) -> Result<String, CompilerError> {
    let tree = CodeGenerator::new(options.clone()).generate(ast)?;
    tree.emit()
}
