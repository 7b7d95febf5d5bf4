//! MiniC Compiler - Frontend
//!
//! This crate provides the frontend components for the MiniC compiler:
//! - Parse tree: the concrete syntax tree handed over by the external parser
//! - AST: arena of slot-structured nodes and the visitor over them
//! - Builder: turns a parse tree into an AST

pub mod ast;
pub mod builder;
pub mod parse_tree;

pub use ast::{
    slots, Ast, AstNode, AstVisitor, BinaryOp, NodeId, NodeIdGenerator, NodeKind, NodeRef, UnaryOp,
};
pub use builder::build_ast;
pub use parse_tree::{ParseElement, ParseNode, Rule, Token, TokenKind};

use log::info;
use mcc_common::{CompilerError, SourceLocation};

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Read a parse tree from its JSON form
    pub fn parse_tree_from_json(json: &str, filename: &str) -> Result<ParseNode, CompilerError> {
        ParseNode::from_json(json).map_err(|e| {
            CompilerError::malformed(
                "parse tree",
                SourceLocation::new(filename, e.line() as u32, e.column() as u32),
                e.to_string(),
            )
        })
    }

    /// Build the AST of a parse tree
    pub fn build(tree: &ParseNode, filename: &str) -> Result<Ast, CompilerError> {
        info!("building AST for {}", filename);
        build_ast(tree, filename)
    }

    /// Build the AST straight from a JSON parse tree
    pub fn build_from_json(json: &str, filename: &str) -> Result<Ast, CompilerError> {
        let tree = Self::parse_tree_from_json(json, filename)?;
        Self::build(&tree, filename)
    }
}
