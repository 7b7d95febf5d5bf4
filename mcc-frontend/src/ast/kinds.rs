//! Node kinds of the MiniC AST
//!
//! Every kind declares a fixed number of child slots ("contexts"). The
//! slot indices for each kind are listed in [`slots`].

use super::ops::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot indices per node kind
pub mod slots {
    pub const COMPILE_UNIT_BODY: usize = 0;

    pub const FUNCTION_PARAMS: usize = 0;
    pub const FUNCTION_BODY: usize = 1;
    pub const FUNCTION_RETURN_TYPE: usize = 2;

    pub const DECLARATION_PARAMS: usize = 0;

    /// Global and local declarations keep type, name and initializer together
    pub const DECLARATION_PARTS: usize = 0;

    pub const BLOCK_BODY: usize = 0;

    pub const IF_CONDITION: usize = 0;
    pub const IF_THEN: usize = 1;
    pub const IF_ELSE: usize = 2;

    pub const WHILE_CONDITION: usize = 0;
    pub const WHILE_BODY: usize = 1;

    pub const RETURN_EXPR: usize = 0;

    pub const BINARY_LEFT: usize = 0;
    pub const BINARY_RIGHT: usize = 1;

    pub const UNARY_OPERAND: usize = 0;

    pub const ASSIGN_TARGET: usize = 0;
    pub const ASSIGN_VALUE: usize = 1;

    pub const CALL_ARGS: usize = 0;

    pub const FARGS_PARAMS: usize = 0;
    pub const ARGS_LIST: usize = 0;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    CompileUnit,
    FunctionDefinition { name: String, return_type: String },
    FunctionDeclaration { name: String, return_type: String },
    GlobalDeclaration,
    LocalDeclaration,
    Block,
    IfStatement,
    WhileStatement,
    ReturnStatement,
    BreakStatement,
    BinaryExpression { op: BinaryOp },
    UnaryExpression { op: UnaryOp },
    AssignmentExpression,
    FunctionCallExpression { name: String },
    NumberLiteral { value: i32 },
    Identifier { name: String },
    TypeSpecifier { text: String },
    Parameter { name: String, type_name: String },
    Fargs,
    Args,
}

impl NodeKind {
    /// Number of child slots this kind declares
    pub fn slot_count(&self) -> usize {
        match self {
            NodeKind::CompileUnit => 1,
            NodeKind::FunctionDefinition { .. } => 3,
            NodeKind::FunctionDeclaration { .. } => 1,
            NodeKind::GlobalDeclaration => 1,
            NodeKind::LocalDeclaration => 1,
            NodeKind::Block => 1,
            NodeKind::IfStatement => 3,
            NodeKind::WhileStatement => 2,
            NodeKind::ReturnStatement => 1,
            NodeKind::BreakStatement => 0,
            NodeKind::BinaryExpression { .. } => 2,
            NodeKind::UnaryExpression { .. } => 1,
            NodeKind::AssignmentExpression => 2,
            NodeKind::FunctionCallExpression { .. } => 1,
            NodeKind::NumberLiteral { .. } => 0,
            NodeKind::Identifier { .. } => 0,
            NodeKind::TypeSpecifier { .. } => 0,
            NodeKind::Parameter { .. } => 0,
            NodeKind::Fargs => 1,
            NodeKind::Args => 1,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::CompileUnit => "CompileUnit",
            NodeKind::FunctionDefinition { .. } => "FunctionDefinition",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::GlobalDeclaration => "GlobalDeclaration",
            NodeKind::LocalDeclaration => "LocalDeclaration",
            NodeKind::Block => "Block",
            NodeKind::IfStatement => "IfStatement",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::AssignmentExpression => "AssignmentExpression",
            NodeKind::FunctionCallExpression { .. } => "FunctionCallExpression",
            NodeKind::NumberLiteral { .. } => "NumberLiteral",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::TypeSpecifier { .. } => "TypeSpecifier",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::Fargs => "Fargs",
            NodeKind::Args => "Args",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::FunctionDefinition { name, .. }
            | NodeKind::FunctionDeclaration { name, .. }
            | NodeKind::FunctionCallExpression { name }
            | NodeKind::Identifier { name }
            | NodeKind::Parameter { name, .. } => write!(f, "{}({})", self.tag(), name),
            NodeKind::BinaryExpression { op } => write!(f, "{}({})", self.tag(), op),
            NodeKind::UnaryExpression { op } => write!(f, "{}({})", self.tag(), op),
            NodeKind::NumberLiteral { value } => write!(f, "{}({})", self.tag(), value),
            NodeKind::TypeSpecifier { text } => write!(f, "{}({})", self.tag(), text),
            _ => write!(f, "{}", self.tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_counts_match_roles() {
        assert_eq!(NodeKind::IfStatement.slot_count(), 3);
        assert_eq!(NodeKind::WhileStatement.slot_count(), 2);
        assert_eq!(NodeKind::BreakStatement.slot_count(), 0);
        assert_eq!(
            NodeKind::FunctionDefinition { name: "f".into(), return_type: "int".into() }.slot_count(),
            3
        );
        assert_eq!(NodeKind::BinaryExpression { op: BinaryOp::Add }.slot_count(), 2);
        assert_eq!(NodeKind::NumberLiteral { value: 1 }.slot_count(), 0);
    }

    #[test]
    fn test_display_carries_payload() {
        assert_eq!(NodeKind::Identifier { name: "x".into() }.to_string(), "Identifier(x)");
        assert_eq!(NodeKind::BinaryExpression { op: BinaryOp::Sub }.to_string(), "BinaryExpression(-)");
        assert_eq!(NodeKind::Block.to_string(), "Block");
    }
}
