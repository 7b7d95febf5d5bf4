//! Operator definitions for MiniC
//!
//! This module defines binary and unary operators used in expressions
//! and their resolution from operator text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add, Sub, Mul, Div,

    // Comparison
    Less, LessEqual, Greater, GreaterEqual, Equal, NotEqual,

    // Logical
    LogicalAnd, LogicalOr,
}

impl BinaryOp {
    /// Operators whose operands can be swapped without changing the result
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Mul | BinaryOp::Equal | BinaryOp::NotEqual
                | BinaryOp::LogicalAnd | BinaryOp::LogicalOr
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater
                | BinaryOp::GreaterEqual | BinaryOp::Equal | BinaryOp::NotEqual
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
        };
        write!(f, "{}", op_str)
    }
}

impl FromStr for BinaryOp {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "+" => Ok(BinaryOp::Add),
            "-" => Ok(BinaryOp::Sub),
            "*" => Ok(BinaryOp::Mul),
            "/" => Ok(BinaryOp::Div),
            "<" => Ok(BinaryOp::Less),
            "<=" => Ok(BinaryOp::LessEqual),
            ">" => Ok(BinaryOp::Greater),
            ">=" => Ok(BinaryOp::GreaterEqual),
            "==" => Ok(BinaryOp::Equal),
            "!=" => Ok(BinaryOp::NotEqual),
            "&&" => Ok(BinaryOp::LogicalAnd),
            "||" => Ok(BinaryOp::LogicalOr),
            other => Err(format!("unknown binary operator '{}'", other)),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus, Minus,
    LogicalNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::LogicalNot => "!",
        };
        write!(f, "{}", op_str)
    }
}

impl FromStr for UnaryOp {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "+" => Ok(UnaryOp::Plus),
            "-" => Ok(UnaryOp::Minus),
            "!" => Ok(UnaryOp::LogicalNot),
            other => Err(format!("unknown unary operator '{}'", other)),
        }
    }
}
