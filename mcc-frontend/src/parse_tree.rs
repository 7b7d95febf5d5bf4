//! Concrete parse tree delivered by the external MiniC parser
//!
//! The lexer and parser live outside this workspace. What they hand over
//! is a generic tree of grammar productions ([`ParseNode`]) whose leaves
//! are tokens. The tree is serde-(de)serialisable so it can travel as
//! JSON between the parser process and the compiler.

use mcc_common::SourceLocation;
use serde::{Deserialize, Serialize};

/// Grammar production a [`ParseNode`] was reduced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    CompileUnit,
    FunctionDefinition,
    FunctionDeclaration,
    Declaration,
    Initializer,
    TypeSpecifier,
    Statement,
    LocalDeclaration,
    IfStatement,
    WhileStatement,
    Block,
    StatementList,

    // expression alternatives
    BinaryExpression,
    UnaryExpression,
    AssignExpression,
    CallExpression,
    ParenExpression,
    PrimaryExpression,

    Args,
    Fargs,
}

impl Rule {
    /// Whether this production is one of the `expression` alternatives
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            Rule::BinaryExpression
                | Rule::UnaryExpression
                | Rule::AssignExpression
                | Rule::CallExpression
                | Rule::ParenExpression
                | Rule::PrimaryExpression
        )
    }

    /// Human readable construct name used in error messages
    pub fn construct_name(self) -> &'static str {
        match self {
            Rule::CompileUnit => "compile unit",
            Rule::FunctionDefinition => "function definition",
            Rule::FunctionDeclaration => "function declaration",
            Rule::Declaration => "declaration",
            Rule::Initializer => "initializer",
            Rule::TypeSpecifier => "type specifier",
            Rule::Statement => "statement",
            Rule::LocalDeclaration => "local declaration",
            Rule::IfStatement => "if statement",
            Rule::WhileStatement => "while statement",
            Rule::Block => "block",
            Rule::StatementList => "statement list",
            Rule::BinaryExpression => "binary expression",
            Rule::UnaryExpression => "unary expression",
            Rule::AssignExpression => "assignment expression",
            Rule::CallExpression => "function call",
            Rule::ParenExpression => "parenthesized expression",
            Rule::PrimaryExpression => "primary expression",
            Rule::Args => "argument list",
            Rule::Fargs => "parameter list",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Number,
    TypeName,
    Keyword,
    Operator,
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            line: 0,
            column: 0,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn location(&self, filename: &str) -> SourceLocation {
        SourceLocation::new(filename, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseElement {
    Node(ParseNode),
    Token(Token),
}

impl ParseElement {
    pub fn as_node(&self) -> Option<&ParseNode> {
        match self {
            ParseElement::Node(node) => Some(node),
            ParseElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            ParseElement::Token(token) => Some(token),
            ParseElement::Node(_) => None,
        }
    }

    /// An element that can stand in an `expression` position: an expression
    /// production, or a bare NUMBER / IDENTIFIER token.
    pub fn is_expression(&self) -> bool {
        match self {
            ParseElement::Node(node) => node.rule.is_expression(),
            ParseElement::Token(token) => {
                matches!(token.kind, TokenKind::Number | TokenKind::Identifier)
            }
        }
    }

    pub fn location(&self, filename: &str) -> SourceLocation {
        match self {
            ParseElement::Node(node) => node.location(filename),
            ParseElement::Token(token) => token.location(filename),
        }
    }
}

/// One reduced grammar production
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseNode {
    pub rule: Rule,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub children: Vec<ParseElement>,
}

impl ParseNode {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            line: 0,
            column: 0,
            children: Vec::new(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Append a child production
    pub fn node(mut self, child: ParseNode) -> Self {
        self.children.push(ParseElement::Node(child));
        self
    }

    /// Append a token positioned at this node's start
    pub fn token(mut self, kind: TokenKind, text: &str) -> Self {
        let token = Token::new(kind, text).at(self.line, self.column);
        self.children.push(ParseElement::Token(token));
        self
    }

    pub fn element(mut self, child: ParseElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn location(&self, filename: &str) -> SourceLocation {
        SourceLocation::new(filename, self.line, self.column)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ParseNode> + '_ {
        self.children.iter().filter_map(ParseElement::as_node)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.children.iter().filter_map(ParseElement::as_token)
    }

    /// First child production reduced from `rule`
    pub fn child(&self, rule: Rule) -> Option<&ParseNode> {
        self.nodes().find(|node| node.rule == rule)
    }

    /// First token of the given kind
    pub fn first_token(&self, kind: TokenKind) -> Option<&Token> {
        self.tokens().find(|token| token.kind == kind)
    }

    pub fn has_token(&self, kind: TokenKind, text: &str) -> bool {
        self.tokens().any(|token| token.is(kind, text))
    }

    /// Children standing in expression positions, in order
    pub fn expressions(&self) -> impl Iterator<Item = &ParseElement> + '_ {
        self.children.iter().filter(|child| child.is_expression())
    }

    /// Deserialize a tree from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_helpers_position_tokens() {
        let node = ParseNode::new(Rule::TypeSpecifier)
            .at(4, 2)
            .token(TokenKind::TypeName, "int");
        let token = node.first_token(TokenKind::TypeName).unwrap();
        assert_eq!(token.text, "int");
        assert_eq!((token.line, token.column), (4, 2));
    }

    #[test]
    fn test_expression_positions() {
        let node = ParseNode::new(Rule::BinaryExpression)
            .token(TokenKind::Identifier, "x")
            .token(TokenKind::Operator, "+")
            .node(ParseNode::new(Rule::PrimaryExpression).token(TokenKind::Number, "1"));
        let exprs: Vec<_> = node.expressions().collect();
        assert_eq!(exprs.len(), 2);
        assert!(exprs[0].as_token().is_some());
        assert_eq!(exprs[1].as_node().map(|n| n.rule), Some(Rule::PrimaryExpression));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "rule": "primary_expression",
            "line": 2,
            "column": 9,
            "children": [
                { "token": { "kind": "number", "text": "42", "line": 2, "column": 9 } }
            ]
        }"#;
        let node = ParseNode::from_json(json).unwrap();
        assert_eq!(node.rule, Rule::PrimaryExpression);
        assert_eq!(node.first_token(TokenKind::Number).unwrap().text, "42");

        let back = ParseNode::from_json(&node.to_json().unwrap()).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_missing_positions_default_to_zero() {
        let node = ParseNode::from_json(r#"{ "rule": "block" }"#).unwrap();
        assert_eq!((node.line, node.column), (0, 0));
        assert!(node.children.is_empty());
    }
}
