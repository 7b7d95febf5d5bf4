//! Expression productions

use super::AstBuilder;
use crate::ast::{slots, BinaryOp, NodeId, NodeKind, UnaryOp};
use crate::parse_tree::{ParseElement, ParseNode, Rule, Token, TokenKind};
use mcc_common::CompilerError;

impl AstBuilder<'_> {
    /// Build an expression and attach it to the current frame
    pub(super) fn build_expression(&mut self, element: &ParseElement) -> Result<NodeId, CompilerError> {
        let node = match element {
            ParseElement::Token(token) => return self.build_operand_token(token),
            ParseElement::Node(node) => node,
        };

        match node.rule {
            Rule::PrimaryExpression | Rule::ParenExpression => {
                let inner = node
                    .expressions()
                    .next()
                    .ok_or_else(|| self.malformed(node, "missing inner expression"))?;
                self.build_expression(inner)
            }
            Rule::BinaryExpression => self.build_binary(node),
            Rule::UnaryExpression => self.build_unary(node),
            Rule::AssignExpression => self.build_assignment(node),
            Rule::CallExpression => self.build_call(node),
            _ => Err(self.malformed(node, "expected an expression")),
        }
    }

    fn build_operand_token(&mut self, token: &Token) -> Result<NodeId, CompilerError> {
        let location = self.token_location(token);
        match token.kind {
            TokenKind::Number => {
                let value = token.text.parse::<i32>().map_err(|_| {
                    CompilerError::malformed(
                        Rule::PrimaryExpression.construct_name(),
                        location.clone(),
                        format!("number '{}' does not fit in 32 bits", token.text),
                    )
                })?;
                self.create(NodeKind::NumberLiteral { value }, location)
            }
            TokenKind::Identifier => self.create(NodeKind::Identifier { name: token.text.clone() }, location),
            _ => Err(CompilerError::malformed(
                Rule::PrimaryExpression.construct_name(),
                location,
                format!("unexpected token '{}'", token.text),
            )),
        }
    }

    fn operator_text<'n>(&self, node: &'n ParseNode) -> Result<&'n str, CompilerError> {
        node.first_token(TokenKind::Operator)
            .map(|t| t.text.as_str())
            .ok_or_else(|| self.malformed(node, "missing operator"))
    }

    /// `expression OP expression`
    fn build_binary(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let op: BinaryOp = self
            .operator_text(node)?
            .parse()
            .map_err(|message: String| self.malformed(node, message))?;
        let operands: Vec<&ParseElement> = node.expressions().collect();
        let [left, right] = operands[..] else {
            return Err(self.malformed(node, format!("expected 2 operands, found {}", operands.len())));
        };

        let binary = self.create(NodeKind::BinaryExpression { op }, node.location(self.filename))?;
        self.within(binary, slots::BINARY_LEFT, |b| b.build_expression(left))?;
        self.within(binary, slots::BINARY_RIGHT, |b| b.build_expression(right))?;
        Ok(binary)
    }

    /// `OP expression`
    fn build_unary(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let op: UnaryOp = self
            .operator_text(node)?
            .parse()
            .map_err(|message: String| self.malformed(node, message))?;
        let operand = node
            .expressions()
            .next()
            .ok_or_else(|| self.malformed(node, "missing operand"))?;

        // i32::MIN only exists negated
        if op == UnaryOp::Minus {
            if let Some(token) = number_token(operand).filter(|t| is_min_magnitude(&t.text)) {
                let value = i32::MIN;
                return self.create(NodeKind::NumberLiteral { value }, self.token_location(token));
            }
        }

        let unary = self.create(NodeKind::UnaryExpression { op }, node.location(self.filename))?;
        self.within(unary, slots::UNARY_OPERAND, |b| b.build_expression(operand))?;
        Ok(unary)
    }

    /// `IDENTIFIER '=' expression`
    fn build_assignment(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let operands: Vec<&ParseElement> = node.expressions().collect();
        let [target, value] = operands[..] else {
            return Err(self.malformed(node, "expected 'name = expression'"));
        };
        let target = assignable_name(target)
            .ok_or_else(|| self.malformed(node, "assignment target is not a variable"))?;

        let assign = self.create(NodeKind::AssignmentExpression, node.location(self.filename))?;
        self.within(assign, slots::ASSIGN_TARGET, |b| b.build_operand_token(target))?;
        self.within(assign, slots::ASSIGN_VALUE, |b| b.build_expression(value))?;
        Ok(assign)
    }

    /// `IDENTIFIER '(' args? ')'`
    fn build_call(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let name = self.required_identifier(node)?.text.clone();
        let call = self.create(NodeKind::FunctionCallExpression { name }, node.location(self.filename))?;

        if let Some(args) = node.child(Rule::Args) {
            self.within(call, slots::CALL_ARGS, |b| {
                let list = b.create(NodeKind::Args, args.location(b.filename))?;
                b.within(list, slots::ARGS_LIST, |b| {
                    for arg in args.expressions() {
                        b.build_expression(arg)?;
                    }
                    Ok(())
                })
            })?;
        }

        Ok(call)
    }
}

/// Identifier token naming an assignment target, possibly wrapped in a
/// primary or parenthesized expression
fn assignable_name(element: &ParseElement) -> Option<&Token> {
    match element {
        ParseElement::Token(token) if token.kind == TokenKind::Identifier => Some(token),
        ParseElement::Node(node) if matches!(node.rule, Rule::PrimaryExpression | Rule::ParenExpression) => {
            node.expressions().next().and_then(assignable_name)
        }
        _ => None,
    }
}

/// Number token standing in an operand position, possibly wrapped in a
/// primary or parenthesized expression
fn number_token(element: &ParseElement) -> Option<&Token> {
    match element {
        ParseElement::Token(token) if token.kind == TokenKind::Number => Some(token),
        ParseElement::Node(node) if matches!(node.rule, Rule::PrimaryExpression | Rule::ParenExpression) => {
            node.expressions().next().and_then(number_token)
        }
        _ => None,
    }
}

/// Literal text whose negation is `i32::MIN`
fn is_min_magnitude(text: &str) -> bool {
    text.parse::<i64>() == Ok(-i64::from(i32::MIN))
}
