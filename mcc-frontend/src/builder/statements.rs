//! Statement productions

use super::AstBuilder;
use crate::ast::{slots, NodeId, NodeKind};
use crate::parse_tree::{ParseElement, ParseNode, Rule, TokenKind};
use mcc_common::CompilerError;

impl AstBuilder<'_> {
    /// `block : '{' statementList? '}'`
    pub(super) fn build_block(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        if node.rule != Rule::Block {
            return Err(self.malformed(node, "expected a block"));
        }
        let block = self.create(NodeKind::Block, node.location(self.filename))?;

        self.within(block, slots::BLOCK_BODY, |b| {
            for child in &node.children {
                match child {
                    ParseElement::Node(list) if list.rule == Rule::StatementList => {
                        for statement in list.children.iter().filter(|s| !is_separator(s)) {
                            b.build_statement(statement)?;
                        }
                    }
                    other if is_separator(other) => {}
                    other => b.build_statement(other)?,
                }
            }
            Ok(())
        })?;

        Ok(block)
    }

    /// Attach whatever a statement produces to the current frame
    pub(super) fn build_statement(&mut self, element: &ParseElement) -> Result<(), CompilerError> {
        let node = match element {
            ParseElement::Node(node) => node,
            ParseElement::Token(_) if element.is_expression() => {
                self.build_expression(element)?;
                return Ok(());
            }
            ParseElement::Token(token) => {
                return Err(CompilerError::malformed(
                    Rule::Statement.construct_name(),
                    self.token_location(token),
                    format!("unexpected token '{}'", token.text),
                ))
            }
        };

        match node.rule {
            Rule::Statement => self.build_statement_node(node),
            Rule::IfStatement => self.build_if(node).map(|_| ()),
            Rule::WhileStatement => self.build_while(node).map(|_| ()),
            Rule::Block => self.build_block(node).map(|_| ()),
            Rule::LocalDeclaration => self.build_local_declaration(node),
            rule if rule.is_expression() => self.build_expression(element).map(|_| ()),
            _ => Err(self.malformed(node, "not a statement")),
        }
    }

    /// `statement : expression ';' | 'return' expression? ';' | 'break' ';' | <compound statement>`
    fn build_statement_node(&mut self, node: &ParseNode) -> Result<(), CompilerError> {
        if node.has_token(TokenKind::Keyword, "return") {
            let ret = self.create(NodeKind::ReturnStatement, node.location(self.filename))?;
            if let Some(value) = node.expressions().next() {
                self.within(ret, slots::RETURN_EXPR, |b| b.build_expression(value))?;
            }
            return Ok(());
        }

        if node.has_token(TokenKind::Keyword, "break") {
            self.create(NodeKind::BreakStatement, node.location(self.filename))?;
            return Ok(());
        }

        // an expression statement attaches the expression itself
        match node.children.iter().find(|child| !is_separator(child)) {
            Some(inner) => self.build_statement(inner),
            None => Err(self.malformed(node, "empty statement")),
        }
    }

    /// `ifStatement : 'if' '(' expression ')' block ('else' block)?`
    fn build_if(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let condition = node
            .expressions()
            .next()
            .ok_or_else(|| self.malformed(node, "missing condition expression"))?;
        let blocks: Vec<&ParseNode> = node.nodes().filter(|n| n.rule == Rule::Block).collect();
        if blocks.is_empty() || blocks.len() > 2 {
            return Err(self.malformed(node, format!("expected 1 or 2 blocks, found {}", blocks.len())));
        }

        let if_stmt = self.create(NodeKind::IfStatement, node.location(self.filename))?;
        self.within(if_stmt, slots::IF_CONDITION, |b| b.build_expression(condition))?;
        self.within(if_stmt, slots::IF_THEN, |b| b.build_block(blocks[0]))?;
        if let Some(else_block) = blocks.get(1) {
            self.within(if_stmt, slots::IF_ELSE, |b| b.build_block(else_block))?;
        }

        Ok(if_stmt)
    }

    /// `whileStatement : 'while' '(' expression ')' statement`
    fn build_while(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let mut parts = node.children.iter().filter(|child| !is_keyword_or_separator(child));
        let condition = parts
            .next()
            .filter(|c| c.is_expression())
            .ok_or_else(|| self.malformed(node, "missing condition expression"))?;
        let body = parts
            .next()
            .ok_or_else(|| self.malformed(node, "missing loop body"))?;

        let while_stmt = self.create(NodeKind::WhileStatement, node.location(self.filename))?;
        self.within(while_stmt, slots::WHILE_CONDITION, |b| b.build_expression(condition))?;
        self.within(while_stmt, slots::WHILE_BODY, |b| b.build_statement(body))?;

        Ok(while_stmt)
    }
}

fn is_separator(element: &ParseElement) -> bool {
    matches!(element, ParseElement::Token(t) if t.kind == TokenKind::Punctuation)
}

fn is_keyword_or_separator(element: &ParseElement) -> bool {
    matches!(
        element,
        ParseElement::Token(t) if matches!(t.kind, TokenKind::Punctuation | TokenKind::Keyword)
    )
}
