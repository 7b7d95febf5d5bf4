//! AST construction from the external parse tree
//!
//! The builder descends the [`ParseNode`] tree recursively and keeps an
//! explicit stack of `(parent, slot)` frames. Every node it creates is
//! attached to the frame on top of the stack, so the position of a node
//! in the AST is decided by the frame that was pushed before descending
//! into its production.

mod declarations;
mod expressions;
mod statements;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::parse_tree::{ParseElement, ParseNode, Rule, Token, TokenKind};
use log::{debug, trace};
use mcc_common::{CompilerError, SourceLocation};

/// Build the AST for one compile unit
pub fn build_ast(tree: &ParseNode, filename: &str) -> Result<Ast, CompilerError> {
    let mut builder = AstBuilder::new(filename);
    builder.build_compile_unit(tree)?;
    debug!("built AST for {} with {} nodes", filename, builder.ast.len());
    Ok(builder.finish())
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    parent: NodeId,
    slot: usize,
}

pub struct AstBuilder<'f> {
    ast: Ast,
    frames: Vec<Frame>,
    filename: &'f str,
}

impl<'f> AstBuilder<'f> {
    pub fn new(filename: &'f str) -> Self {
        Self {
            ast: Ast::new(),
            frames: Vec::new(),
            filename,
        }
    }

    pub fn finish(self) -> Ast {
        self.ast
    }

    fn push_frame(&mut self, parent: NodeId, slot: usize) {
        trace!("push frame _{} slot {}", self.ast.node(parent).serial, slot);
        self.frames.push(Frame { parent, slot });
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            trace!("pop frame _{} slot {}", self.ast.node(frame.parent).serial, frame.slot);
        }
    }

    /// Run `f` with `(parent, slot)` as the current attachment point
    fn within<T>(
        &mut self,
        parent: NodeId,
        slot: usize,
        f: impl FnOnce(&mut Self) -> Result<T, CompilerError>,
    ) -> Result<T, CompilerError> {
        self.push_frame(parent, slot);
        let result = f(self);
        self.pop_frame();
        result
    }

    /// Create a node and attach it to the current frame, if there is one
    fn create(&mut self, kind: NodeKind, location: SourceLocation) -> Result<NodeId, CompilerError> {
        let id = self.ast.create_node(kind, location);
        if let Some(frame) = self.frames.last().copied() {
            self.ast.attach_child(frame.parent, id, frame.slot)?;
        }
        Ok(id)
    }

    fn malformed(&self, node: &ParseNode, message: impl Into<String>) -> CompilerError {
        CompilerError::malformed(node.rule.construct_name(), node.location(self.filename), message)
    }

    fn location_of(&self, element: &ParseElement) -> SourceLocation {
        element.location(self.filename)
    }

    fn token_location(&self, token: &Token) -> SourceLocation {
        token.location(self.filename)
    }

    /// Text of the type named by a `typeSpecifier` production
    fn type_text(&self, node: &ParseNode) -> Result<String, CompilerError> {
        node.tokens()
            .find(|t| matches!(t.kind, TokenKind::TypeName | TokenKind::Keyword | TokenKind::Identifier))
            .map(|t| t.text.clone())
            .ok_or_else(|| self.malformed(node, "missing type name"))
    }

    fn required_child<'n>(&self, node: &'n ParseNode, rule: Rule) -> Result<&'n ParseNode, CompilerError> {
        node.child(rule)
            .ok_or_else(|| self.malformed(node, format!("missing {}", rule.construct_name())))
    }

    fn required_identifier<'n>(&self, node: &'n ParseNode) -> Result<&'n Token, CompilerError> {
        node.first_token(TokenKind::Identifier)
            .ok_or_else(|| self.malformed(node, "missing identifier"))
    }
}
