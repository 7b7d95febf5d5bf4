//! Compile unit, function and declaration productions

use super::AstBuilder;
use crate::ast::{slots, NodeId, NodeKind};
use crate::parse_tree::{ParseElement, ParseNode, Rule, TokenKind};
use log::debug;
use mcc_common::CompilerError;

impl AstBuilder<'_> {
    pub(super) fn build_compile_unit(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        if node.rule != Rule::CompileUnit {
            return Err(self.malformed(node, "parse tree root is not a compile unit"));
        }

        let unit = self.create(NodeKind::CompileUnit, node.location(self.filename))?;
        self.ast.set_root(unit);

        self.within(unit, slots::COMPILE_UNIT_BODY, |b| {
            for child in &node.children {
                match child {
                    ParseElement::Node(item) => match item.rule {
                        Rule::FunctionDefinition => {
                            b.build_function_definition(item)?;
                        }
                        Rule::FunctionDeclaration => {
                            b.build_function_declaration(item)?;
                        }
                        Rule::Declaration => b.build_declaration(item)?,
                        _ => {
                            return Err(b.malformed(
                                item,
                                "expected a function definition or a declaration at file scope",
                            ))
                        }
                    },
                    // end-of-file and stray separators carry no structure
                    ParseElement::Token(_) => {}
                }
            }
            Ok(())
        })?;

        Ok(unit)
    }

    fn build_function_definition(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let type_node = self.required_child(node, Rule::TypeSpecifier)?;
        let return_type = self.type_text(type_node)?;
        let name = self.required_identifier(node)?.text.clone();
        let body = self.required_child(node, Rule::Block)?;
        debug!("function definition {}", name);

        let function = self.create(
            NodeKind::FunctionDefinition { name, return_type: return_type.clone() },
            node.location(self.filename),
        )?;

        if let Some(fargs) = node.child(Rule::Fargs) {
            self.within(function, slots::FUNCTION_PARAMS, |b| b.build_fargs(fargs))?;
        }
        self.within(function, slots::FUNCTION_BODY, |b| b.build_block(body))?;
        self.within(function, slots::FUNCTION_RETURN_TYPE, |b| {
            b.create(NodeKind::TypeSpecifier { text: return_type }, type_node.location(b.filename))
        })?;

        Ok(function)
    }

    pub(super) fn build_function_declaration(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let type_node = self.required_child(node, Rule::TypeSpecifier)?;
        let return_type = self.type_text(type_node)?;
        let name = self.required_identifier(node)?.text.clone();
        debug!("function declaration {}", name);

        let declaration = self.create(
            NodeKind::FunctionDeclaration { name, return_type },
            node.location(self.filename),
        )?;

        if let Some(fargs) = node.child(Rule::Fargs) {
            self.within(declaration, slots::DECLARATION_PARAMS, |b| b.build_fargs(fargs))?;
        }

        Ok(declaration)
    }

    /// `declaration` either wraps a function declaration or declares one
    /// global variable with an optional initializer.
    fn build_declaration(&mut self, node: &ParseNode) -> Result<(), CompilerError> {
        if let Some(function) = node.child(Rule::FunctionDeclaration) {
            self.build_function_declaration(function)?;
            return Ok(());
        }

        let initializer = match node.child(Rule::Initializer) {
            Some(init) => Some(
                self.value_after_assign(init)
                    .ok_or_else(|| self.malformed(init, "missing initializer expression"))?,
            ),
            None => None,
        };

        let global = self.create(NodeKind::GlobalDeclaration, node.location(self.filename))?;
        self.within(global, slots::DECLARATION_PARTS, |b| b.build_declared_variable(node, initializer))
    }

    /// `localDeclaration : typeSpecifier IDENTIFIER ('=' expression)? ';'`
    pub(super) fn build_local_declaration(&mut self, node: &ParseNode) -> Result<(), CompilerError> {
        let initializer = if node.tokens().any(|t| t.text == "=") {
            Some(
                self.value_after_assign(node)
                    .ok_or_else(|| self.malformed(node, "missing initializer expression"))?,
            )
        } else {
            None
        };

        let local = self.create(NodeKind::LocalDeclaration, node.location(self.filename))?;
        self.within(local, slots::DECLARATION_PARTS, |b| b.build_declared_variable(node, initializer))
    }

    /// Type, name and optional initializer of a variable declaration, in that
    /// order, attached to the current frame
    fn build_declared_variable(
        &mut self,
        node: &ParseNode,
        initializer: Option<&ParseElement>,
    ) -> Result<(), CompilerError> {
        let type_node = self.required_child(node, Rule::TypeSpecifier)?;
        let text = self.type_text(type_node)?;
        let ident = self.required_identifier(node)?;

        self.create(NodeKind::TypeSpecifier { text }, type_node.location(self.filename))?;
        self.create(
            NodeKind::Identifier { name: ident.text.clone() },
            self.token_location(ident),
        )?;
        if let Some(value) = initializer {
            self.build_expression(value)?;
        }
        Ok(())
    }

    /// First expression element following the `=` token of `node`
    fn value_after_assign<'n>(&self, node: &'n ParseNode) -> Option<&'n ParseElement> {
        node.children
            .iter()
            .skip_while(|child| !matches!(child, ParseElement::Token(t) if t.text == "="))
            .skip(1)
            .find(|child| child.is_expression())
    }

    /// `fargs : typeSpecifier IDENTIFIER (',' typeSpecifier IDENTIFIER)*`
    fn build_fargs(&mut self, node: &ParseNode) -> Result<NodeId, CompilerError> {
        let fargs = self.create(NodeKind::Fargs, node.location(self.filename))?;

        self.within(fargs, slots::FARGS_PARAMS, |b| {
            let mut pending_type: Option<String> = None;
            for child in &node.children {
                match child {
                    ParseElement::Node(type_node) if type_node.rule == Rule::TypeSpecifier => {
                        if pending_type.is_some() {
                            return Err(b.malformed(node, "parameter type without a name"));
                        }
                        pending_type = Some(b.type_text(type_node)?);
                    }
                    ParseElement::Token(token) if token.kind == TokenKind::Identifier => {
                        let type_name = pending_type
                            .take()
                            .ok_or_else(|| b.malformed(node, format!("parameter '{}' has no type", token.text)))?;
                        b.create(
                            NodeKind::Parameter { name: token.text.clone(), type_name },
                            b.token_location(token),
                        )?;
                    }
                    ParseElement::Token(token) if token.text == "," => {}
                    other => {
                        return Err(CompilerError::malformed(
                            node.rule.construct_name(),
                            b.location_of(other),
                            "unexpected element in parameter list",
                        ))
                    }
                }
            }
            if pending_type.is_some() {
                return Err(b.malformed(node, "parameter type without a name"));
            }
            Ok(())
        })?;

        Ok(fargs)
    }
}
