//! Compile unit, functions and declarations

use super::{identifier_name, CodeGenerator, GenResult, Scope};
use crate::asm::{AsmInst, Operand, Reg};
use crate::emit::{EmitContext, EmitKind};
use log::debug;
use mcc_common::CompilerError;
use mcc_frontend::{slots, NodeKind, NodeRef, UnaryOp};

impl CodeGenerator {
    pub(super) fn gen_compile_unit(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let file = self.tree.file();
        for child in node.children_in(slots::COMPILE_UNIT_BODY) {
            let code = child.accept(self, scope)?;
            let context = match child.kind() {
                NodeKind::GlobalDeclaration => EmitContext::FileData,
                _ => EmitContext::FileCode,
            };
            self.tree.add_child(file, context, code)?;
        }
        Ok(file)
    }

    pub(super) fn gen_function_definition(&mut self, node: NodeRef<'_>, _scope: &Scope) -> GenResult {
        let NodeKind::FunctionDefinition { name, .. } = node.kind() else {
            return Err(CompilerError::internal("function definition visit on another kind"));
        };
        debug!("generating function {}", name);

        self.tree.register_function_name(name)?;
        let function = self.tree.create_function(name);
        self.tree.enter_scope(function)?;

        let inner = Scope {
            parent: function,
            function: Some(function),
            loop_end: None,
        };

        // parameters first, so their offsets are known to the body
        for params in node.children_in(slots::FUNCTION_PARAMS) {
            params.accept(self, &inner)?;
        }
        let rest = node
            .children_in(slots::FUNCTION_BODY)
            .chain(node.children_in(slots::FUNCTION_RETURN_TYPE));
        for child in rest {
            let code = child.accept(self, &inner)?;
            self.tree.add_child(function, EmitContext::FunctionBody, code)?;
        }

        self.tree.leave_scope(function)?;
        debug!(
            "function {} uses {} bytes of locals",
            name,
            self.tree.frame(function)?.local_bytes()
        );
        Ok(function)
    }

    pub(super) fn gen_fargs(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        for param in node.children_in(slots::FARGS_PARAMS) {
            param.accept(self, scope)?;
        }
        self.empty(scope)
    }

    pub(super) fn gen_parameter(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let NodeKind::Parameter { name, .. } = node.kind() else {
            return Err(CompilerError::internal("parameter visit on another kind"));
        };
        let function = self.require_function(scope, node, "parameter")?;
        self.tree.declare_param(function, name)?;
        self.empty(scope)
    }

    /// A prototype line in the data section, once per name
    pub(super) fn gen_function_declaration(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let NodeKind::FunctionDeclaration { name, .. } = node.kind() else {
            return Err(CompilerError::internal("function declaration visit on another kind"));
        };
        let arity = node
            .children_in(slots::DECLARATION_PARAMS)
            .map(|fargs| fargs.children_in(slots::FARGS_PARAMS).count())
            .sum();
        self.tree.declare_function(name, arity)?;
        self.empty(scope)
    }

    pub(super) fn gen_global_declaration(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let (name, init) = declared_variable(node)?;
        let value = init.map(constant_value).transpose()?;
        self.tree.declare_global_variable(name, value)?;
        self.empty(scope)
    }

    /// Evaluate the initializer, then reserve the local's slot and store
    /// into it. The initializer still sees the binding the local shadows.
    pub(super) fn gen_local_declaration(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        let function = self.require_function(scope, node, "local declaration")?;
        let (name, init) = declared_variable(node)?;
        let value = init.map(|init| init.accept(self, scope)).transpose()?;
        let offset = self.tree.declare_local(function, name)?;

        let leaf = self.tree.create(EmitKind::Assignment, scope.parent)?;
        if let Some(value) = value {
            self.tree.absorb(leaf, value)?;
            self.tree.add_inst(leaf, AsmInst::Mov(Operand::Frame(offset), Reg::Eax.into()))?;
        }
        Ok(leaf)
    }
}

/// Name and optional initializer of a variable declaration whose parts
/// are type, identifier, initializer
fn declared_variable(node: NodeRef<'_>) -> Result<(&str, Option<NodeRef<'_>>), CompilerError> {
    let mut parts = node
        .children_in(slots::DECLARATION_PARTS)
        .filter(|part| !matches!(part.kind(), NodeKind::TypeSpecifier { .. }));
    let ident = parts.next().ok_or_else(|| {
        CompilerError::codegen_error("declaration without a name", node.location().clone())
    })?;
    Ok((identifier_name(ident)?, parts.next()))
}

/// Value of a global initializer: a literal, optionally signed
fn constant_value(init: NodeRef<'_>) -> Result<i32, CompilerError> {
    match init.kind() {
        NodeKind::NumberLiteral { value } => Ok(*value),
        NodeKind::UnaryExpression { op: op @ (UnaryOp::Plus | UnaryOp::Minus) } => {
            match init.child(slots::UNARY_OPERAND).map(|operand| operand.kind()) {
                Some(NodeKind::NumberLiteral { value }) if *op == UnaryOp::Minus => Ok(value.wrapping_neg()),
                Some(NodeKind::NumberLiteral { value }) => Ok(*value),
                _ => Err(CompilerError::codegen_error(
                    "global initializer must be a constant",
                    init.location().clone(),
                )),
            }
        }
        other => Err(CompilerError::codegen_error(
            format!("global initializer must be a constant, found {}", other),
            init.location().clone(),
        )),
    }
}
