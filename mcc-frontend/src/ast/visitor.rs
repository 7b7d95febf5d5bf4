//! Visitor over AST nodes
//!
//! Dispatch is a single exhaustive match on [`NodeKind`], so every
//! visitor must say what it does with every kind. The `Scope` type is
//! the environment a visitor threads down the traversal; it is passed by
//! reference and each visit method builds a new one for its children
//! instead of mutating shared state.

use super::{NodeKind, NodeRef};

pub trait AstVisitor {
    type Output;
    type Scope;

    fn visit_compile_unit(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_function_definition(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_function_declaration(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_global_declaration(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_local_declaration(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_block(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_if(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_while(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_return(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_break(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_binary(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_unary(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_assignment(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_call(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_number(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_identifier(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_type_specifier(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_parameter(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_fargs(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
    fn visit_args(&mut self, node: NodeRef<'_>, scope: &Self::Scope) -> Self::Output;
}

/// Dispatch `node` to the visit method for its kind
pub fn accept<V: AstVisitor + ?Sized>(node: NodeRef<'_>, visitor: &mut V, scope: &V::Scope) -> V::Output {
    match node.kind() {
        NodeKind::CompileUnit => visitor.visit_compile_unit(node, scope),
        NodeKind::FunctionDefinition { .. } => visitor.visit_function_definition(node, scope),
        NodeKind::FunctionDeclaration { .. } => visitor.visit_function_declaration(node, scope),
        NodeKind::GlobalDeclaration => visitor.visit_global_declaration(node, scope),
        NodeKind::LocalDeclaration => visitor.visit_local_declaration(node, scope),
        NodeKind::Block => visitor.visit_block(node, scope),
        NodeKind::IfStatement => visitor.visit_if(node, scope),
        NodeKind::WhileStatement => visitor.visit_while(node, scope),
        NodeKind::ReturnStatement => visitor.visit_return(node, scope),
        NodeKind::BreakStatement => visitor.visit_break(node, scope),
        NodeKind::BinaryExpression { .. } => visitor.visit_binary(node, scope),
        NodeKind::UnaryExpression { .. } => visitor.visit_unary(node, scope),
        NodeKind::AssignmentExpression => visitor.visit_assignment(node, scope),
        NodeKind::FunctionCallExpression { .. } => visitor.visit_call(node, scope),
        NodeKind::NumberLiteral { .. } => visitor.visit_number(node, scope),
        NodeKind::Identifier { .. } => visitor.visit_identifier(node, scope),
        NodeKind::TypeSpecifier { .. } => visitor.visit_type_specifier(node, scope),
        NodeKind::Parameter { .. } => visitor.visit_parameter(node, scope),
        NodeKind::Fargs => visitor.visit_fargs(node, scope),
        NodeKind::Args => visitor.visit_args(node, scope),
    }
}
