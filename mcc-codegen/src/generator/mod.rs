//! Code generation from the AST to the emission tree
//!
//! [`CodeGenerator`] is an [`AstVisitor`] whose visits each return the
//! emission node built for the visited AST node. Where a visit needs to
//! know its surroundings (the enclosing function, the innermost loop, the
//! composite new nodes are created under) it reads them from the
//! [`Scope`] passed down by its caller.

mod declarations;
mod expressions;
mod statements;

use crate::emit::{EmitId, EmitKind, EmitTree};
use crate::options::CodegenOptions;
use crate::symbols::VarLocation;
use log::info;
use mcc_common::CompilerError;
use mcc_frontend::{Ast, AstVisitor, NodeKind, NodeRef};

/// Environment threaded down the traversal
#[derive(Debug, Clone)]
pub struct Scope {
    /// Composite new emission nodes are created under
    pub parent: EmitId,
    /// Function whose frame resolves names, if inside one
    pub function: Option<EmitId>,
    /// End label of the innermost enclosing loop
    pub loop_end: Option<String>,
}

impl Scope {
    pub fn file(file: EmitId) -> Self {
        Self {
            parent: file,
            function: None,
            loop_end: None,
        }
    }

    /// Same surroundings, new nodes created under `parent`
    pub fn under(&self, parent: EmitId) -> Self {
        Self {
            parent,
            ..self.clone()
        }
    }
}

type GenResult = Result<EmitId, CompilerError>;

/// Walks an AST and builds its emission tree
pub struct CodeGenerator {
    tree: EmitTree,
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            tree: EmitTree::new(options),
        }
    }

    /// Generate the emission tree of a compile unit
    pub fn generate(mut self, ast: &Ast) -> Result<EmitTree, CompilerError> {
        let root = ast
            .root()
            .ok_or_else(|| CompilerError::internal("AST has no compile unit root"))?;
        if root.kind() != &NodeKind::CompileUnit {
            return Err(CompilerError::codegen_error(
                format!("expected a compile unit at the root, found {}", root.kind()),
                root.location().clone(),
            ));
        }

        info!("generating code for {} AST nodes", ast.len());
        let scope = Scope::file(self.tree.file());
        root.accept(&mut self, &scope)?;
        Ok(self.tree)
    }

    /// Empty leaf for nodes that produce no code
    fn empty(&mut self, scope: &Scope) -> GenResult {
        self.tree.create(EmitKind::None, scope.parent)
    }

    /// Where `name` lives, looked up local, parameter, then global
    fn resolve(&self, scope: &Scope, name: &str) -> Result<VarLocation, CompilerError> {
        match scope.function {
            Some(function) => Ok(self.tree.frame(function)?.resolve(name)),
            None => Ok(VarLocation::Global(name.to_string())),
        }
    }

    /// The enclosing function, or a codegen error naming `what` at `node`
    fn require_function(&self, scope: &Scope, node: NodeRef<'_>, what: &str) -> GenResult {
        scope.function.ok_or_else(|| {
            CompilerError::codegen_error(format!("{} outside of a function", what), node.location().clone())
        })
    }
}

/// First child of `slot`, or a codegen error naming what is missing
fn required<'a>(node: NodeRef<'a>, slot: usize, what: &str) -> Result<NodeRef<'a>, CompilerError> {
    node.child(slot).ok_or_else(|| {
        CompilerError::codegen_error(format!("{} without {}", node.kind().tag(), what), node.location().clone())
    })
}

/// Name carried by an identifier node
fn identifier_name<'a>(node: NodeRef<'a>) -> Result<&'a str, CompilerError> {
    match node.kind() {
        NodeKind::Identifier { name } => Ok(name),
        other => Err(CompilerError::codegen_error(
            format!("expected an identifier, found {}", other),
            node.location().clone(),
        )),
    }
}

impl AstVisitor for CodeGenerator {
    type Output = GenResult;
    type Scope = Scope;

    fn visit_compile_unit(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_compile_unit(node, scope)
    }

    fn visit_function_definition(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_function_definition(node, scope)
    }

    fn visit_function_declaration(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_function_declaration(node, scope)
    }

    fn visit_global_declaration(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_global_declaration(node, scope)
    }

    fn visit_local_declaration(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_local_declaration(node, scope)
    }

    fn visit_block(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_block(node, scope)
    }

    fn visit_if(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_if(node, scope)
    }

    fn visit_while(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_while(node, scope)
    }

    fn visit_return(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_return(node, scope)
    }

    fn visit_break(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_break(node, scope)
    }

    fn visit_binary(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_binary(node, scope)
    }

    fn visit_unary(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_unary(node, scope)
    }

    fn visit_assignment(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_assignment(node, scope)
    }

    fn visit_call(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_call(node, scope)
    }

    fn visit_number(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_number(node, scope)
    }

    fn visit_identifier(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_identifier(node, scope)
    }

    fn visit_type_specifier(&mut self, _node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.empty(scope)
    }

    fn visit_parameter(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_parameter(node, scope)
    }

    fn visit_fargs(&mut self, node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.gen_fargs(node, scope)
    }

    // argument lists are evaluated by the call that owns them
    fn visit_args(&mut self, _node: NodeRef<'_>, scope: &Scope) -> GenResult {
        self.empty(scope)
    }
}
