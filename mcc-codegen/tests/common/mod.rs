//! Parse tree builders shared by the code generation tests
#![allow(dead_code)]

use mcc_codegen::{generate_assembly, CodeGenerator, CodegenOptions, EmitTree};
use mcc_common::CompilerError;
use mcc_frontend::{build_ast, ParseNode, Rule, TokenKind};

pub fn ty(name: &str) -> ParseNode {
    ParseNode::new(Rule::TypeSpecifier).token(TokenKind::TypeName, name)
}

pub fn num(value: i64) -> ParseNode {
    ParseNode::new(Rule::PrimaryExpression).token(TokenKind::Number, &value.to_string())
}

pub fn ident(name: &str) -> ParseNode {
    ParseNode::new(Rule::PrimaryExpression).token(TokenKind::Identifier, name)
}

pub fn binary(left: ParseNode, op: &str, right: ParseNode) -> ParseNode {
    ParseNode::new(Rule::BinaryExpression)
        .node(left)
        .token(TokenKind::Operator, op)
        .node(right)
}

pub fn unary(op: &str, operand: ParseNode) -> ParseNode {
    ParseNode::new(Rule::UnaryExpression)
        .token(TokenKind::Operator, op)
        .node(operand)
}

pub fn assign(name: &str, value: ParseNode) -> ParseNode {
    ParseNode::new(Rule::AssignExpression)
        .token(TokenKind::Identifier, name)
        .token(TokenKind::Operator, "=")
        .node(value)
}

pub fn call(name: &str, args: Vec<ParseNode>) -> ParseNode {
    let mut node = ParseNode::new(Rule::CallExpression)
        .token(TokenKind::Identifier, name)
        .token(TokenKind::Punctuation, "(");
    if !args.is_empty() {
        let mut list = ParseNode::new(Rule::Args);
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                list = list.token(TokenKind::Punctuation, ",");
            }
            list = list.node(arg);
        }
        node = node.node(list);
    }
    node.token(TokenKind::Punctuation, ")")
}

pub fn stmt(expr: ParseNode) -> ParseNode {
    ParseNode::new(Rule::Statement)
        .node(expr)
        .token(TokenKind::Punctuation, ";")
}

pub fn ret(expr: ParseNode) -> ParseNode {
    ParseNode::new(Rule::Statement)
        .token(TokenKind::Keyword, "return")
        .node(expr)
        .token(TokenKind::Punctuation, ";")
}

pub fn brk() -> ParseNode {
    ParseNode::new(Rule::Statement)
        .token(TokenKind::Keyword, "break")
        .token(TokenKind::Punctuation, ";")
}

pub fn local(name: &str, init: Option<ParseNode>) -> ParseNode {
    let mut node = ParseNode::new(Rule::LocalDeclaration)
        .node(ty("int"))
        .token(TokenKind::Identifier, name);
    if let Some(init) = init {
        node = node.token(TokenKind::Operator, "=").node(init);
    }
    node.token(TokenKind::Punctuation, ";")
}

pub fn global(name: &str, init: Option<ParseNode>) -> ParseNode {
    let mut node = ParseNode::new(Rule::Declaration)
        .node(ty("int"))
        .token(TokenKind::Identifier, name);
    if let Some(init) = init {
        node = node.node(
            ParseNode::new(Rule::Initializer)
                .token(TokenKind::Operator, "=")
                .node(init),
        );
    }
    node.token(TokenKind::Punctuation, ";")
}

pub fn block(statements: Vec<ParseNode>) -> ParseNode {
    let mut list = ParseNode::new(Rule::StatementList);
    for s in statements {
        list = list.node(s);
    }
    ParseNode::new(Rule::Block)
        .token(TokenKind::Punctuation, "{")
        .node(list)
        .token(TokenKind::Punctuation, "}")
}

pub fn if_else(cond: ParseNode, then: ParseNode, otherwise: Option<ParseNode>) -> ParseNode {
    let mut node = ParseNode::new(Rule::IfStatement)
        .token(TokenKind::Keyword, "if")
        .token(TokenKind::Punctuation, "(")
        .node(cond)
        .token(TokenKind::Punctuation, ")")
        .node(then);
    if let Some(otherwise) = otherwise {
        node = node.token(TokenKind::Keyword, "else").node(otherwise);
    }
    node
}

pub fn while_loop(cond: ParseNode, body: ParseNode) -> ParseNode {
    ParseNode::new(Rule::WhileStatement)
        .token(TokenKind::Keyword, "while")
        .token(TokenKind::Punctuation, "(")
        .node(cond)
        .token(TokenKind::Punctuation, ")")
        .node(body)
}

fn fargs(params: &[&str]) -> ParseNode {
    let mut fargs = ParseNode::new(Rule::Fargs);
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            fargs = fargs.token(TokenKind::Punctuation, ",");
        }
        fargs = fargs.node(ty("int")).token(TokenKind::Identifier, p);
    }
    fargs
}

pub fn function(name: &str, params: &[&str], body: ParseNode) -> ParseNode {
    let mut node = ParseNode::new(Rule::FunctionDefinition)
        .node(ty("int"))
        .token(TokenKind::Identifier, name)
        .token(TokenKind::Punctuation, "(");
    if !params.is_empty() {
        node = node.node(fargs(params));
    }
    node.token(TokenKind::Punctuation, ")").node(body)
}

pub fn prototype(name: &str, params: &[&str]) -> ParseNode {
    let mut node = ParseNode::new(Rule::FunctionDeclaration)
        .node(ty("int"))
        .token(TokenKind::Identifier, name)
        .token(TokenKind::Punctuation, "(");
    if !params.is_empty() {
        node = node.node(fargs(params));
    }
    let decl = node
        .token(TokenKind::Punctuation, ")")
        .token(TokenKind::Punctuation, ";");
    ParseNode::new(Rule::Declaration).node(decl)
}

pub fn unit(items: Vec<ParseNode>) -> ParseNode {
    let mut node = ParseNode::new(Rule::CompileUnit);
    for item in items {
        node = node.node(item);
    }
    node
}

pub fn compile_with(tree: &ParseNode, options: &CodegenOptions) -> Result<String, CompilerError> {
    let ast = build_ast(tree, "test.minic")?;
    generate_assembly(&ast, options)
}

pub fn compile(tree: &ParseNode) -> String {
    compile_with(tree, &CodegenOptions::default()).expect("program should compile")
}

pub fn emission_tree(tree: &ParseNode) -> EmitTree {
    let ast = build_ast(tree, "test.minic").expect("tree should build");
    CodeGenerator::new(CodegenOptions::default())
        .generate(&ast)
        .expect("program should compile")
}

/// Lines of generated text without indentation
pub fn lines(asm: &str) -> Vec<&str> {
    asm.lines().map(str::trim).collect()
}

/// Lines of `asm` from the first one equal to `from` up to and including `to`
pub fn section<'a>(asm: &'a str, from: &str, to: &str) -> Vec<&'a str> {
    let all = lines(asm);
    let start = all.iter().position(|l| *l == from).expect("start line present");
    let end = all[start..].iter().position(|l| *l == to).expect("end line present") + start;
    all[start..=end].to_vec()
}
