//! Assembly emission tree
//!
//! The generator does not write text directly. It builds a tree of
//! emission nodes: leaves own a line buffer, composites (file, function,
//! if, while, compound) own ordered child lists per named context and
//! produce their text only when assembled. Nodes live in an arena
//! ([`EmitTree`]) and refer to each other by [`EmitId`].

mod assemble;
mod buffer;

pub use buffer::AsmBuffer;

use crate::asm::AsmInst;
use crate::options::{CodegenOptions, TextStyle};
use crate::symbols::{FunctionFrame, GlobalSymbols};
use log::trace;
use mcc_common::CompilerError;
use std::fmt;

/// Handle of a node inside an [`EmitTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitKind {
    File,
    Function,
    If,
    While,
    Compound,
    Expression,
    Assignment,
    Return,
    None,
}

impl EmitKind {
    /// Prefix of node names and generated labels
    pub fn label(self) -> &'static str {
        match self {
            EmitKind::File => "FILE",
            EmitKind::Function => "FUNCTION",
            EmitKind::If => "IF",
            EmitKind::While => "WHILE",
            EmitKind::Compound => "COMPOUND",
            EmitKind::Expression => "EXPRESSION",
            EmitKind::Assignment => "ASSIGNMENT",
            EmitKind::Return => "RETURN",
            EmitKind::None => "NA",
        }
    }

    /// Contexts a composite of this kind declares, in assembly order.
    /// Leaf kinds declare none.
    pub fn contexts(self) -> &'static [EmitContext] {
        match self {
            EmitKind::File => &[EmitContext::FileData, EmitContext::FileCode],
            EmitKind::Function => &[EmitContext::FunctionHeader, EmitContext::FunctionBody],
            EmitKind::If => &[EmitContext::IfCondition, EmitContext::IfThen, EmitContext::IfElse],
            EmitKind::While => &[EmitContext::WhileCondition, EmitContext::WhileBody],
            EmitKind::Compound => &[EmitContext::CompoundBody],
            EmitKind::Expression
            | EmitKind::Assignment
            | EmitKind::Return
            | EmitKind::None => &[],
        }
    }

    pub fn is_composite(self) -> bool {
        !self.contexts().is_empty()
    }
}

/// Named child lists of composite emission nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitContext {
    FileData,
    FileCode,
    FunctionHeader,
    FunctionBody,
    IfCondition,
    IfThen,
    IfElse,
    WhileCondition,
    WhileBody,
    CompoundBody,
}

impl fmt::Display for EmitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

type Contexts = Vec<(EmitContext, Vec<EmitId>)>;

#[derive(Debug, Clone)]
enum EmitBody {
    Leaf(AsmBuffer),
    File { contexts: Contexts, symbols: GlobalSymbols },
    Function { contexts: Contexts, frame: FunctionFrame },
    Block { contexts: Contexts },
}

#[derive(Debug, Clone)]
struct EmitNode {
    kind: EmitKind,
    name: String,
    parent: Option<EmitId>,
    /// Nesting at construction, where the node's own lines start
    base: usize,
    /// Current nesting, inherited by children created under this node
    nesting: usize,
    body: EmitBody,
}

/// Arena holding the emission tree of one compile unit, rooted at a File node
#[derive(Debug, Clone)]
pub struct EmitTree {
    nodes: Vec<EmitNode>,
    options: CodegenOptions,
    style: TextStyle,
}

impl EmitTree {
    pub fn new(options: CodegenOptions) -> Self {
        let style = options.text_style();
        let mut tree = Self {
            nodes: Vec::new(),
            options,
            style,
        };
        let contexts = empty_contexts(EmitKind::File);
        tree.push(
            EmitKind::File,
            None,
            EmitBody::File {
                contexts,
                symbols: GlobalSymbols::new(),
            },
        );
        tree
    }

    pub fn file(&self) -> EmitId {
        EmitId(0)
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Create a node of `kind` under `parent`, inheriting its nesting
    pub fn create(&mut self, kind: EmitKind, parent: EmitId) -> Result<EmitId, CompilerError> {
        let body = match kind {
            EmitKind::Expression | EmitKind::Assignment | EmitKind::Return | EmitKind::None => {
                let nesting = self.node(parent)?.nesting;
                EmitBody::Leaf(AsmBuffer::new(self.style, nesting))
            }
            EmitKind::If | EmitKind::While | EmitKind::Compound => EmitBody::Block {
                contexts: empty_contexts(kind),
            },
            EmitKind::File | EmitKind::Function => {
                return Err(CompilerError::internal(format!(
                    "{} nodes are not created through create()",
                    kind.label()
                )))
            }
        };
        self.node(parent)?;
        Ok(self.push(kind, Some(parent), body))
    }

    /// Create a Function composite under the File node
    pub fn create_function(&mut self, name: &str) -> EmitId {
        let body = EmitBody::Function {
            contexts: empty_contexts(EmitKind::Function),
            frame: FunctionFrame::new(name),
        };
        let file = self.file();
        self.push(EmitKind::Function, Some(file), body)
    }

    fn push(&mut self, kind: EmitKind, parent: Option<EmitId>, body: EmitBody) -> EmitId {
        let id = EmitId(self.nodes.len());
        let nesting = parent.map_or(0, |p| self.nodes[p.0].nesting);
        let name = format!("{}_{}", kind.label(), id.0);
        trace!("emit node {} at nesting {}", name, nesting);
        self.nodes.push(EmitNode {
            kind,
            name,
            parent,
            base: nesting,
            nesting,
            body,
        });
        id
    }

    fn node(&self, id: EmitId) -> Result<&EmitNode, CompilerError> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| CompilerError::internal(format!("emission handle {} is not part of this tree", id.0)))
    }

    fn node_mut(&mut self, id: EmitId) -> Result<&mut EmitNode, CompilerError> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| CompilerError::internal(format!("emission handle {} is not part of this tree", id.0)))
    }

    pub fn kind(&self, id: EmitId) -> Result<EmitKind, CompilerError> {
        Ok(self.node(id)?.kind)
    }

    /// `<KIND>_<serial>`, also the stem of the node's labels
    pub fn name(&self, id: EmitId) -> Result<&str, CompilerError> {
        Ok(&self.node(id)?.name)
    }

    pub fn parent(&self, id: EmitId) -> Result<Option<EmitId>, CompilerError> {
        Ok(self.node(id)?.parent)
    }

    pub fn nesting(&self, id: EmitId) -> Result<usize, CompilerError> {
        Ok(self.node(id)?.nesting)
    }

    /// Label `<KIND>_<serial>_<suffix>` owned by node `id`
    pub fn label(&self, id: EmitId, suffix: &str) -> Result<String, CompilerError> {
        Ok(format!("{}_{}", self.name(id)?, suffix))
    }

    /// One level deeper; a leaf indents code added afterwards accordingly
    pub fn enter_scope(&mut self, id: EmitId) -> Result<(), CompilerError> {
        let node = self.node_mut(id)?;
        node.nesting += 1;
        if let EmitBody::Leaf(buffer) = &mut node.body {
            buffer.enter_scope();
        }
        Ok(())
    }

    pub fn leave_scope(&mut self, id: EmitId) -> Result<(), CompilerError> {
        let node = self.node_mut(id)?;
        if node.nesting == 0 {
            return Err(CompilerError::NestingImbalance {
                scope: node.name.clone(),
            });
        }
        node.nesting -= 1;
        if let EmitBody::Leaf(buffer) = &mut node.body {
            buffer.leave_scope(&node.name)?;
        }
        Ok(())
    }

    /// Append `child` to `context` of composite `parent` and re-parent it
    pub fn add_child(&mut self, parent: EmitId, context: EmitContext, child: EmitId) -> Result<(), CompilerError> {
        self.node(child)?;
        let node = self.node_mut(parent)?;
        let name = node.name.clone();
        let list = contexts_mut(&mut node.body)
            .and_then(|contexts| contexts.iter_mut().find(|(ctx, _)| *ctx == context))
            .map(|(_, list)| list)
            .ok_or_else(|| CompilerError::internal(format!("{} has no {} context", name, context)))?;
        list.push(child);
        self.nodes[child.0].parent = Some(parent);
        trace!("{} += {} in {}", name, self.nodes[child.0].name, context);
        Ok(())
    }

    /// Children of one context of a composite
    pub fn children(&self, id: EmitId, context: EmitContext) -> Result<&[EmitId], CompilerError> {
        let node = self.node(id)?;
        contexts_of(&node.body)
            .and_then(|contexts| contexts.iter().find(|(ctx, _)| *ctx == context))
            .map(|(_, list)| list.as_slice())
            .ok_or_else(|| CompilerError::internal(format!("{} has no {} context", node.name, context)))
    }

    fn leaf_mut(&mut self, id: EmitId) -> Result<&mut AsmBuffer, CompilerError> {
        let node = self.node_mut(id)?;
        match &mut node.body {
            EmitBody::Leaf(buffer) => Ok(buffer),
            _ => Err(CompilerError::internal(format!("{} is not a leaf", node.name))),
        }
    }

    /// Text of a leaf node
    pub fn leaf(&self, id: EmitId) -> Result<&AsmBuffer, CompilerError> {
        let node = self.node(id)?;
        match &node.body {
            EmitBody::Leaf(buffer) => Ok(buffer),
            _ => Err(CompilerError::internal(format!("{} is not a leaf", node.name))),
        }
    }

    pub fn add_code(&mut self, id: EmitId, code: &str) -> Result<(), CompilerError> {
        self.leaf_mut(id)?.add_code(code);
        Ok(())
    }

    pub fn add_inst(&mut self, id: EmitId, inst: AsmInst) -> Result<(), CompilerError> {
        trace!("  {}", inst);
        self.leaf_mut(id)?.add_inst(&inst);
        Ok(())
    }

    /// Fold the code of leaf `source` into leaf `target`; `source` becomes a
    /// child of `target` that is not assembled on its own
    pub fn absorb(&mut self, target: EmitId, source: EmitId) -> Result<(), CompilerError> {
        let code = self.leaf(source)?.text().to_string();
        self.leaf_mut(target)?.add_code(&code);
        self.node_mut(source)?.parent = Some(target);
        Ok(())
    }

    pub fn globals(&self) -> Result<&GlobalSymbols, CompilerError> {
        match &self.node(self.file())?.body {
            EmitBody::File { symbols, .. } => Ok(symbols),
            _ => Err(CompilerError::internal("tree root is not a file node")),
        }
    }

    fn globals_mut(&mut self) -> Result<&mut GlobalSymbols, CompilerError> {
        let file = self.file();
        match &mut self.node_mut(file)?.body {
            EmitBody::File { symbols, .. } => Ok(symbols),
            _ => Err(CompilerError::internal("tree root is not a file node")),
        }
    }

    /// Declare a global variable. The first declaration of a name appends a
    /// `DWORD` line to the data section; later ones are ignored.
    pub fn declare_global_variable(&mut self, name: &str, init: Option<i32>) -> Result<bool, CompilerError> {
        if !self.globals_mut()?.declare_variable(name) {
            trace!("global {} already declared", name);
            return Ok(false);
        }
        self.append_data(AsmInst::Dword(name.to_string(), init))?;
        Ok(true)
    }

    /// Declare an external function. The first declaration appends a
    /// `PROTO` line to the data section.
    pub fn declare_function(&mut self, name: &str, arity: usize) -> Result<bool, CompilerError> {
        if !self.globals_mut()?.declare_function(name) {
            trace!("function {} already declared", name);
            return Ok(false);
        }
        self.append_data(AsmInst::Proto(name.to_string(), arity))?;
        Ok(true)
    }

    /// Record a defined function's name so a later prototype is skipped
    pub fn register_function_name(&mut self, name: &str) -> Result<bool, CompilerError> {
        Ok(self.globals_mut()?.declare_function(name))
    }

    fn append_data(&mut self, inst: AsmInst) -> Result<(), CompilerError> {
        let file = self.file();
        let leaf = self.create(EmitKind::None, file)?;
        self.add_inst(leaf, inst)?;
        self.add_child(file, EmitContext::FileData, leaf)
    }

    pub fn frame(&self, function: EmitId) -> Result<&FunctionFrame, CompilerError> {
        let node = self.node(function)?;
        match &node.body {
            EmitBody::Function { frame, .. } => Ok(frame),
            _ => Err(CompilerError::internal(format!("{} is not a function", node.name))),
        }
    }

    fn frame_mut(&mut self, function: EmitId) -> Result<&mut FunctionFrame, CompilerError> {
        let node = self.node_mut(function)?;
        match &mut node.body {
            EmitBody::Function { frame, .. } => Ok(frame),
            _ => Err(CompilerError::internal(format!("{} is not a function", node.name))),
        }
    }

    /// Register a parameter of `function`, returning its frame offset
    pub fn declare_param(&mut self, function: EmitId, name: &str) -> Result<i32, CompilerError> {
        let (offset, is_new) = self.frame_mut(function)?.add_param(name);
        if is_new {
            self.frame_comment(function, format!("param {} at [ebp+{}]", name, offset))?;
        }
        Ok(offset)
    }

    /// Register a local of `function`, returning its frame offset
    pub fn declare_local(&mut self, function: EmitId, name: &str) -> Result<i32, CompilerError> {
        let (offset, is_new) = self.frame_mut(function)?.add_local(name);
        if is_new {
            self.frame_comment(function, format!("local {} at [ebp-{}]", name, -offset))?;
        }
        Ok(offset)
    }

    fn frame_comment(&mut self, function: EmitId, text: String) -> Result<(), CompilerError> {
        let leaf = self.create(EmitKind::None, function)?;
        self.add_inst(leaf, AsmInst::Comment(text))?;
        self.add_child(function, EmitContext::FunctionHeader, leaf)
    }

    /// Assemble the whole file
    pub fn emit(&self) -> Result<String, CompilerError> {
        Ok(self.assemble(self.file())?.into_text())
    }
}

fn empty_contexts(kind: EmitKind) -> Contexts {
    kind.contexts().iter().map(|ctx| (*ctx, Vec::new())).collect()
}

fn contexts_of(body: &EmitBody) -> Option<&Contexts> {
    match body {
        EmitBody::Leaf(_) => None,
        EmitBody::File { contexts, .. }
        | EmitBody::Function { contexts, .. }
        | EmitBody::Block { contexts } => Some(contexts),
    }
}

fn contexts_mut(body: &mut EmitBody) -> Option<&mut Contexts> {
    match body {
        EmitBody::Leaf(_) => None,
        EmitBody::File { contexts, .. }
        | EmitBody::Function { contexts, .. }
        | EmitBody::Block { contexts } => Some(contexts),
    }
}
