//! Abstract Syntax Tree for MiniC
//!
//! Nodes live in an arena ([`Ast`]) and are addressed by [`NodeId`]
//! handles. Each node owns a fixed number of child slots determined by
//! its [`NodeKind`]; children keep a non-owning handle to their parent.
//! The tree is built by the adapter in [`crate::builder`] and walked by
//! implementations of [`AstVisitor`].

pub mod kinds;
pub mod ops;
pub mod visitor;

pub use kinds::{slots, NodeKind};
pub use ops::{BinaryOp, UnaryOp};
pub use visitor::AstVisitor;

use log::trace;
use mcc_common::{CompilerError, SourceLocation};
use serde::Serialize;
use std::fmt;

/// Monotonic debug serial of an AST node
pub type Serial = u32;

/// Node ID generator for AST nodes
#[derive(Debug, Clone, Default)]
pub struct NodeIdGenerator {
    next_id: Serial,
}

impl NodeIdGenerator {
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    pub fn next(&mut self) -> Serial {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Handle of a node inside an [`Ast`] arena
/// Only minted by [`Ast::create_node`]; not deserializable, so a handle always
/// comes from some arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    pub serial: Serial,
    pub kind: NodeKind,
    pub location: SourceLocation,
    parent: Option<NodeId>,
    slots: Vec<Vec<NodeId>>,
}

impl AstNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Debug identity, `_<serial>`
    pub fn debug_name(&self) -> String {
        format!("_{}", self.serial)
    }
}

/// Arena owning every node of one compile unit
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeId>,
    #[serde(skip)]
    serials: NodeIdGenerator,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node with the slot count its kind declares
    pub fn create_node(&mut self, kind: NodeKind, location: SourceLocation) -> NodeId {
        let id = NodeId(self.nodes.len());
        let serial = self.serials.next();
        let slots = vec![Vec::new(); kind.slot_count()];
        trace!("create {} _{} at {}", kind, serial, location);
        self.nodes.push(AstNode {
            serial,
            kind,
            location,
            parent: None,
            slots,
        });
        id
    }

    /// Append `child` to slot `slot` of `parent` and record the back-reference
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId, slot: usize) -> Result<(), CompilerError> {
        self.check_handle(parent)?;
        self.check_handle(child)?;

        let reject = |ast: &Ast, reason: String| {
            let node = ast.node(parent);
            CompilerError::structural(
                format!("{}#{}", node.kind.tag(), node.serial),
                slot,
                node.location.clone(),
                reason,
            )
        };

        let slot_count = self.node(parent).slot_count();
        if slot_count == 0 {
            return Err(reject(self, "node declares no slots".to_string()));
        }
        if slot >= slot_count {
            return Err(reject(self, format!("slot index out of range 0..{}", slot_count)));
        }
        if parent == child {
            return Err(reject(self, "node cannot be its own child".to_string()));
        }
        if let Some(owner) = self.node(child).parent {
            let owner = self.node(owner);
            return Err(reject(
                self,
                format!("child already attached to {}#{}", owner.kind.tag(), owner.serial),
            ));
        }

        trace!("attach _{} to _{} slot {}", self.node(child).serial, self.node(parent).serial, slot);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].slots[slot].push(child);
        Ok(())
    }

    /// Borrow a node. Handles are only minted by this arena, so indexing cannot fail
    /// for ids obtained from it.
    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { ast: self, id }
    }

    /// Checked [`Ast::get`] for handles that may come from another arena
    pub fn try_get(&self, id: NodeId) -> Result<NodeRef<'_>, CompilerError> {
        self.check_handle(id)?;
        Ok(self.get(id))
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All children of `id`, slot by slot, each slot in insertion order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).slots.iter().flatten().copied()
    }

    /// Children of one slot; an undeclared slot yields nothing
    pub fn children_in(&self, id: NodeId, slot: usize) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).slots.get(slot).into_iter().flatten().copied()
    }

    fn check_handle(&self, id: NodeId) -> Result<(), CompilerError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(CompilerError::internal(format!("node handle {} is not part of this tree", id.0)))
        }
    }
}

/// Borrowed view of one node together with its arena
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.ast.node(self.id).kind
    }

    pub fn location(&self) -> &'a SourceLocation {
        &self.ast.node(self.id).location
    }

    pub fn serial(&self) -> Serial {
        self.ast.node(self.id).serial
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.ast.node(self.id).parent.map(|id| self.ast.get(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        ast.children(self.id).map(move |id| ast.get(id))
    }

    pub fn children_in(&self, slot: usize) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        ast.children_in(self.id, slot).map(move |id| ast.get(id))
    }

    /// First child of a slot, if any
    pub fn child(&self, slot: usize) -> Option<NodeRef<'a>> {
        self.children_in(slot).next()
    }

    pub fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V, scope: &V::Scope) -> V::Output {
        visitor::accept(*self, visitor, scope)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} _{}", self.kind(), self.serial())
    }
}
