//! Tree types produced by the parser.
//!
//! Nodes live in an arena owned by [`Root`]. Containers refer to their
//! children by [`NodeId`], and every node records its container as a
//! [`Parent`], so the parent relation never owns anything.

use std::path::Path;
use std::sync::Arc;

use crate::tokenizer::Position;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The container a node belongs to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Parent {
    Root,
    Node(NodeId),
}

/// Where a node starts. `file` is shared by every node of one parse.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Source {
    pub file: Option<Arc<Path>>,
    pub line: u32,
    pub column: u32,
}

impl Source {
    pub(crate) fn new(file: Option<Arc<Path>>, position: Position) -> Self {
        Self {
            file,
            line: position.line,
            column: position.column,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    AtRule,
    Rule,
    Decl,
    Comment,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::AtRule => "atrule",
            NodeKind::Rule => "rule",
            NodeKind::Decl => "decl",
            NodeKind::Comment => "comment",
        }
    }
}

/// Whether a block holds nested rules or declarations.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BodyKind {
    Rules,
    Decls,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct AtRule {
    pub before: String,
    pub name: String,
    pub after_name: String,
    pub params: String,
    pub between: String,
    /// `None` for statements such as `@import "a.css";`.
    pub body: Option<Body>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Body {
    pub kind: BodyKind,
    pub children: Vec<NodeId>,
    pub after: String,
    pub semicolon: bool,
}

impl Body {
    pub(crate) fn new(kind: BodyKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            after: String::new(),
            semicolon: false,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Rule {
    pub before: String,
    pub selector: String,
    pub between: String,
    pub decls: Vec<NodeId>,
    pub after: String,
    /// The last declaration was followed by `;`.
    pub semicolon: bool,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Declaration {
    pub before: String,
    pub prop: String,
    pub between: String,
    pub value: String,
    pub important: bool,
    /// Raw text after the value: the `!important` marker and any whitespace
    /// in front of the terminating `;`.
    pub after: String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Comment {
    pub before: String,
    pub left: String,
    pub text: String,
    pub right: String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum NodeData {
    AtRule(AtRule),
    Rule(Rule),
    Decl(Declaration),
    Comment(Comment),
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Node {
    parent: Parent,
    pub source: Source,
    pub data: NodeData,
}

impl Node {
    pub fn parent(&self) -> Parent {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::AtRule(_) => NodeKind::AtRule,
            NodeData::Rule(_) => NodeKind::Rule,
            NodeData::Decl(_) => NodeKind::Decl,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    pub fn before(&self) -> &str {
        match &self.data {
            NodeData::AtRule(at_rule) => &at_rule.before,
            NodeData::Rule(rule) => &rule.before,
            NodeData::Decl(decl) => &decl.before,
            NodeData::Comment(comment) => &comment.before,
        }
    }

    /// Children in source order. Empty for leaves and bodiless at-rules.
    pub fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::AtRule(AtRule {
                body: Some(body), ..
            }) => &body.children,
            NodeData::Rule(rule) => &rule.decls,
            _ => &[],
        }
    }

    /// A declaration or an at-rule without a block, which ends with `;`
    /// unless it is the last statement of its container.
    pub fn is_statement(&self) -> bool {
        matches!(
            self.data,
            NodeData::Decl(_) | NodeData::AtRule(AtRule { body: None, .. })
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment(_))
    }

    pub fn as_at_rule(&self) -> Option<&AtRule> {
        match &self.data {
            NodeData::AtRule(at_rule) => Some(at_rule),
            _ => None,
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match &self.data {
            NodeData::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_decl(&self) -> Option<&Declaration> {
        match &self.data {
            NodeData::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match &self.data {
            NodeData::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_at_rule_mut(&mut self) -> Option<&mut AtRule> {
        match &mut self.data {
            NodeData::AtRule(at_rule) => Some(at_rule),
            _ => None,
        }
    }

    pub fn as_rule_mut(&mut self) -> Option<&mut Rule> {
        match &mut self.data {
            NodeData::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_decl_mut(&mut self) -> Option<&mut Declaration> {
        match &mut self.data {
            NodeData::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match &mut self.data {
            NodeData::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}

/// A parsed stylesheet. Owns every node of the tree.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Root {
    nodes: Vec<Node>,
    pub rules: Vec<NodeId>,
    pub after: String,
    /// The last top-level at-rule statement was followed by `;`.
    pub semicolon: bool,
    pub source: Source,
}

impl Root {
    pub(crate) fn new(file: Option<Arc<Path>>) -> Self {
        Self {
            nodes: Vec::new(),
            rules: Vec::new(),
            after: String::new(),
            semicolon: false,
            source: Source::new(file, Position::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::Root
    }

    /// Panics if `id` comes from another tree, as do the other lookups taking
    /// a `NodeId`. Use [`Root::get`] for ids of unknown origin.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Panics if `id` comes from another tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Panics if `id` comes from another tree.
    pub fn parent(&self, id: NodeId) -> Parent {
        self.node(id).parent
    }

    /// Panics if `parent` names a node of another tree.
    pub fn children(&self, parent: Parent) -> &[NodeId] {
        match parent {
            Parent::Root => &self.rules,
            Parent::Node(id) => self.node(id).children(),
        }
    }

    pub fn first(&self) -> Option<NodeId> {
        self.rules.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.rules.last().copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children().first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children().last().copied()
    }

    /// Number of nodes in the tree, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in document order.
    pub fn descendants(&self) -> impl Iterator<Item = NodeId> + '_ {
        // Nodes are allocated as the parser meets them.
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub(crate) fn push(&mut self, parent: Parent, source: Source, data: NodeData) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            parent,
            source,
            data,
        });
        match parent {
            Parent::Root => self.rules.push(id),
            Parent::Node(container) => match &mut self.node_mut(container).data {
                NodeData::Rule(rule) => rule.decls.push(id),
                NodeData::AtRule(AtRule {
                    body: Some(body), ..
                }) => body.children.push(id),
                _ => unreachable!("only rules and at-rules with a block hold children"),
            },
        }
        id
    }

    pub(crate) fn set_semicolon(&mut self, parent: Parent, semicolon: bool) {
        match parent {
            Parent::Root => self.semicolon = semicolon,
            Parent::Node(id) => match &mut self.node_mut(id).data {
                NodeData::Rule(rule) => rule.semicolon = semicolon,
                NodeData::AtRule(AtRule {
                    body: Some(body), ..
                }) => body.semicolon = semicolon,
                _ => {}
            },
        }
    }

    pub(crate) fn set_after(&mut self, parent: Parent, after: String) {
        match parent {
            Parent::Root => self.after = after,
            Parent::Node(id) => match &mut self.node_mut(id).data {
                NodeData::Rule(rule) => rule.after = after,
                NodeData::AtRule(AtRule {
                    body: Some(body), ..
                }) => body.after = after,
                _ => {}
            },
        }
    }
}
