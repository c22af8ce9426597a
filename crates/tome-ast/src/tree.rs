//! Arena-backed document tree.

use std::ops::{Index, IndexMut};

use crate::node::{Node, NodeId, NodeType};

/// A link reference definition collected while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkRefDef {
    pub label: String,
    pub dest: String,
    pub title: String,
}

/// Document tree with a [`NodeType::Document`] root.
///
/// Nodes live in an arena and refer to each other by [`NodeId`], so the
/// tree is freely shareable across threads once built.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Link reference definitions in source order.
    pub link_refs: Vec<LinkRefDef>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only an empty document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            root: NodeId(0),
            link_refs: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Add a detached node to the arena.
    pub fn append(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.previous = None;
        node.next = None;
        node.first_child = None;
        node.last_child = None;
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Add `node` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.append(node);
        self.attach_last(parent, id);
        id
    }

    /// Add `node` as the next sibling of `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, node: Node) -> NodeId {
        let id = self.append(node);
        let parent = self[sibling].parent;
        let next = self[sibling].next;
        self[id].parent = parent;
        self[id].previous = Some(sibling);
        self[id].next = next;
        self[sibling].next = Some(id);
        match next {
            Some(next) => self[next].previous = Some(id),
            None => {
                if let Some(parent) = parent {
                    self[parent].last_child = Some(id);
                }
            }
        }
        id
    }

    /// Move an existing node to the end of `parent`'s children.
    pub fn reparent(&mut self, parent: NodeId, id: NodeId) {
        self.detach(id);
        self.attach_last(parent, id);
    }

    /// Unlink a node from its parent and siblings. Its children stay attached to it.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, previous, next) = {
            let node = &self[id];
            (node.parent, node.previous, node.next)
        };
        match previous {
            Some(previous) => self[previous].next = next,
            None => {
                if let Some(parent) = parent {
                    self[parent].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self[next].previous = previous,
            None => {
                if let Some(parent) = parent {
                    self[parent].last_child = previous;
                }
            }
        }
        let node = &mut self[id];
        node.parent = None;
        node.previous = None;
        node.next = None;
    }

    fn attach_last(&mut self, parent: NodeId, id: NodeId) {
        let last = self[parent].last_child;
        self[id].parent = Some(parent);
        self[id].previous = last;
        self[id].next = None;
        match last {
            Some(last) => self[last].next = Some(id),
            None => self[parent].first_child = Some(id),
        }
        self[parent].last_child = Some(id);
    }

    /// Iterate over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self[id].first_child,
        }
    }

    /// Iterate over the ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self[id].parent,
        }
    }

    /// Whether any ancestor of `id` has the given kind.
    pub fn has_ancestor(&self, id: NodeId, kind: NodeType) -> bool {
        self.ancestors(id).any(|a| self[a].kind == kind)
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: NodeType) -> Option<NodeId> {
        self.children(id).find(|&c| self[c].kind == kind)
    }

    /// First descendant (depth-first, `id` excluded) of the given kind.
    pub fn descendant_of_kind(&self, id: NodeId, kind: NodeType) -> Option<NodeId> {
        for child in self.children(id) {
            if self[child].kind == kind {
                return Some(child);
            }
            if let Some(found) = self.descendant_of_kind(child, kind) {
                return Some(found);
            }
        }
        None
    }

    /// Whether `id` is the last top-level block of the document, or sits
    /// inside it.
    pub fn is_last_node(&self, id: NodeId) -> bool {
        if id == self.root {
            return true;
        }
        if self[id].next.is_some() {
            return false;
        }
        let mut top = id;
        while let Some(parent) = self[top].parent {
            if parent == self.root {
                break;
            }
            top = parent;
        }
        self[self.root].last_child == Some(top)
    }

    /// Concatenated tokens of all text-bearing descendants.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            let node = &self[child];
            match node.kind {
                NodeType::Text
                | NodeType::CodeSpan
                | NodeType::InlineMath
                | NodeType::Backslash
                | NodeType::HtmlEntity
                | NodeType::InlineHtml => out.push_str(&node.tokens),
                NodeType::SoftBreak | NodeType::HardBreak => out.push('\n'),
                _ => self.collect_text(child, out),
            }
        }
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

/// Iterator over direct children.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].next;
        Some(id)
    }
}

/// Iterator over ancestors, nearest first.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree[id].parent;
        Some(id)
    }
}
