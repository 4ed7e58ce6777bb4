//! Arena-allocated document tree.

use super::node::{AttributeMap, MarkSet, Node, NodeData, NodeId, NodeKind};

/// An editorial document as a tree of typed nodes.
///
/// All nodes are stored in a contiguous vector and addressed by [`NodeId`].
/// Index 0 is always the root; the root's children are the document's
/// sections. Detaching a node leaves its arena slot in place as garbage,
/// which keeps every previously handed-out ID valid. Equality and traversal
/// only consider nodes reachable from the root.
#[derive(Debug, Clone)]
pub struct Document {
    /// All nodes in the tree (index 0 is always the root).
    nodes: Vec<Node>,
    /// Content language tag, stamped from the conversion context.
    pub language: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document with a root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            language: None,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Allocate a new node and return its ID.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate a detached element node with no attributes.
    pub fn create_element(&mut self, kind: NodeKind) -> NodeId {
        self.alloc(Node::element(kind))
    }

    /// Allocate a detached element node with attributes.
    pub fn create_element_with_attrs(&mut self, kind: NodeKind, attrs: AttributeMap) -> NodeId {
        self.alloc(Node::element_with_attrs(kind, attrs))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, content: impl Into<String>, marks: MarkSet) -> NodeId {
        self.alloc(Node::text(content, marks))
    }

    /// Number of arena slots, including garbage.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes reachable from the root.
    pub fn live_count(&self) -> usize {
        self.walk().len()
    }

    /// Get the children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    /// Get a node's position within its parent's children.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id);
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Get the element kind of a node, if it is an element.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).and_then(|n| n.kind())
    }

    /// Get an attribute text value of an element node.
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attrs()).and_then(|a| a.get(key))
    }

    /// Set an attribute text value on an element node.
    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        if let Some(attrs) = self.get_mut(id).and_then(|n| n.attrs_mut()) {
            attrs.set(key, value);
        }
    }

    /// Append a child to a parent node, detaching it from any old parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
        }
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.push(child);
        }
    }

    /// Insert a child at a position within a parent's children, detaching it
    /// from any old parent. The index is clamped to the child count.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
        }
        if let Some(parent_node) = self.get_mut(parent) {
            let index = index.min(parent_node.children.len());
            parent_node.children.insert(index, child);
        }
    }

    /// Detach a node from its parent. The node and its subtree stay in the
    /// arena but are no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.parent(id);
        if parent.is_none() {
            return;
        }
        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
        }
    }

    /// Replace a node's payload in place, keeping its tree links.
    pub fn replace_data(&mut self, id: NodeId, data: NodeData) {
        if let Some(node) = self.get_mut(id) {
            node.data = data;
        }
    }

    /// Collect all nodes reachable from the root in document (pre-)order.
    ///
    /// Returning a vector instead of an iterator lets callers mutate the tree
    /// while working through a stable snapshot of it.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Push children in reverse order for left-to-right traversal
            let mut children: Vec<NodeId> = self.children(id).to_vec();
            children.reverse();
            stack.extend(children);
        }
        order
    }

    /// Concatenated text content of a subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let NodeData::Text { content, .. } = &node.data {
            out.push_str(content);
        }
        for child in node.children.clone() {
            self.collect_text(child, out);
        }
    }

    fn subtree_eq(&self, other: &Document, a: NodeId, b: NodeId) -> bool {
        let (Some(node_a), Some(node_b)) = (self.get(a), other.get(b)) else {
            return false;
        };
        if node_a.data != node_b.data || node_a.children.len() != node_b.children.len() {
            return false;
        }
        node_a
            .children
            .iter()
            .zip(&node_b.children)
            .all(|(ca, cb)| self.subtree_eq(other, *ca, *cb))
    }
}

/// Structural equality over the live tree. Garbage arena slots and ID
/// numbering are ignored; two documents are equal when their reachable
/// nodes match in kind, attributes, marks, text, and child order.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.language == other.language && self.subtree_eq(other, NodeId::ROOT, NodeId::ROOT)
    }
}

impl Eq for Document {}
