//! Arena-based DOM for markup parsing.
//!
//! This is the markup-side tree that html5ever parses into before the rule
//! table converts it to a [`Document`](crate::tree::Document). The arena
//! layout keeps parsing allocation-cheap and traversal cache-friendly.

use html5ever::{LocalName, QualName};

/// Unique identifier for a node in the markup DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomId(pub u32);

impl DomId {
    /// Sentinel value for no node.
    pub const NONE: DomId = DomId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the markup DOM.
#[derive(Debug, Clone)]
pub enum DomNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<DomAttribute>,
    },
    /// Text content.
    Text(String),
    /// Comment (ignored but needed for the parser sink).
    Comment(String),
    /// Document type declaration.
    Doctype,
}

/// Markup attribute.
#[derive(Debug, Clone)]
pub struct DomAttribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the markup DOM.
#[derive(Debug)]
pub struct DomNode {
    pub data: DomNodeData,
    pub parent: DomId,
    pub first_child: DomId,
    pub last_child: DomId,
    pub prev_sibling: DomId,
    pub next_sibling: DomId,
}

impl DomNode {
    fn new(data: DomNodeData) -> Self {
        Self {
            data,
            parent: DomId::NONE,
            first_child: DomId::NONE,
            last_child: DomId::NONE,
            prev_sibling: DomId::NONE,
            next_sibling: DomId::NONE,
        }
    }
}

/// Arena-based markup DOM tree.
///
/// All nodes are stored in a contiguous vector. Parent/child/sibling links
/// use indices into this vector.
pub struct MarkupDom {
    nodes: Vec<DomNode>,
    document: DomId,
}

impl MarkupDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: DomId::NONE,
        };
        dom.document = dom.alloc(DomNode::new(DomNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: DomNode) -> DomId {
        let id = DomId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> DomId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: DomId) -> Option<&DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: DomId) -> Option<&mut DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<DomAttribute>) -> DomId {
        self.alloc(DomNode::new(DomNodeData::Element { name, attrs }))
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> DomId {
        self.alloc(DomNode::new(DomNodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> DomId {
        self.alloc(DomNode::new(DomNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self) -> DomId {
        self.alloc(DomNode::new(DomNodeData::Doctype))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: DomId, child: DomId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(DomId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some() {
            if let Some(last_node) = self.get_mut(last_child) {
                last_node.next_sibling = child;
            }
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: DomId, new_node: DomId) {
        let parent = self.get(sibling).map(|n| n.parent).unwrap_or(DomId::NONE);
        let prev = self.get(sibling).map(|n| n.prev_sibling).unwrap_or(DomId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: DomId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(DomId::NONE);

        if let Some(last) = self.get_mut(last_child) {
            if let DomNodeData::Text(ref mut existing) = last.data {
                existing.push_str(text);
                return;
            }
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: DomId) -> DomChildren<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(DomId::NONE);
        DomChildren {
            dom: self,
            current: first,
        }
    }

    /// Find the first element with the given local name (DFS).
    pub fn find_by_tag(&self, tag: &str) -> Option<DomId> {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if let DomNodeData::Element { name, .. } = &node.data {
                    if name.local.as_ref() == tag {
                        return Some(id);
                    }
                }
                // Push children in reverse order for left-to-right traversal
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }
}

impl Default for MarkupDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct DomChildren<'a> {
    dom: &'a MarkupDom,
    current: DomId,
}

impl<'a> Iterator for DomChildren<'a> {
    type Item = DomId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.dom.get(id).map(|n| n.next_sibling).unwrap_or(DomId::NONE);
        Some(id)
    }
}

/// Convenience methods for element and text nodes.
impl MarkupDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: DomId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            DomNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's attributes in source order.
    pub fn element_attrs(&self, id: DomId) -> &[DomAttribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                DomNodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: DomId, attr_name: &str) -> Option<&str> {
        self.element_attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: DomId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, DomNodeData::Element { .. }))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: DomId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            DomNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of a subtree, in document order.
    pub fn subtree_text(&self, id: DomId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.text_content(current) {
                out.push_str(text);
            }
            let mut children: Vec<_> = self.children(current).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }
}
