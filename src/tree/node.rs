//! Node types and kinds for the document tree.

/// Unique identifier for a node within a Document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Structural kind of an element node.
///
/// The kind set is closed: every element the codec can produce is one of
/// these, and dispatch over kinds is a plain exhaustive `match`. Kind-specific
/// data (heading level, list ordering, grid columns, embed fields) lives in
/// the node's [`AttributeMap`], so adding a field never changes this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Top-level document section. Only valid as a root child.
    Section,
    /// Block-level text container (`<p>`).
    Paragraph,
    /// Heading with a `level` attribute (supported band 1-3).
    Heading,
    /// Block quote.
    Quote,
    /// List with an `ordered` attribute (`<ul>` / `<ol>`).
    List,
    /// Individual list item.
    ListItem,
    /// Table structure.
    Table,
    /// Table row.
    TableRow,
    /// Table cell. Header cells carry `header="true"`.
    TableCell,
    /// Expandable container: one `summary` followed by blocks.
    Details,
    /// Clickable summary line of a `details`.
    Summary,
    /// Visually framed block of content.
    FramedContent,
    /// Column layout with a `columns` attribute.
    Grid,
    /// Single column of a `grid`.
    GridCell,
    /// File attachment group. Item records live in the `items` attribute.
    File,
    /// Related-article group. Item records live in the `items` attribute.
    RelatedContent,
    /// Image embed.
    Image,
    /// Audio embed.
    Audio,
    /// Video embed.
    Video,
    /// Interactive H5P embed.
    H5p,
    /// Inline concept reference rendered as a block.
    Concept,
    /// Hyperlink (`<a>`).
    Link,
    /// Inline span, used for language annotations.
    Span,
    /// Line break (`<br>`).
    Break,
}

impl NodeKind {
    /// Stable name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Section => "section",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Quote => "quote",
            NodeKind::List => "list",
            NodeKind::ListItem => "list-item",
            NodeKind::Table => "table",
            NodeKind::TableRow => "table-row",
            NodeKind::TableCell => "table-cell",
            NodeKind::Details => "details",
            NodeKind::Summary => "summary",
            NodeKind::FramedContent => "framed-content",
            NodeKind::Grid => "grid",
            NodeKind::GridCell => "grid-cell",
            NodeKind::File => "file",
            NodeKind::RelatedContent => "related-content",
            NodeKind::Image => "image",
            NodeKind::Audio => "audio",
            NodeKind::Video => "video",
            NodeKind::H5p => "h5p",
            NodeKind::Concept => "concept",
            NodeKind::Link => "link",
            NodeKind::Span => "span",
            NodeKind::Break => "break",
        }
    }

    /// Kinds that may appear as direct children of a section.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::Quote
                | NodeKind::List
                | NodeKind::Table
                | NodeKind::Details
                | NodeKind::FramedContent
                | NodeKind::Grid
                | NodeKind::File
                | NodeKind::RelatedContent
                | NodeKind::Image
                | NodeKind::Audio
                | NodeKind::Video
                | NodeKind::H5p
                | NodeKind::Concept
        )
    }

    /// Kinds that flow inside paragraph-level content.
    pub fn is_inline(&self) -> bool {
        matches!(self, NodeKind::Link | NodeKind::Span | NodeKind::Break)
    }

    /// Kinds the editor renders as opaque cards. These must always sit
    /// between block-level neighbors so the cursor can move past them.
    pub fn is_isolated(&self) -> bool {
        matches!(
            self,
            NodeKind::FramedContent
                | NodeKind::File
                | NodeKind::RelatedContent
                | NodeKind::Image
                | NodeKind::Audio
                | NodeKind::Video
                | NodeKind::H5p
                | NodeKind::Concept
        )
    }

    /// Kinds that carry their payload entirely in attributes and never
    /// keep child nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Break
                | NodeKind::File
                | NodeKind::RelatedContent
                | NodeKind::Image
                | NodeKind::Audio
                | NodeKind::Video
                | NodeKind::H5p
                | NodeKind::Concept
        )
    }
}

/// A single inline formatting mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Subscript,
    Superscript,
    Code,
}

impl Mark {
    /// All marks in serialization order (outermost tag first).
    pub const ALL: [Mark; 6] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Subscript,
        Mark::Superscript,
        Mark::Code,
    ];

    fn bit(self) -> u8 {
        match self {
            Mark::Bold => 1 << 0,
            Mark::Italic => 1 << 1,
            Mark::Underline => 1 << 2,
            Mark::Subscript => 1 << 3,
            Mark::Superscript => 1 << 4,
            Mark::Code => 1 << 5,
        }
    }

    /// The markup tag this mark serializes to.
    pub fn tag(self) -> &'static str {
        match self {
            Mark::Bold => "strong",
            Mark::Italic => "em",
            Mark::Underline => "u",
            Mark::Subscript => "sub",
            Mark::Superscript => "sup",
            Mark::Code => "code",
        }
    }

    /// Map a markup tag to a mark. Accepts the legacy `b`/`i` aliases.
    pub fn from_tag(tag: &str) -> Option<Mark> {
        match tag {
            "strong" | "b" => Some(Mark::Bold),
            "em" | "i" => Some(Mark::Italic),
            "u" => Some(Mark::Underline),
            "sub" => Some(Mark::Subscript),
            "sup" => Some(Mark::Superscript),
            "code" => Some(Mark::Code),
            _ => None,
        }
    }
}

/// Set of inline formatting marks, packed into a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MarkSet(u8);

impl MarkSet {
    /// The empty mark set.
    pub const EMPTY: MarkSet = MarkSet(0);

    /// Return this set with `mark` added.
    pub fn with(self, mark: Mark) -> MarkSet {
        MarkSet(self.0 | mark.bit())
    }

    /// Return this set with `mark` removed.
    pub fn without(self, mark: Mark) -> MarkSet {
        MarkSet(self.0 & !mark.bit())
    }

    /// Check whether `mark` is in the set.
    pub fn contains(&self, mark: Mark) -> bool {
        self.0 & mark.bit() != 0
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate over the marks in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        Mark::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        iter.into_iter().fold(MarkSet::EMPTY, MarkSet::with)
    }
}

/// Attribute value: a plain string or an ordered list of item records
/// (used by multi-item embed groups).
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Items(Vec<AttributeMap>),
}

/// Insertion-ordered attribute map.
///
/// Order matters: attributes are re-emitted in the order they were first
/// set, which keeps serialization stable across round trips. Lookups are
/// linear; maps in practice hold a handful of entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttributeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a text value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).and_then(|(_, v)| match v {
            AttrValue::Text(s) => Some(s.as_str()),
            AttrValue::Items(_) => None,
        })
    }

    /// Get an item-record list by key.
    pub fn get_items(&self, key: &str) -> Option<&[AttributeMap]> {
        self.entries.iter().find(|(k, _)| k == key).and_then(|(_, v)| match v {
            AttrValue::Text(_) => None,
            AttrValue::Items(items) => Some(items.as_slice()),
        })
    }

    /// Set a text value, replacing in place if the key exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set_value(key.into(), AttrValue::Text(value.into()));
    }

    /// Set an item-record list, replacing in place if the key exists.
    pub fn set_items(&mut self, key: impl Into<String>, items: Vec<AttributeMap>) {
        self.set_value(key.into(), AttrValue::Items(items));
    }

    fn set_value(&mut self, key: String, value: AttrValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Check whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, String)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = AttributeMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Document root. Its children are the document's sections.
    Document,
    /// Element with a kind and attributes.
    Element { kind: NodeKind, attrs: AttributeMap },
    /// Leaf text content with inline formatting marks.
    Text { content: String, marks: MarkSet },
}

/// A node in the document tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    /// Parent node ID (`NodeId::NONE` for the root and detached nodes).
    pub parent: NodeId,
    /// Child node IDs in document order.
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a new node with the given data.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            children: Vec::new(),
        }
    }

    /// Create an element node with no attributes.
    pub fn element(kind: NodeKind) -> Self {
        Self::new(NodeData::Element {
            kind,
            attrs: AttributeMap::new(),
        })
    }

    /// Create an element node with attributes.
    pub fn element_with_attrs(kind: NodeKind, attrs: AttributeMap) -> Self {
        Self::new(NodeData::Element { kind, attrs })
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>, marks: MarkSet) -> Self {
        Self::new(NodeData::Text {
            content: content.into(),
            marks,
        })
    }

    /// Get the element kind, if this is an element.
    pub fn kind(&self) -> Option<NodeKind> {
        match &self.data {
            NodeData::Element { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if this node is an element of the given kind.
    pub fn is_kind(&self, kind: NodeKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Check if this node is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    /// Get the element attributes, if this is an element.
    pub fn attrs(&self) -> Option<&AttributeMap> {
        match &self.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Get the element attributes mutably, if this is an element.
    pub fn attrs_mut(&mut self) -> Option<&mut AttributeMap> {
        match &mut self.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }
}
