//! Static conversion and repair rules, one set per node kind.
//!
//! Every kind owns three rules: deserialize (markup element to node),
//! serialize (node to markup), and normalize (structural repair). The
//! kind set is closed, so all three dispatch through exhaustive matches;
//! there is no registry to populate and nothing to look up at runtime.
//!
//! Deserialization consults kinds in [`REGISTRATION_ORDER`]. Each rule
//! decides for itself whether an element is its business (usually by tag
//! name, for `div` and `embed` by discriminator attribute) and answers
//! with a [`RuleOutcome`]; the first non-pass answer wins. An element no
//! rule claims falls back to its text content in the driver.

mod block;
mod container;
mod embeds;
mod inline;

use crate::convert::ConvertContext;
use crate::dom::{DomId, MarkupDom};
use crate::tree::{Document, NodeId, NodeKind};

/// Result of consulting one kind's rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome<T> {
    /// The rule recognized the input and produced a value.
    Produce(T),
    /// The rule recognized the input and consumed it without output.
    Drop,
    /// The rule does not apply; consult the next one.
    Pass,
}

/// What a deserialize rule produced, and who converts the children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deserialized {
    /// Node produced; the driver converts the element's children into it.
    Open(NodeId),
    /// Node produced and fully populated; children are already consumed.
    Closed(NodeId),
}

/// The fixed order in which deserialize rules are consulted.
pub const REGISTRATION_ORDER: &[NodeKind] = &[
    NodeKind::Section,
    NodeKind::FramedContent,
    NodeKind::Grid,
    NodeKind::GridCell,
    NodeKind::File,
    NodeKind::RelatedContent,
    NodeKind::Image,
    NodeKind::Audio,
    NodeKind::Video,
    NodeKind::H5p,
    NodeKind::Concept,
    NodeKind::Paragraph,
    NodeKind::Heading,
    NodeKind::Quote,
    NodeKind::List,
    NodeKind::ListItem,
    NodeKind::Table,
    NodeKind::TableRow,
    NodeKind::TableCell,
    NodeKind::Details,
    NodeKind::Summary,
    NodeKind::Link,
    NodeKind::Span,
    NodeKind::Break,
];

/// Deserialize a markup element by consulting every kind in order.
pub fn deserialize_element(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
    _ctx: &ConvertContext,
) -> RuleOutcome<Deserialized> {
    for kind in REGISTRATION_ORDER {
        let outcome = deserialize_as(*kind, doc, dom, el);
        if !matches!(outcome, RuleOutcome::Pass) {
            return outcome;
        }
    }
    RuleOutcome::Pass
}

fn deserialize_as(
    kind: NodeKind,
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    match kind {
        NodeKind::Section => block::deserialize_section(doc, dom, el),
        NodeKind::Paragraph => block::deserialize_paragraph(doc, dom, el),
        NodeKind::Heading => block::deserialize_heading(doc, dom, el),
        NodeKind::Quote => block::deserialize_quote(doc, dom, el),
        NodeKind::List => block::deserialize_list(doc, dom, el),
        NodeKind::ListItem => block::deserialize_list_item(doc, dom, el),
        NodeKind::Table => block::deserialize_table(doc, dom, el),
        NodeKind::TableRow => block::deserialize_table_row(doc, dom, el),
        NodeKind::TableCell => block::deserialize_table_cell(doc, dom, el),
        NodeKind::Details => container::deserialize_details(doc, dom, el),
        NodeKind::Summary => container::deserialize_summary(doc, dom, el),
        NodeKind::FramedContent => container::deserialize_framed_content(doc, dom, el),
        NodeKind::Grid => container::deserialize_grid(doc, dom, el),
        NodeKind::GridCell => container::deserialize_grid_cell(doc, dom, el),
        NodeKind::File => embeds::deserialize_file_group(doc, dom, el),
        NodeKind::RelatedContent => embeds::deserialize_related_content(doc, dom, el),
        NodeKind::Image => embeds::deserialize_leaf(doc, dom, el, NodeKind::Image),
        NodeKind::Audio => embeds::deserialize_leaf(doc, dom, el, NodeKind::Audio),
        NodeKind::Video => embeds::deserialize_leaf(doc, dom, el, NodeKind::Video),
        NodeKind::H5p => embeds::deserialize_leaf(doc, dom, el, NodeKind::H5p),
        NodeKind::Concept => embeds::deserialize_leaf(doc, dom, el, NodeKind::Concept),
        NodeKind::Link => inline::deserialize_link(doc, dom, el),
        NodeKind::Span => inline::deserialize_span(doc, dom, el),
        NodeKind::Break => inline::deserialize_break(doc, dom, el),
    }
}

/// Serialize an element node, wrapping its already-rendered children.
///
/// `children` holds one markup string per child, in order; most rules
/// concatenate them inside their tags. Rules that regroup children (the
/// table's header split) pair the strings with the child IDs instead.
pub fn serialize_element(
    doc: &Document,
    id: NodeId,
    kind: NodeKind,
    children: &[String],
    _ctx: &ConvertContext,
) -> String {
    match kind {
        NodeKind::Section => block::serialize_section(doc, id, children),
        NodeKind::Paragraph => block::serialize_paragraph(doc, id, children),
        NodeKind::Heading => block::serialize_heading(doc, id, children),
        NodeKind::Quote => block::serialize_quote(doc, id, children),
        NodeKind::List => block::serialize_list(doc, id, children),
        NodeKind::ListItem => block::serialize_list_item(doc, id, children),
        NodeKind::Table => block::serialize_table(doc, id, children),
        NodeKind::TableRow => block::serialize_table_row(doc, id, children),
        NodeKind::TableCell => block::serialize_table_cell(doc, id, children),
        NodeKind::Details => container::serialize_details(doc, id, children),
        NodeKind::Summary => container::serialize_summary(doc, id, children),
        NodeKind::FramedContent => container::serialize_framed_content(doc, id, children),
        NodeKind::Grid => container::serialize_grid(doc, id, children),
        NodeKind::GridCell => container::serialize_grid_cell(doc, id, children),
        NodeKind::File => embeds::serialize_group(doc, id, NodeKind::File),
        NodeKind::RelatedContent => embeds::serialize_group(doc, id, NodeKind::RelatedContent),
        NodeKind::Image => embeds::serialize_leaf(doc, id, NodeKind::Image),
        NodeKind::Audio => embeds::serialize_leaf(doc, id, NodeKind::Audio),
        NodeKind::Video => embeds::serialize_leaf(doc, id, NodeKind::Video),
        NodeKind::H5p => embeds::serialize_leaf(doc, id, NodeKind::H5p),
        NodeKind::Concept => embeds::serialize_leaf(doc, id, NodeKind::Concept),
        NodeKind::Link => inline::serialize_link(doc, id, children),
        NodeKind::Span => inline::serialize_span(doc, id, children),
        NodeKind::Break => inline::serialize_break(),
    }
}

/// Apply the kind-specific repair rule for one node.
///
/// Returns true if the tree was mutated. Kinds without structural
/// obligations repair nothing.
pub fn normalize_node(doc: &mut Document, id: NodeId, _ctx: &ConvertContext) -> bool {
    let Some(kind) = doc.kind(id) else {
        return false;
    };
    match kind {
        NodeKind::Heading => block::normalize_heading(doc, id),
        NodeKind::List => block::normalize_list(doc, id),
        NodeKind::Table => block::normalize_table(doc, id),
        NodeKind::TableRow => block::normalize_table_row(doc, id),
        NodeKind::Details => container::normalize_details(doc, id),
        NodeKind::Summary => container::normalize_summary(doc, id),
        NodeKind::Grid => container::normalize_grid(doc, id),
        NodeKind::Span => inline::normalize_span(doc, id),
        NodeKind::Section
        | NodeKind::Paragraph
        | NodeKind::Quote
        | NodeKind::ListItem
        | NodeKind::TableCell
        | NodeKind::FramedContent
        | NodeKind::GridCell
        | NodeKind::File
        | NodeKind::RelatedContent
        | NodeKind::Image
        | NodeKind::Audio
        | NodeKind::Video
        | NodeKind::H5p
        | NodeKind::Concept
        | NodeKind::Link
        | NodeKind::Break => false,
    }
}

/// Check a markup element's local tag name.
fn tag_is(dom: &MarkupDom, el: DomId, tag: &str) -> bool {
    dom.element_name(el).is_some_and(|name| name.as_ref() == tag)
}

/// Check for a `<div>` carrying a specific `data-type` discriminator.
fn div_type_is(dom: &MarkupDom, el: DomId, data_type: &str) -> bool {
    tag_is(dom, el, "div") && dom.get_attr(el, "data-type") == Some(data_type)
}

/// Copy `data-*` attributes from a markup element onto a node's attribute
/// map, skipping discriminators the kind already encodes.
fn copy_data_attrs(
    dom: &MarkupDom,
    el: DomId,
    attrs: &mut crate::tree::AttributeMap,
    skip: &[&str],
) {
    for attr in dom.element_attrs(el) {
        let name = attr.name.local.as_ref();
        if name.starts_with("data-") && !skip.contains(&name) {
            attrs.set(name, attr.value.as_str());
        }
    }
}

/// Emit preserved `data-*` attributes in map order.
fn write_data_attrs(doc: &Document, id: NodeId, out: &mut String) {
    let Some(attrs) = doc.get(id).and_then(|n| n.attrs()) else {
        return;
    };
    for (key, value) in attrs.iter() {
        if let crate::tree::AttrValue::Text(value) = value {
            if key.starts_with("data-") {
                out.push_str(&format!(
                    " {}=\"{}\"",
                    key,
                    crate::convert::escape_attr(value)
                ));
            }
        }
    }
}

/// Write one attribute if the node carries it.
fn write_attr_if_present(doc: &Document, id: NodeId, key: &str, wire_name: &str, out: &mut String) {
    if let Some(value) = doc.attr(id, key) {
        out.push_str(&format!(
            " {}=\"{}\"",
            wire_name,
            crate::convert::escape_attr(value)
        ));
    }
}
