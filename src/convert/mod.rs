//! Markup string ⇄ document tree conversion.
//!
//! Deserialization splits the input into section fragments, parses each
//! one with a standards-compliant HTML parser, and folds the DOM into the
//! tree through the rule table. Serialization is the mirror image: a
//! post-order walk where every node's rule wraps its children's markup.
//! Both directions are pure functions of their inputs plus an explicit
//! [`ConvertContext`].

mod escape;
mod split;

pub use escape::{escape_attr, escape_text};
pub use split::split_sections;

use log::warn;
use memchr::memmem;

use crate::diff::{self, DiffOutcome};
use crate::dom::{self, DomId, DomNodeData, MarkupDom};
use crate::error::Result;
use crate::normalize;
use crate::rules::{self, Deserialized, RuleOutcome};
use crate::tree::{Document, Mark, MarkSet, NodeData, NodeId, NodeKind};

/// Sentinel emitted where a node must leave no markup behind; stripped
/// from the serialized string before it is returned.
const DISCARD_MARKER: &str = "<!--discard-->";

/// Context threaded through conversion and normalization.
///
/// Everything the embedding editor knows that rules may need rides here
/// as an explicit parameter; there is no ambient state.
#[derive(Debug, Clone, Default)]
pub struct ConvertContext {
    /// Content language, stamped onto deserialized documents.
    pub language: Option<String>,
}

impl ConvertContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
        }
    }
}

/// Read markup into a normalized document.
pub fn read_document(markup: &str, ctx: &ConvertContext) -> Result<Document> {
    let mut doc = deserialize(markup, ctx);
    normalize::normalize(&mut doc, ctx)?;
    Ok(doc)
}

/// Write a document back to markup.
pub fn write_document(doc: &Document, ctx: &ConvertContext) -> String {
    serialize(doc, ctx)
}

/// Round-trip markup through the codec and diff the result against the
/// input. `warn` on the outcome means the round trip would lose content.
pub fn check_markup(markup: &str, ctx: &ConvertContext) -> Result<DiffOutcome> {
    let doc = read_document(markup, ctx)?;
    let round_tripped = serialize(&doc, ctx);
    Ok(diff::semantic_diff(markup, &round_tripped))
}

/// Build a raw document tree from a markup string.
///
/// The result has not been normalized; callers repair it before use.
/// [`read_document`] bundles both steps.
pub fn deserialize(markup: &str, ctx: &ConvertContext) -> Document {
    let mut doc = Document::new();
    doc.language = ctx.language.clone();
    for fragment in split_sections(markup) {
        let parsed = dom::parse_fragment(fragment);
        let roots = dom::fragment_roots(&parsed);
        convert_roots(&mut doc, &parsed, &roots, ctx);
    }
    doc
}

/// Fold fragment roots into the document's section list.
///
/// Section elements map one-to-one onto section nodes. A run of anything
/// else (loose blocks, stray text) is gathered into one synthesized
/// section, keeping document order intact.
fn convert_roots(doc: &mut Document, dom: &MarkupDom, roots: &[DomId], ctx: &ConvertContext) {
    let mut index = 0;
    while index < roots.len() {
        if is_section_element(dom, roots[index]) {
            convert_node(doc, dom, roots[index], doc.root(), MarkSet::EMPTY, ctx);
            index += 1;
            continue;
        }
        let run_end = roots[index..]
            .iter()
            .position(|r| is_section_element(dom, *r))
            .map(|p| index + p)
            .unwrap_or(roots.len());
        let section = doc.create_element(NodeKind::Section);
        doc.append(doc.root(), section);
        for root in &roots[index..run_end] {
            convert_node(doc, dom, *root, section, MarkSet::EMPTY, ctx);
        }
        // A run of pure whitespace contributes nothing; drop the shell.
        if doc.children(section).is_empty() {
            doc.detach(section);
        }
        index = run_end;
    }
}

fn is_section_element(dom: &MarkupDom, id: DomId) -> bool {
    dom.element_name(id).is_some_and(|name| name.as_ref() == "section")
}

/// Convert one DOM node into the tree under `parent`.
///
/// Formatting tags extend the mark context and dissolve. Table grouping
/// wrappers dissolve structurally (the tree stores a flat row list).
/// Everything else goes through the rule table; an element no rule
/// recognizes is flattened to its text content.
fn convert_node(
    doc: &mut Document,
    dom: &MarkupDom,
    node: DomId,
    parent: NodeId,
    marks: MarkSet,
    ctx: &ConvertContext,
) {
    let Some(dom_node) = dom.get(node) else {
        return;
    };
    let name = match &dom_node.data {
        DomNodeData::Document | DomNodeData::Doctype | DomNodeData::Comment(_) => return,
        DomNodeData::Text(content) => {
            append_text(doc, parent, content, marks);
            return;
        }
        DomNodeData::Element { name, .. } => name.local.as_ref(),
    };

    if let Some(mark) = Mark::from_tag(name) {
        let extended = marks.with(mark);
        for child in dom.children(node) {
            convert_node(doc, dom, child, parent, extended, ctx);
        }
        return;
    }

    if matches!(name, "thead" | "tbody" | "tfoot") {
        for child in dom.children(node) {
            convert_node(doc, dom, child, parent, marks, ctx);
        }
        return;
    }

    match rules::deserialize_element(doc, dom, node, ctx) {
        RuleOutcome::Produce(Deserialized::Open(id)) => {
            doc.append(parent, id);
            for child in dom.children(node) {
                convert_node(doc, dom, child, id, marks, ctx);
            }
        }
        RuleOutcome::Produce(Deserialized::Closed(id)) => {
            doc.append(parent, id);
        }
        RuleOutcome::Drop => {}
        RuleOutcome::Pass => {
            let flattened = dom.subtree_text(node);
            if !flattened.trim().is_empty() {
                warn!("no rule recognized <{}>, keeping its text content", name);
                append_text(doc, parent, &flattened, marks);
            }
        }
    }
}

fn append_text(doc: &mut Document, parent: NodeId, content: &str, marks: MarkSet) {
    if content.is_empty() {
        return;
    }
    if content.trim().is_empty() && !keeps_inline_whitespace(doc, parent) {
        return;
    }
    let text = doc.create_text(content, marks);
    doc.append(parent, text);
}

/// Containers holding inline flow keep whitespace-only text verbatim;
/// purely structural containers drop it (it is indentation between
/// blocks, not content).
fn keeps_inline_whitespace(doc: &Document, parent: NodeId) -> bool {
    matches!(
        doc.kind(parent),
        Some(
            NodeKind::Paragraph
                | NodeKind::Heading
                | NodeKind::Summary
                | NodeKind::ListItem
                | NodeKind::TableCell
                | NodeKind::Link
                | NodeKind::Span
        )
    )
}

/// Render a document to markup.
pub fn serialize(doc: &Document, ctx: &ConvertContext) -> String {
    let mut out = String::new();
    for child in doc.children(doc.root()) {
        out.push_str(&serialize_node(doc, *child, ctx));
    }
    strip_discard(&out)
}

fn serialize_node(doc: &Document, id: NodeId, ctx: &ConvertContext) -> String {
    let Some(node) = doc.get(id) else {
        return String::new();
    };
    match &node.data {
        NodeData::Document => String::new(),
        NodeData::Text { content, marks } => render_text(content, *marks),
        NodeData::Element { kind, .. } => {
            let child_ids = doc.children(id);
            let mut parts = Vec::with_capacity(child_ids.len());
            for (position, child) in child_ids.iter().enumerate() {
                if discards(doc, child_ids, position) {
                    parts.push(DISCARD_MARKER.to_string());
                } else {
                    parts.push(serialize_node(doc, *child, ctx));
                }
            }
            rules::serialize_element(doc, id, *kind, &parts, ctx)
        }
    }
}

/// Wrap escaped text in its mark tags, outermost mark first in the fixed
/// serialization order.
fn render_text(content: &str, marks: MarkSet) -> String {
    let mut rendered = escape_text(content);
    let applied: Vec<Mark> = marks.iter().collect();
    for mark in applied.into_iter().rev() {
        rendered = format!("<{0}>{1}</{0}>", mark.tag(), rendered);
    }
    rendered
}

/// Empty padding paragraphs around isolated kinds exist for the editor's
/// benefit only; they leave no markup behind.
fn discards(doc: &Document, siblings: &[NodeId], position: usize) -> bool {
    let id = siblings[position];
    let Some(node) = doc.get(id) else {
        return false;
    };
    if !node.is_kind(NodeKind::Paragraph) || !node.children.is_empty() {
        return false;
    }
    if node.attrs().is_some_and(|a| !a.is_empty()) {
        return false;
    }
    let before = position > 0 && is_isolated_node(doc, siblings[position - 1]);
    let after = siblings
        .get(position + 1)
        .is_some_and(|next| is_isolated_node(doc, *next));
    before || after
}

fn is_isolated_node(doc: &Document, id: NodeId) -> bool {
    doc.kind(id).is_some_and(|kind| kind.is_isolated())
}

fn strip_discard(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut start = 0;
    for hit in memmem::find_iter(markup.as_bytes(), DISCARD_MARKER.as_bytes()) {
        out.push_str(&markup[start..hit]);
        start = hit + DISCARD_MARKER.len();
    }
    out.push_str(&markup[start..]);
    out
}
