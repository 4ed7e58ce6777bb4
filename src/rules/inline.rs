//! Rules for inline elements: links, language spans, and line breaks.
//!
//! Formatting tags are not handled here; the codec driver dissolves them
//! into text marks before rules ever see an element.

use crate::dom::{DomId, MarkupDom};
use crate::tree::{AttributeMap, Document, NodeId, NodeKind};

use super::{
    Deserialized, RuleOutcome, copy_data_attrs, tag_is, write_attr_if_present, write_data_attrs,
};

pub fn deserialize_link(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "a") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    for key in ["href", "title"] {
        if let Some(value) = dom.get_attr(el, key) {
            attrs.set(key, value);
        }
    }
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Link, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_link(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<a");
    write_attr_if_present(doc, id, "href", "href", &mut out);
    write_attr_if_present(doc, id, "title", "title", &mut out);
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</a>");
    out
}

pub fn deserialize_span(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "span") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    if let Some(lang) = dom.get_attr(el, "lang") {
        attrs.set("lang", lang);
    }
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Span, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_span(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<span");
    write_attr_if_present(doc, id, "lang", "lang", &mut out);
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</span>");
    out
}

/// A span that carries no attributes marks nothing up; splice its children
/// into the parent and drop the wrapper.
pub fn normalize_span(doc: &mut Document, id: NodeId) -> bool {
    let carries_attrs = doc
        .get(id)
        .and_then(|n| n.attrs())
        .is_some_and(|a| !a.is_empty());
    if carries_attrs {
        return false;
    }
    let parent = doc.parent(id);
    let Some(position) = doc.position(id) else {
        return false;
    };
    let children = doc.children(id).to_vec();
    for (offset, child) in children.into_iter().enumerate() {
        doc.insert(parent, position + offset, child);
    }
    doc.detach(id);
    true
}

pub fn deserialize_break(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "br") {
        return RuleOutcome::Pass;
    }
    let id = doc.create_element(NodeKind::Break);
    RuleOutcome::Produce(Deserialized::Closed(id))
}

pub fn serialize_break() -> String {
    String::from("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{fragment_roots, parse_fragment};
    use crate::tree::MarkSet;

    fn first_root(markup: &str) -> (MarkupDom, DomId) {
        let dom = parse_fragment(markup);
        let roots = fragment_roots(&dom);
        (dom, roots[0])
    }

    #[test]
    fn test_link_keeps_href_and_title() {
        let mut doc = Document::new();
        let (dom, el) = first_root("<a title=\"Read more\" href=\"/articles/1\">more</a>");
        let RuleOutcome::Produce(Deserialized::Open(id)) = deserialize_link(&mut doc, &dom, el)
        else {
            panic!("anchor should produce a link");
        };
        // href always leads regardless of source order.
        assert_eq!(
            serialize_link(&doc, id, &["more".to_string()]),
            "<a href=\"/articles/1\" title=\"Read more\">more</a>"
        );
    }

    #[test]
    fn test_span_keeps_language() {
        let mut doc = Document::new();
        let (dom, el) = first_root("<span lang=\"nb\">bokmål</span>");
        let RuleOutcome::Produce(Deserialized::Open(id)) = deserialize_span(&mut doc, &dom, el)
        else {
            panic!("span should produce a span node");
        };
        assert_eq!(doc.attr(id, "lang"), Some("nb"));
        assert!(!normalize_span(&mut doc, id));
    }

    #[test]
    fn test_bare_span_unwraps() {
        let mut doc = Document::new();
        let para = doc.create_element(NodeKind::Paragraph);
        doc.append(doc.root(), para);
        let before = doc.create_text("a", MarkSet::EMPTY);
        let span = doc.create_element(NodeKind::Span);
        let inner1 = doc.create_text("b", MarkSet::EMPTY);
        let inner2 = doc.create_text("c", MarkSet::EMPTY);
        let after = doc.create_text("d", MarkSet::EMPTY);
        doc.append(para, before);
        doc.append(para, span);
        doc.append(span, inner1);
        doc.append(span, inner2);
        doc.append(para, after);

        assert!(normalize_span(&mut doc, span));
        assert_eq!(doc.children(para), &[before, inner1, inner2, after]);
        assert!(doc.parent(span).is_none());
    }

    #[test]
    fn test_break_is_closed() {
        let mut doc = Document::new();
        let (dom, el) = first_root("<br>");
        let outcome = deserialize_break(&mut doc, &dom, el);
        let RuleOutcome::Produce(Deserialized::Closed(id)) = outcome else {
            panic!("br should produce a closed break");
        };
        assert_eq!(doc.kind(id), Some(NodeKind::Break));
        assert_eq!(serialize_break(), "<br>");
    }
}
