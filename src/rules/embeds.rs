//! Rules for embedded external resources.
//!
//! Standalone resources (image, audio, video, h5p, concept) become leaf
//! nodes holding the decoded attribute record. File attachments and
//! related-content references are grouped: a wrapper `<div>` holds one
//! void `<embed>` per item, and the tree stores the whole group as a
//! single leaf whose `items` attribute carries the records in order.

use crate::dom::{DomId, MarkupDom};
use crate::embed::{self, EmbedKind};
use crate::tree::{AttributeMap, Document, NodeId, NodeKind};

use super::{Deserialized, RuleOutcome, div_type_is, tag_is};

pub fn deserialize_leaf(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
    kind: NodeKind,
) -> RuleOutcome<Deserialized> {
    let Some(embed) = embed_kind(kind) else {
        return RuleOutcome::Pass;
    };
    if resource_of(dom, el) != Some(embed) {
        return RuleOutcome::Pass;
    }
    let record = embed::decode(attr_pairs(dom, el));
    embed::is_user_provided_data_valid(embed, &record);
    let id = doc.create_element_with_attrs(kind, record);
    RuleOutcome::Produce(Deserialized::Closed(id))
}

pub fn serialize_leaf(doc: &Document, id: NodeId, kind: NodeKind) -> String {
    let Some(embed) = embed_kind(kind) else {
        return String::new();
    };
    match doc.get(id).and_then(|n| n.attrs()) {
        Some(record) => render_embed(embed, record),
        None => render_embed(embed, &AttributeMap::new()),
    }
}

pub fn deserialize_file_group(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    deserialize_group(doc, dom, el, EmbedKind::File)
}

pub fn deserialize_related_content(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    deserialize_group(doc, dom, el, EmbedKind::RelatedContent)
}

fn deserialize_group(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
    embed: EmbedKind,
) -> RuleOutcome<Deserialized> {
    if div_type_is(dom, el, embed.as_str()) {
        let mut items = Vec::new();
        for child in dom.children(el) {
            if resource_of(dom, child) != Some(embed) {
                continue;
            }
            let record = embed::decode(attr_pairs(dom, child));
            embed::is_user_provided_data_valid(embed, &record);
            items.push(record);
        }
        return RuleOutcome::Produce(Deserialized::Closed(group_node(doc, embed, items)));
    }

    // A bare item embed outside its wrapper becomes a one-item group.
    if resource_of(dom, el) == Some(embed) {
        let record = embed::decode(attr_pairs(dom, el));
        embed::is_user_provided_data_valid(embed, &record);
        return RuleOutcome::Produce(Deserialized::Closed(group_node(doc, embed, vec![record])));
    }

    RuleOutcome::Pass
}

pub fn serialize_group(doc: &Document, id: NodeId, kind: NodeKind) -> String {
    let Some(embed) = embed_kind(kind) else {
        return String::new();
    };
    let mut out = format!("<div data-type=\"{}\"", embed.as_str());
    out.push('>');
    if let Some(items) = doc.get(id).and_then(|n| n.attrs()).and_then(|a| a.get_items("items")) {
        for record in items {
            out.push_str(&render_embed(embed, record));
        }
    }
    out.push_str("</div>");
    out
}

fn group_node(doc: &mut Document, embed: EmbedKind, items: Vec<AttributeMap>) -> NodeId {
    let mut attrs = AttributeMap::new();
    attrs.set_items("items", items);
    doc.create_element_with_attrs(embed.node_kind(), attrs)
}

/// The resource type of an `<embed>` element, `None` for anything else.
fn resource_of(dom: &MarkupDom, el: DomId) -> Option<EmbedKind> {
    if !tag_is(dom, el, "embed") {
        return None;
    }
    dom.get_attr(el, "data-resource")
        .and_then(EmbedKind::from_resource)
}

fn embed_kind(kind: NodeKind) -> Option<EmbedKind> {
    match kind {
        NodeKind::Image => Some(EmbedKind::Image),
        NodeKind::Audio => Some(EmbedKind::Audio),
        NodeKind::Video => Some(EmbedKind::Video),
        NodeKind::File => Some(EmbedKind::File),
        NodeKind::H5p => Some(EmbedKind::H5p),
        NodeKind::Concept => Some(EmbedKind::Concept),
        NodeKind::RelatedContent => Some(EmbedKind::RelatedContent),
        _ => None,
    }
}

fn attr_pairs<'a>(dom: &'a MarkupDom, el: DomId) -> impl Iterator<Item = (&'a str, &'a str)> {
    dom.element_attrs(el)
        .iter()
        .map(|a| (a.name.local.as_ref(), a.value.as_str()))
}

fn render_embed(embed: EmbedKind, record: &AttributeMap) -> String {
    let mut out = String::from("<embed");
    for (key, value) in embed::encode(embed, record) {
        out.push_str(&format!(
            " {}=\"{}\"",
            key,
            crate::convert::escape_attr(&value)
        ));
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{fragment_roots, parse_fragment};

    fn first_root(markup: &str) -> (MarkupDom, DomId) {
        let dom = parse_fragment(markup);
        let roots = fragment_roots(&dom);
        (dom, roots[0])
    }

    #[test]
    fn test_image_leaf_round_trip() {
        let mut doc = Document::new();
        let (dom, el) =
            first_root("<embed data-resource=\"image\" data-resource-id=\"42\" data-alt=\"A chart\">");
        let RuleOutcome::Produce(Deserialized::Closed(id)) =
            deserialize_leaf(&mut doc, &dom, el, NodeKind::Image)
        else {
            panic!("image embed should produce a leaf");
        };
        assert_eq!(doc.kind(id), Some(NodeKind::Image));
        assert_eq!(doc.attr(id, "resource-id"), Some("42"));
        assert_eq!(doc.attr(id, "alt"), Some("A chart"));

        assert_eq!(
            serialize_leaf(&doc, id, NodeKind::Image),
            "<embed data-resource=\"image\" data-resource-id=\"42\" data-alt=\"A chart\">"
        );
    }

    #[test]
    fn test_unknown_fields_emit_after_known() {
        let mut doc = Document::new();
        let (dom, el) = first_root(
            "<embed data-resource=\"image\" data-zoomable=\"true\" data-alt=\"x\" data-resource-id=\"1\">",
        );
        let RuleOutcome::Produce(Deserialized::Closed(id)) =
            deserialize_leaf(&mut doc, &dom, el, NodeKind::Image)
        else {
            panic!("image embed should produce a leaf");
        };
        // Known fields regain their fixed order; the unknown one trails.
        assert_eq!(
            serialize_leaf(&doc, id, NodeKind::Image),
            "<embed data-resource=\"image\" data-resource-id=\"1\" data-alt=\"x\" data-zoomable=\"true\">"
        );
    }

    #[test]
    fn test_leaf_passes_on_foreign_resource() {
        let mut doc = Document::new();
        let (dom, el) = first_root("<embed data-resource=\"video\" data-url=\"v\">");
        assert_eq!(
            deserialize_leaf(&mut doc, &dom, el, NodeKind::Image),
            RuleOutcome::Pass
        );
    }

    #[test]
    fn test_file_group_collects_items() {
        let mut doc = Document::new();
        let (dom, el) = first_root(
            "<div data-type=\"file\">\
             <embed data-resource=\"file\" data-url=\"a.pdf\" data-title=\"A\">\
             <embed data-resource=\"file\" data-url=\"b.pdf\" data-title=\"B\" data-display=\"inline\">\
             </div>",
        );
        let RuleOutcome::Produce(Deserialized::Closed(id)) =
            deserialize_file_group(&mut doc, &dom, el)
        else {
            panic!("file wrapper should produce a group");
        };
        let node = doc.get(id).unwrap();
        let items = node.attrs().unwrap().get_items("items").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("url"), Some("a.pdf"));
        assert_eq!(items[1].get("display"), Some("inline"));

        assert_eq!(
            serialize_group(&doc, id, NodeKind::File),
            "<div data-type=\"file\">\
             <embed data-resource=\"file\" data-url=\"a.pdf\" data-title=\"A\">\
             <embed data-resource=\"file\" data-url=\"b.pdf\" data-title=\"B\" data-display=\"inline\">\
             </div>"
        );
    }

    #[test]
    fn test_bare_item_embed_becomes_single_item_group() {
        let mut doc = Document::new();
        let (dom, el) = first_root("<embed data-resource=\"related-content\" data-article-id=\"7\">");
        let RuleOutcome::Produce(Deserialized::Closed(id)) =
            deserialize_related_content(&mut doc, &dom, el)
        else {
            panic!("bare related-content embed should produce a group");
        };
        assert_eq!(doc.kind(id), Some(NodeKind::RelatedContent));
        let node = doc.get(id).unwrap();
        let items = node.attrs().unwrap().get_items("items").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("article-id"), Some("7"));
    }
}
