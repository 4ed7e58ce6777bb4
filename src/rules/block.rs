//! Rules for text-flow blocks, lists, and tables.

use crate::dom::{DomId, MarkupDom};
use crate::tree::{AttributeMap, Document, NodeId, NodeKind};

use super::{Deserialized, RuleOutcome, copy_data_attrs, tag_is, write_attr_if_present, write_data_attrs};

pub fn deserialize_section(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "section") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Section, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_section(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<section");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</section>");
    out
}

pub fn deserialize_paragraph(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "p") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Paragraph, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_paragraph(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<p");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</p>");
    out
}

pub fn deserialize_heading(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    let Some(name) = dom.element_name(el) else {
        return RuleOutcome::Pass;
    };
    let level = match name.as_ref() {
        "h1" => 1u8,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        "h5" => 5,
        "h6" => 6,
        _ => return RuleOutcome::Pass,
    };
    let mut attrs = AttributeMap::new();
    attrs.set("level", level.to_string());
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Heading, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_heading(doc: &Document, id: NodeId, children: &[String]) -> String {
    let level = heading_level(doc, id).unwrap_or(2);
    let mut out = format!("<h{}", level);
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str(&format!("</h{}>", level));
    out
}

fn heading_level(doc: &Document, id: NodeId) -> Option<u8> {
    doc.attr(id, "level").and_then(|v| v.parse().ok())
}

/// Clamp heading levels to the supported band (1-3) and repair a missing
/// or unreadable level to the default body heading.
pub fn normalize_heading(doc: &mut Document, id: NodeId) -> bool {
    let level = heading_level(doc, id);
    let repaired = match level {
        None => 2,
        Some(0) => 1,
        Some(n) if n > 3 => 3,
        Some(n) => n,
    };
    if level == Some(repaired) {
        return false;
    }
    doc.set_attr(id, "level", repaired.to_string());
    true
}

pub fn deserialize_quote(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "blockquote") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Quote, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_quote(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<blockquote");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</blockquote>");
    out
}

pub fn deserialize_list(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    let ordered = if tag_is(dom, el, "ol") {
        true
    } else if tag_is(dom, el, "ul") {
        false
    } else {
        return RuleOutcome::Pass;
    };
    let mut attrs = AttributeMap::new();
    attrs.set("ordered", if ordered { "true" } else { "false" });
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::List, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_list(doc: &Document, id: NodeId, children: &[String]) -> String {
    let tag = if doc.attr(id, "ordered") == Some("true") {
        "ol"
    } else {
        "ul"
    };
    let mut out = format!("<{}", tag);
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str(&format!("</{}>", tag));
    out
}

/// Lists hold list items only; anything else is wrapped into one.
pub fn normalize_list(doc: &mut Document, id: NodeId) -> bool {
    wrap_stray_children(doc, id, NodeKind::ListItem)
}

pub fn deserialize_list_item(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "li") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::ListItem, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_list_item(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<li");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</li>");
    out
}

pub fn deserialize_table(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "table") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Table, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

/// Serialize a table, re-synthesizing the header grouping.
///
/// The tree stores a flat row list; whether a row belongs in `<thead>` is
/// derived from its cells. The leading run of rows whose every cell is a
/// header cell becomes the `<thead>`, the remainder the `<tbody>`. A table
/// that arrived with its header row misfiled in `<tbody>` therefore comes
/// back out with a proper `<thead>`.
pub fn serialize_table(doc: &Document, id: NodeId, children: &[String]) -> String {
    let rows = doc.children(id);
    let mut out = String::from("<table");
    write_data_attrs(doc, id, &mut out);
    out.push('>');

    if children.is_empty() {
        out.push_str("</table>");
        return out;
    }

    let mut head_end = 0;
    for row in rows.iter().take(children.len()) {
        if is_header_row(doc, *row) {
            head_end += 1;
        } else {
            break;
        }
    }

    if head_end > 0 {
        out.push_str("<thead>");
        for child in &children[..head_end] {
            out.push_str(child);
        }
        out.push_str("</thead>");
    }
    if head_end < children.len() {
        out.push_str("<tbody>");
        for child in &children[head_end..] {
            out.push_str(child);
        }
        out.push_str("</tbody>");
    }
    out.push_str("</table>");
    out
}

fn is_header_row(doc: &Document, row: NodeId) -> bool {
    let cells = doc.children(row);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            doc.kind(*cell) == Some(NodeKind::TableCell)
                && doc.attr(*cell, "header") == Some("true")
        })
}

/// Tables hold rows only.
pub fn normalize_table(doc: &mut Document, id: NodeId) -> bool {
    wrap_stray_children(doc, id, NodeKind::TableRow)
}

pub fn deserialize_table_row(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "tr") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::TableRow, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_table_row(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<tr");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</tr>");
    out
}

/// Rows hold cells only.
pub fn normalize_table_row(doc: &mut Document, id: NodeId) -> bool {
    wrap_stray_children(doc, id, NodeKind::TableCell)
}

pub fn deserialize_table_cell(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    let header = if tag_is(dom, el, "th") {
        true
    } else if tag_is(dom, el, "td") {
        false
    } else {
        return RuleOutcome::Pass;
    };
    let mut attrs = AttributeMap::new();
    if header {
        attrs.set("header", "true");
    }
    for key in ["colspan", "rowspan"] {
        if let Some(value) = dom.get_attr(el, key) {
            attrs.set(key, value);
        }
    }
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::TableCell, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_table_cell(doc: &Document, id: NodeId, children: &[String]) -> String {
    let tag = if doc.attr(id, "header") == Some("true") {
        "th"
    } else {
        "td"
    };
    let mut out = format!("<{}", tag);
    write_attr_if_present(doc, id, "colspan", "colspan", &mut out);
    write_attr_if_present(doc, id, "rowspan", "rowspan", &mut out);
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str(&format!("</{}>", tag));
    out
}

/// Wrap every run of children that are not `wrapper` into a fresh
/// `wrapper` node, preserving order.
pub(super) fn wrap_stray_children(doc: &mut Document, parent: NodeId, wrapper: NodeKind) -> bool {
    let children = doc.children(parent).to_vec();
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();
    for child in children {
        if doc.kind(child) == Some(wrapper) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(child);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    if runs.is_empty() {
        return false;
    }

    for run in runs {
        let index = doc.position(run[0]).unwrap_or(0);
        let wrapper_id = doc.create_element(wrapper);
        doc.insert(parent, index, wrapper_id);
        for child in run {
            doc.append(wrapper_id, child);
        }
    }
    true
}
