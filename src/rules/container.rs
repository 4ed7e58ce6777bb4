//! Rules for structural containers: collapsible sections, framed callouts,
//! and column grids.

use crate::dom::{DomId, MarkupDom};
use crate::tree::{AttributeMap, Document, NodeData, NodeId, NodeKind};

use super::{
    Deserialized, RuleOutcome, copy_data_attrs, div_type_is, tag_is, write_attr_if_present,
    write_data_attrs,
};

/// Fallback column count for grids with a missing or unreadable count.
const DEFAULT_GRID_COLUMNS: usize = 2;
/// Supported column band.
const MAX_GRID_COLUMNS: usize = 4;

pub fn deserialize_details(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "details") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Details, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_details(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<details");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</details>");
    out
}

/// Repair a collapsible to its fixed grammar: one leading summary, then at
/// least one block. Missing parts are synthesized empty; a summary that
/// drifted deeper into the child list is moved back to the front.
pub fn normalize_details(doc: &mut Document, id: NodeId) -> bool {
    let mut changed = false;
    let children = doc.children(id).to_vec();
    let summary_pos = children
        .iter()
        .position(|c| doc.kind(*c) == Some(NodeKind::Summary));
    match summary_pos {
        Some(0) => {}
        Some(pos) => {
            doc.insert(id, 0, children[pos]);
            changed = true;
        }
        None => {
            let summary = doc.create_element(NodeKind::Summary);
            doc.insert(id, 0, summary);
            changed = true;
        }
    }
    if doc.children(id).len() < 2 {
        let body = doc.create_element(NodeKind::Paragraph);
        doc.append(id, body);
        changed = true;
    }
    changed
}

pub fn deserialize_summary(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !tag_is(dom, el, "summary") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &[]);
    let id = doc.create_element_with_attrs(NodeKind::Summary, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_summary(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<summary");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</summary>");
    out
}

/// A summary is only valid as the first child of a collapsible. Anywhere
/// else it becomes a paragraph, keeping its attributes and inline children.
pub fn normalize_summary(doc: &mut Document, id: NodeId) -> bool {
    let parent = doc.parent(id);
    if doc.kind(parent) == Some(NodeKind::Details) && doc.position(id) == Some(0) {
        return false;
    }
    let attrs = doc
        .get(id)
        .and_then(|n| n.attrs())
        .cloned()
        .unwrap_or_default();
    doc.replace_data(
        id,
        NodeData::Element {
            kind: NodeKind::Paragraph,
            attrs,
        },
    );
    true
}

pub fn deserialize_framed_content(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !div_type_is(dom, el, "framed-content") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &["data-type"]);
    let id = doc.create_element_with_attrs(NodeKind::FramedContent, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_framed_content(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<div data-type=\"framed-content\"");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</div>");
    out
}

pub fn deserialize_grid(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !div_type_is(dom, el, "grid") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    if let Some(columns) = dom.get_attr(el, "data-columns") {
        attrs.set("columns", columns);
    }
    copy_data_attrs(dom, el, &mut attrs, &["data-type", "data-columns"]);
    let id = doc.create_element_with_attrs(NodeKind::Grid, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_grid(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<div data-type=\"grid\"");
    write_attr_if_present(doc, id, "columns", "data-columns", &mut out);
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</div>");
    out
}

/// Repair a grid to exactly `columns` cells.
///
/// The column count itself is repaired first (default when missing or
/// unreadable, clamped to the supported band). Loose children are wrapped
/// into cells, missing cells are synthesized empty, and the content of
/// excess cells is merged into the last kept cell rather than dropped.
pub fn normalize_grid(doc: &mut Document, id: NodeId) -> bool {
    let mut changed = false;
    let stored = doc.attr(id, "columns").and_then(|v| v.parse::<usize>().ok());
    let columns = match stored {
        Some(n) if (1..=MAX_GRID_COLUMNS).contains(&n) => n,
        Some(n) => {
            let clamped = n.clamp(1, MAX_GRID_COLUMNS);
            doc.set_attr(id, "columns", clamped.to_string());
            changed = true;
            clamped
        }
        None => {
            doc.set_attr(id, "columns", DEFAULT_GRID_COLUMNS.to_string());
            changed = true;
            DEFAULT_GRID_COLUMNS
        }
    };

    changed |= super::block::wrap_stray_children(doc, id, NodeKind::GridCell);

    let cells = doc.children(id).to_vec();
    if cells.len() > columns {
        let keep = cells[columns - 1];
        for cell in &cells[columns..] {
            for child in doc.children(*cell).to_vec() {
                doc.append(keep, child);
            }
            doc.detach(*cell);
        }
        changed = true;
    } else if cells.len() < columns {
        for _ in cells.len()..columns {
            let cell = doc.create_element(NodeKind::GridCell);
            doc.append(id, cell);
        }
        changed = true;
    }
    changed
}

pub fn deserialize_grid_cell(
    doc: &mut Document,
    dom: &MarkupDom,
    el: DomId,
) -> RuleOutcome<Deserialized> {
    if !div_type_is(dom, el, "grid-cell") {
        return RuleOutcome::Pass;
    }
    let mut attrs = AttributeMap::new();
    copy_data_attrs(dom, el, &mut attrs, &["data-type"]);
    let id = doc.create_element_with_attrs(NodeKind::GridCell, attrs);
    RuleOutcome::Produce(Deserialized::Open(id))
}

pub fn serialize_grid_cell(doc: &Document, id: NodeId, children: &[String]) -> String {
    let mut out = String::from("<div data-type=\"grid-cell\"");
    write_data_attrs(doc, id, &mut out);
    out.push('>');
    for child in children {
        out.push_str(child);
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{fragment_roots, parse_fragment};
    use crate::tree::MarkSet;

    #[test]
    fn test_empty_details_gains_summary_and_body() {
        let mut doc = Document::new();
        let details = doc.create_element(NodeKind::Details);

        assert!(normalize_details(&mut doc, details));

        let children = doc.children(details).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(doc.kind(children[0]), Some(NodeKind::Summary));
        assert_eq!(doc.kind(children[1]), Some(NodeKind::Paragraph));
        assert!(!normalize_details(&mut doc, details));
    }

    #[test]
    fn test_details_moves_summary_to_front() {
        let mut doc = Document::new();
        let details = doc.create_element(NodeKind::Details);
        let para = doc.create_element(NodeKind::Paragraph);
        let summary = doc.create_element(NodeKind::Summary);
        doc.append(details, para);
        doc.append(details, summary);

        assert!(normalize_details(&mut doc, details));
        assert_eq!(doc.children(details), &[summary, para]);
    }

    #[test]
    fn test_stray_summary_becomes_paragraph() {
        let mut doc = Document::new();
        let section = doc.create_element(NodeKind::Section);
        doc.append(doc.root(), section);
        let summary = doc.create_element(NodeKind::Summary);
        let text = doc.create_text("label", MarkSet::EMPTY);
        doc.append(section, summary);
        doc.append(summary, text);

        assert!(normalize_summary(&mut doc, summary));
        assert_eq!(doc.kind(summary), Some(NodeKind::Paragraph));
        // Inline content survives the rewrite.
        assert_eq!(doc.children(summary), &[text]);
    }

    #[test]
    fn test_summary_in_place_is_untouched() {
        let mut doc = Document::new();
        let details = doc.create_element(NodeKind::Details);
        let summary = doc.create_element(NodeKind::Summary);
        let body = doc.create_element(NodeKind::Paragraph);
        doc.append(details, summary);
        doc.append(details, body);

        assert!(!normalize_summary(&mut doc, summary));
        assert_eq!(doc.kind(summary), Some(NodeKind::Summary));
    }

    #[test]
    fn test_grid_defaults_and_pads() {
        let mut doc = Document::new();
        let grid = doc.create_element(NodeKind::Grid);

        assert!(normalize_grid(&mut doc, grid));
        assert_eq!(doc.attr(grid, "columns"), Some("2"));
        let cells = doc.children(grid).to_vec();
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| doc.kind(*c) == Some(NodeKind::GridCell)));
        assert!(!normalize_grid(&mut doc, grid));
    }

    #[test]
    fn test_grid_merges_excess_cells() {
        let mut doc = Document::new();
        let grid = doc.create_element(NodeKind::Grid);
        doc.set_attr(grid, "columns", "2");
        let mut paras = Vec::new();
        for _ in 0..3 {
            let cell = doc.create_element(NodeKind::GridCell);
            let para = doc.create_element(NodeKind::Paragraph);
            doc.append(cell, para);
            doc.append(grid, cell);
            paras.push(para);
        }

        assert!(normalize_grid(&mut doc, grid));

        let cells = doc.children(grid).to_vec();
        assert_eq!(cells.len(), 2);
        // The overflow cell's content lands at the end of the last kept cell.
        assert_eq!(doc.children(cells[1]), &[paras[1], paras[2]]);
    }

    #[test]
    fn test_grid_clamps_column_count() {
        let mut doc = Document::new();
        let grid = doc.create_element(NodeKind::Grid);
        doc.set_attr(grid, "columns", "9");

        normalize_grid(&mut doc, grid);
        assert_eq!(doc.attr(grid, "columns"), Some("4"));

        doc.set_attr(grid, "columns", "banana");
        normalize_grid(&mut doc, grid);
        assert_eq!(doc.attr(grid, "columns"), Some("2"));
    }

    #[test]
    fn test_grid_round_trips_column_attribute() {
        let mut doc = Document::new();
        let dom = parse_fragment("<div data-type=\"grid\" data-columns=\"3\"></div>");
        let roots = fragment_roots(&dom);
        let RuleOutcome::Produce(Deserialized::Open(grid)) =
            deserialize_grid(&mut doc, &dom, roots[0])
        else {
            panic!("grid div should produce a grid");
        };
        assert_eq!(doc.attr(grid, "columns"), Some("3"));
        assert_eq!(
            serialize_grid(&doc, grid, &[]),
            "<div data-type=\"grid\" data-columns=\"3\"></div>"
        );
    }
}
