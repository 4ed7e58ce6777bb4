//! Fixpoint repair of document invariants.
//!
//! Every mutation source (the codec, editing operations) leaves the tree
//! in an arbitrary state; this module walks it round after round until
//! every structural invariant holds. One round is a single deterministic
//! pre-order walk applying the generic repairs below plus each kind's own
//! normalize rule. Parents repair before children, so a rule that wraps
//! or lifts sees an already-repaired ancestor chain.

use log::{debug, error};

use crate::convert::ConvertContext;
use crate::error::{Error, Result};
use crate::rules;
use crate::tree::{Document, NodeData, NodeId, NodeKind};

/// Outcome of a successful normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Walks performed, including the final clean one.
    pub rounds: usize,
    /// Node repairs applied across all rounds.
    pub mutations: usize,
}

/// Repair a document to its normal form.
///
/// The round cap scales with document size; hitting it means two rules
/// keep undoing each other, which is a rule-table bug and surfaces as an
/// error rather than a silently truncated repair.
pub fn normalize(doc: &mut Document, ctx: &ConvertContext) -> Result<NormalizeReport> {
    let cap = 16 + 2 * doc.live_count();
    let mut rounds = 0;
    let mut mutations = 0;
    loop {
        rounds += 1;
        if rounds > cap {
            error!(
                "normalization diverged: {} mutations over {} rounds without reaching a fixpoint",
                mutations,
                rounds - 1
            );
            return Err(Error::NormalizeDiverged {
                rounds: rounds - 1,
                mutations,
            });
        }
        let applied = normalize_round(doc, ctx);
        debug!("normalize round {rounds}: {applied} repairs");
        mutations += applied;
        if applied == 0 {
            return Ok(NormalizeReport { rounds, mutations });
        }
    }
}

/// One pre-order walk over a snapshot of the tree.
fn normalize_round(doc: &mut Document, ctx: &ConvertContext) -> usize {
    let mut applied = 0;
    for id in doc.walk() {
        // A repair earlier in this round may have detached this node.
        if id != NodeId::ROOT && doc.parent(id).is_none() {
            continue;
        }
        if generic_repairs(doc, id) {
            applied += 1;
        }
        if rules::normalize_node(doc, id, ctx) {
            applied += 1;
        }
    }
    applied
}

/// Structural repairs that apply across kinds.
fn generic_repairs(doc: &mut Document, id: NodeId) -> bool {
    let Some(node) = doc.get(id) else {
        return false;
    };
    let element_kind = match &node.data {
        NodeData::Text { content, .. } => {
            if content.is_empty() {
                doc.detach(id);
                return true;
            }
            return false;
        }
        NodeData::Document => None,
        NodeData::Element { kind, .. } => Some(*kind),
    };

    let Some(kind) = element_kind else {
        // The root holds sections and nothing else.
        return wrap_runs(doc, NodeId::ROOT, NodeKind::Section, |d, c| {
            d.kind(c) != Some(NodeKind::Section)
        });
    };

    // A section below the root is an authoring accident; its content
    // belongs to the enclosing container.
    if kind == NodeKind::Section && doc.parent(id) != NodeId::ROOT {
        return splice_out(doc, id);
    }

    // A grammar-bound kind outside its grammar parent dissolves into
    // whatever holds it; the content gets rewrapped on the next round.
    if misplaced_grammar_kind(doc, id, kind) {
        return splice_out(doc, id);
    }

    if kind.is_leaf() {
        return strip_children(doc, id);
    }

    let mut changed = merge_adjacent_texts(doc, id);
    if drops_loose_whitespace(kind) {
        changed |= drop_whitespace_children(doc, id);
    }
    if wraps_inline_children(kind) {
        changed |= wrap_runs(doc, id, NodeKind::Paragraph, is_inline_content);
    }
    if matches!(
        kind,
        NodeKind::Paragraph
            | NodeKind::Heading
            | NodeKind::Summary
            | NodeKind::Link
            | NodeKind::Span
    ) {
        changed |= lift_block_children(doc, id);
    }
    if fills_when_empty(kind) {
        changed |= fill_empty_container(doc, id);
    }
    if pads_isolated(kind) {
        changed |= pad_isolated_children(doc, id);
    }
    changed
}

/// Kinds that only have meaning directly under one specific parent.
fn misplaced_grammar_kind(doc: &Document, id: NodeId, kind: NodeKind) -> bool {
    let parent_kind = doc.kind(doc.parent(id));
    match kind {
        NodeKind::ListItem => parent_kind != Some(NodeKind::List),
        NodeKind::TableRow => parent_kind != Some(NodeKind::Table),
        NodeKind::TableCell => parent_kind != Some(NodeKind::TableRow),
        NodeKind::GridCell => parent_kind != Some(NodeKind::Grid),
        _ => false,
    }
}

/// Containers whose whitespace-only text children are indentation noise.
fn drops_loose_whitespace(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Section
            | NodeKind::Quote
            | NodeKind::Details
            | NodeKind::FramedContent
            | NodeKind::Grid
            | NodeKind::GridCell
            | NodeKind::List
            | NodeKind::Table
            | NodeKind::TableRow
    )
}

/// Containers that accept only block children and wrap loose inline
/// content into paragraphs. Lists, tables, and grids repair strays with
/// their own wrappers instead.
fn wraps_inline_children(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Section
            | NodeKind::Quote
            | NodeKind::Details
            | NodeKind::FramedContent
            | NodeKind::GridCell
    )
}

/// Containers that are never left empty.
fn fills_when_empty(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Section
            | NodeKind::Quote
            | NodeKind::FramedContent
            | NodeKind::GridCell
            | NodeKind::ListItem
            | NodeKind::TableCell
    )
}

/// Containers in which isolated children get paragraph padding. Grids,
/// lists, and tables are excluded: their repaired children are always
/// grammar kinds, never isolated ones.
fn pads_isolated(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Section
            | NodeKind::Quote
            | NodeKind::Details
            | NodeKind::FramedContent
            | NodeKind::GridCell
            | NodeKind::ListItem
            | NodeKind::TableCell
    )
}

fn is_inline_content(doc: &Document, id: NodeId) -> bool {
    match doc.get(id).map(|n| &n.data) {
        Some(NodeData::Text { .. }) => true,
        Some(NodeData::Element { kind, .. }) => kind.is_inline(),
        _ => false,
    }
}

fn is_block_node(doc: &Document, id: NodeId) -> bool {
    doc.kind(id).is_some_and(|kind| kind.is_block())
}

/// Wrap every run of children matching the predicate into a fresh
/// `wrapper` node, preserving order.
fn wrap_runs(
    doc: &mut Document,
    parent: NodeId,
    wrapper: NodeKind,
    matches: impl Fn(&Document, NodeId) -> bool,
) -> bool {
    let children = doc.children(parent).to_vec();
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();
    for child in children {
        if matches(doc, child) {
            current.push(child);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
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

/// Splice a node's children into its parent at its position and drop it.
fn splice_out(doc: &mut Document, id: NodeId) -> bool {
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

fn strip_children(doc: &mut Document, id: NodeId) -> bool {
    let children = doc.children(id).to_vec();
    if children.is_empty() {
        return false;
    }
    for child in children {
        doc.detach(child);
    }
    true
}

/// Fuse neighboring text children that carry identical marks.
fn merge_adjacent_texts(doc: &mut Document, parent: NodeId) -> bool {
    let mut merged = false;
    let mut index = 1;
    while index < doc.children(parent).len() {
        let prev = doc.children(parent)[index - 1];
        let curr = doc.children(parent)[index];
        match mergeable_text(doc, prev, curr) {
            Some(addition) => {
                if let Some(node) = doc.get_mut(prev) {
                    if let NodeData::Text { content, .. } = &mut node.data {
                        content.push_str(&addition);
                    }
                }
                doc.detach(curr);
                merged = true;
                // The next sibling slid into this index; check it too.
            }
            None => index += 1,
        }
    }
    merged
}

/// The second node's content, when both are texts with the same marks.
fn mergeable_text(doc: &Document, a: NodeId, b: NodeId) -> Option<String> {
    let NodeData::Text { marks: marks_a, .. } = &doc.get(a)?.data else {
        return None;
    };
    let NodeData::Text {
        content,
        marks: marks_b,
    } = &doc.get(b)?.data
    else {
        return None;
    };
    (marks_a == marks_b).then(|| content.clone())
}

fn drop_whitespace_children(doc: &mut Document, id: NodeId) -> bool {
    let mut changed = false;
    for child in doc.children(id).to_vec() {
        if let Some(NodeData::Text { content, .. }) = doc.get(child).map(|n| &n.data) {
            if content.trim().is_empty() {
                doc.detach(child);
                changed = true;
            }
        }
    }
    changed
}

/// Move block children out of an inline-flow parent, placing them right
/// after it in document order.
fn lift_block_children(doc: &mut Document, id: NodeId) -> bool {
    let Some(position) = doc.position(id) else {
        return false;
    };
    let parent = doc.parent(id);
    let blocks: Vec<NodeId> = doc
        .children(id)
        .iter()
        .copied()
        .filter(|child| is_block_node(doc, *child))
        .collect();
    if blocks.is_empty() {
        return false;
    }
    for (offset, block) in blocks.iter().enumerate() {
        doc.insert(parent, position + 1 + offset, *block);
    }
    true
}

fn fill_empty_container(doc: &mut Document, id: NodeId) -> bool {
    if !doc.children(id).is_empty() {
        return false;
    }
    let para = doc.create_element(NodeKind::Paragraph);
    doc.append(id, para);
    true
}

/// Give every isolated child block-kind neighbors by inserting empty
/// paragraphs at the parent's edges and next to non-block siblings.
fn pad_isolated_children(doc: &mut Document, id: NodeId) -> bool {
    let mut changed = false;
    for child in doc.children(id).to_vec() {
        if !doc.kind(child).is_some_and(|k| k.is_isolated()) {
            continue;
        }
        let Some(position) = doc.position(child) else {
            continue;
        };
        let siblings = doc.children(id);
        let needs_before = position == 0 || !is_block_node(doc, siblings[position - 1]);
        let needs_after =
            position + 1 >= siblings.len() || !is_block_node(doc, siblings[position + 1]);
        if needs_before {
            let pad = doc.create_element(NodeKind::Paragraph);
            doc.insert(id, position, pad);
            changed = true;
        }
        if needs_after {
            let at = doc.position(child).unwrap_or(position);
            let pad = doc.create_element(NodeKind::Paragraph);
            doc.insert(id, at + 1, pad);
            changed = true;
        }
    }
    changed
}
