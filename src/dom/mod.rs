//! Markup parsing into an arena DOM.
//!
//! Persisted markup arrives as bare fragments (no `<html>` envelope). Each
//! fragment is wrapped in a minimal document so the HTML parser runs in its
//! normal document mode, then the body's children are handed to the rule
//! table for conversion.

mod arena;
mod sink;

pub use arena::{DomAttribute, DomChildren, DomId, DomNode, DomNodeData, MarkupDom};
pub use sink::{DomHandle, DomSink};

use html5ever::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse a markup fragment into a DOM tree.
pub fn parse_fragment(markup: &str) -> MarkupDom {
    // Wrap in a minimal document structure for parsing
    let wrapped = format!(
        "<!DOCTYPE html><html><head></head><body>{}</body></html>",
        markup
    );
    let sink = DomSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(wrapped.as_bytes());
    result.into_dom()
}

/// Top-level nodes of a parsed fragment (the children of `<body>`).
pub fn fragment_roots(dom: &MarkupDom) -> Vec<DomId> {
    match dom.find_by_tag("body") {
        Some(body) => dom.children(body).collect(),
        None => Vec::new(),
    }
}
