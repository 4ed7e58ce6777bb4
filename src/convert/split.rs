//! Top-level section splitting.

use memchr::memmem;

const SECTION_CLOSE: &str = "</section>";

/// Split markup into per-section fragments on `</section>` boundaries.
///
/// This is deliberately a flat byte scan, not a structural parse:
/// sections are the only legal top-level kind, so every closing section
/// tag terminates one fragment. Anything left after the last closing tag
/// (or an input containing no sections at all) becomes a trailing
/// fragment of loose content for the codec to wrap in a synthesized
/// section. Whitespace-only trailers are discarded.
pub fn split_sections(markup: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;
    for hit in memmem::find_iter(markup.as_bytes(), SECTION_CLOSE.as_bytes()) {
        let end = hit + SECTION_CLOSE.len();
        fragments.push(&markup[start..end]);
        start = end;
    }
    let tail = &markup[start..];
    if !tail.trim().is_empty() {
        fragments.push(tail);
    }
    fragments
}
