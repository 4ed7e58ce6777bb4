//! Round-trip tests for the markup codec.
//!
//! Markup already in canonical form must come back byte-for-byte, and a
//! round-trip check on it must never warn. Each test covers one wire
//! construct end to end through parse, normalize, and serialize.

use tavle::{ConvertContext, check_markup, read_document, write_document};

fn round_trip(markup: &str) -> String {
    let ctx = ConvertContext::new();
    let doc = read_document(markup, &ctx).expect("conversion should succeed");
    write_document(&doc, &ctx)
}

fn assert_clean(markup: &str) {
    assert_eq!(round_trip(markup), markup);
    let outcome = check_markup(markup, &ConvertContext::new()).expect("check should succeed");
    assert!(
        !outcome.warn,
        "unexpected warning for {markup}: {}",
        outcome.annotated
    );
}

// ============================================================================
// Text and inline constructs
// ============================================================================

#[test]
fn test_article_round_trips_exactly() {
    assert_clean(
        "<section><h2>Tidevann</h2><p>Vannet <strong>stiger</strong> og synker.</p>\
         <ul><li>flo</li><li>fjære</li></ul></section>",
    );
}

#[test]
fn test_nested_marks_round_trip() {
    assert_clean("<section><p>helt <strong><em>avgjørende</em></strong> poeng</p></section>");
}

#[test]
fn test_link_round_trips() {
    assert_clean("<section><p><a href=\"/sti/5\" title=\"Mer\">les mer</a></p></section>");
}

#[test]
fn test_span_language_round_trips() {
    assert_clean("<section><p><span lang=\"se\">Bures</span> betyr hei</p></section>");
}

#[test]
fn test_break_round_trips() {
    assert_clean("<section><blockquote><p>linje en<br>linje to</p></blockquote></section>");
}

#[test]
fn test_escaped_characters_round_trip() {
    assert_clean("<section><p>1 &lt; 2 &amp; 4 &gt; 3</p></section>");
    assert_clean("<section><p>&quot;sitat&quot; og &#39;tegn&#39;</p></section>");
}

// ============================================================================
// Block constructs
// ============================================================================

#[test]
fn test_heading_levels_round_trip() {
    assert_clean("<section><h1>En</h1><h2>To</h2><h3>Tre</h3></section>");
}

#[test]
fn test_ordered_list_round_trips() {
    assert_clean("<section><ol><li>først</li><li>så</li></ol></section>");
}

#[test]
fn test_table_with_header_round_trips() {
    assert_clean(
        "<section><table><thead><tr><th>Sted</th></tr></thead>\
         <tbody><tr><td>Bergen</td></tr></tbody></table></section>",
    );
}

#[test]
fn test_table_without_header_round_trips() {
    assert_clean("<section><table><tbody><tr><td>1</td><td>2</td></tr></tbody></table></section>");
}

#[test]
fn test_details_round_trips() {
    assert_clean("<section><details><summary>Fasit</summary><p>42</p></details></section>");
}

#[test]
fn test_grid_round_trips() {
    assert_clean(
        "<section><div data-type=\"grid\" data-columns=\"2\">\
         <div data-type=\"grid-cell\"><p>venstre</p></div>\
         <div data-type=\"grid-cell\"><p>høyre</p></div></div></section>",
    );
}

#[test]
fn test_framed_content_round_trips() {
    assert_clean("<section><div data-type=\"framed-content\"><p>ramme</p></div></section>");
}

#[test]
fn test_authored_empty_paragraph_survives() {
    assert_clean("<section><p></p></section>");
}

// ============================================================================
// Embeds
// ============================================================================

#[test]
fn test_image_embed_round_trips() {
    assert_clean(
        "<section><embed data-resource=\"image\" data-resource-id=\"7\" \
         data-alt=\"kart\" data-size=\"full\"></section>",
    );
}

#[test]
fn test_embed_unknown_fields_round_trip() {
    // Fields no release knows about yet must survive a round trip.
    assert_clean(
        "<section><embed data-resource=\"image\" data-resource-id=\"7\" \
         data-alt=\"kart\" data-upload-id=\"u1\"></section>",
    );
}

#[test]
fn test_file_group_round_trips() {
    assert_clean(
        "<section><div data-type=\"file\">\
         <embed data-resource=\"file\" data-url=\"/f/1.pdf\" data-title=\"Ark\" data-type=\"pdf\">\
         <embed data-resource=\"file\" data-url=\"/f/2.pdf\" data-title=\"Fasit\" data-type=\"pdf\">\
         </div></section>",
    );
}

#[test]
fn test_related_content_group_round_trips() {
    assert_clean(
        "<section><div data-type=\"related-content\">\
         <embed data-resource=\"related-content\" data-article-id=\"88\">\
         <embed data-resource=\"related-content\" data-url=\"https://eksempel.no\" data-title=\"Ekstern\">\
         </div></section>",
    );
}

#[test]
fn test_concept_embed_round_trips() {
    assert_clean(
        "<section><p>før</p>\
         <embed data-resource=\"concept\" data-content-id=\"12\" data-link-text=\"flo\">\
         <p>etter</p></section>",
    );
}

// ============================================================================
// Document-level behavior
// ============================================================================

#[test]
fn test_multiple_sections_round_trip() {
    assert_clean("<section><p>en</p></section><section><p>to</p></section>");
}

#[test]
fn test_empty_document_round_trips() {
    assert_clean("");
}

#[test]
fn test_loose_block_gains_section_without_warning() {
    assert_eq!(round_trip("<p>alene</p>"), "<section><p>alene</p></section>");
    let outcome = check_markup("<p>alene</p>", &ConvertContext::new()).unwrap();
    assert!(!outcome.warn);
}

#[test]
fn test_language_is_stamped() {
    let ctx = ConvertContext::with_language("nb");
    let doc = read_document("<section><p>hei</p></section>", &ctx).unwrap();
    assert_eq!(doc.language.as_deref(), Some("nb"));
}
