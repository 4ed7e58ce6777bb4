//! End-to-end repair tests: damaged markup in, well-formed markup out.
//!
//! Each test feeds the codec markup that breaks some structural rule and
//! asserts the exact repaired serialization. Where the repair only adds
//! structure, the round-trip check must stay quiet too.

use tavle::{ConvertContext, check_markup, normalize, read_document, write_document};

fn round_trip(markup: &str) -> String {
    let ctx = ConvertContext::new();
    let doc = read_document(markup, &ctx).expect("conversion should succeed");
    write_document(&doc, &ctx)
}

fn warns(markup: &str) -> bool {
    check_markup(markup, &ConvertContext::new())
        .expect("check should succeed")
        .warn
}

// ============================================================================
// Whitespace and document shape
// ============================================================================

#[test]
fn test_pretty_printed_markup_saves_clean() {
    let markup = "<section>\n  <h2>Om tidevann</h2>\n  <p>Flo og fjære.</p>\n</section>\n";
    assert_eq!(
        round_trip(markup),
        "<section><h2>Om tidevann</h2><p>Flo og fjære.</p></section>"
    );
    assert!(!warns(markup));
}

#[test]
fn test_loose_content_gains_structure() {
    assert_eq!(
        round_trip("<h2>Start</h2><p>brødtekst</p>"),
        "<section><h2>Start</h2><p>brødtekst</p></section>"
    );
    assert!(!warns("<h2>Start</h2><p>brødtekst</p>"));
}

#[test]
fn test_bare_text_becomes_paragraph() {
    assert_eq!(round_trip("bare tekst"), "<section><p>bare tekst</p></section>");
    assert!(!warns("bare tekst"));
}

#[test]
fn test_nested_section_is_flattened() {
    assert_eq!(
        round_trip("<section><section><p>dypt</p></section></section>"),
        "<section><p>dypt</p></section>"
    );
}

// ============================================================================
// Heading band
// ============================================================================

#[test]
fn test_deep_headings_demote_to_h3() {
    let markup = "<section><h4>fire</h4><h5>fem</h5><h6>seks</h6></section>";
    assert_eq!(
        round_trip(markup),
        "<section><h3>fire</h3><h3>fem</h3><h3>seks</h3></section>"
    );
    assert!(!warns(markup));
}

#[test]
fn test_headings_in_band_are_untouched() {
    let markup = "<section><h1>en</h1><h3>tre</h3></section>";
    assert_eq!(round_trip(markup), markup);
}

// ============================================================================
// Container grammars
// ============================================================================

#[test]
fn test_details_without_summary_gains_one() {
    let markup = "<section><details><p>bare fasit</p></details></section>";
    assert_eq!(
        round_trip(markup),
        "<section><details><summary></summary><p>bare fasit</p></details></section>"
    );
    assert!(!warns(markup));
}

#[test]
fn test_misplaced_summary_moves_to_front() {
    assert_eq!(
        round_trip("<section><details><p>først</p><summary>Fasit</summary></details></section>"),
        "<section><details><summary>Fasit</summary><p>først</p></details></section>"
    );
}

#[test]
fn test_stray_summary_becomes_paragraph() {
    assert_eq!(
        round_trip("<section><summary>ute av sammenheng</summary></section>"),
        "<section><p>ute av sammenheng</p></section>"
    );
}

#[test]
fn test_grid_fills_missing_cells() {
    let markup = "<section><div data-type=\"grid\" data-columns=\"3\">\
                  <div data-type=\"grid-cell\"><p>en</p></div></div></section>";
    assert_eq!(
        round_trip(markup),
        "<section><div data-type=\"grid\" data-columns=\"3\">\
         <div data-type=\"grid-cell\"><p>en</p></div>\
         <div data-type=\"grid-cell\"><p></p></div>\
         <div data-type=\"grid-cell\"><p></p></div></div></section>"
    );
    assert!(!warns(markup));
}

#[test]
fn test_grid_merges_excess_cells() {
    let markup = "<section><div data-type=\"grid\" data-columns=\"2\">\
                  <div data-type=\"grid-cell\"><p>en</p></div>\
                  <div data-type=\"grid-cell\"><p>to</p></div>\
                  <div data-type=\"grid-cell\"><p>tre</p></div></div></section>";
    // Cell three dissolves into cell two; the wrapper tags disappear but
    // the content stays, so the conservative diff still flags the save.
    assert_eq!(
        round_trip(markup),
        "<section><div data-type=\"grid\" data-columns=\"2\">\
         <div data-type=\"grid-cell\"><p>en</p></div>\
         <div data-type=\"grid-cell\"><p>to</p><p>tre</p></div></div></section>"
    );
    assert!(warns(markup));
}

#[test]
fn test_undeclared_grid_defaults_to_two_columns() {
    assert_eq!(
        round_trip("<section><div data-type=\"grid\"><p>innhold</p></div></section>"),
        "<section><div data-type=\"grid\" data-columns=\"2\">\
         <div data-type=\"grid-cell\"><p>innhold</p></div>\
         <div data-type=\"grid-cell\"><p></p></div></div></section>"
    );
}

#[test]
fn test_list_wraps_stray_content() {
    assert_eq!(
        round_trip("<section><ul>løst innhold</ul></section>"),
        "<section><ul><li>løst innhold</li></ul></section>"
    );
}

#[test]
fn test_empty_containers_are_filled() {
    assert_eq!(
        round_trip("<section><blockquote></blockquote></section>"),
        "<section><blockquote><p></p></blockquote></section>"
    );
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_misfiled_header_row_gains_thead() {
    let markup = "<section><table><tbody>\
                  <tr><th>Sted</th></tr><tr><td>Bergen</td></tr>\
                  </tbody></table></section>";
    assert_eq!(
        round_trip(markup),
        "<section><table><thead><tr><th>Sted</th></tr></thead>\
         <tbody><tr><td>Bergen</td></tr></tbody></table></section>"
    );
    assert!(!warns(markup));
}

#[test]
fn test_bare_rows_gain_tbody() {
    let markup = "<section><table><tr><td>1</td></tr></table></section>";
    assert_eq!(
        round_trip(markup),
        "<section><table><tbody><tr><td>1</td></tr></tbody></table></section>"
    );
    assert!(!warns(markup));
}

// ============================================================================
// Isolated embeds
// ============================================================================

#[test]
fn test_lone_embed_keeps_markup_minimal() {
    // In the tree the image is padded with empty paragraphs on both
    // sides; the serialization stays free of them.
    let markup = "<section><embed data-resource=\"image\" data-alt=\"kart\"></section>";
    assert_eq!(round_trip(markup), markup);
    assert!(!warns(markup));
}

// ============================================================================
// Fixpoint behavior
// ============================================================================

#[test]
fn test_normalized_document_is_stable() {
    let ctx = ConvertContext::new();
    let mut doc = read_document(
        "<h6>tittel</h6><details><p>innhold</p></details>løs tekst",
        &ctx,
    )
    .unwrap();
    let report = normalize(&mut doc, &ctx).expect("second pass should converge");
    assert_eq!(report.rounds, 1);
    assert_eq!(report.mutations, 0);
}

#[test]
fn test_second_round_trip_is_identity() {
    let samples = [
        "<section>\n  <h5>Dypt</h5>\n  <p>tekst</p>\n</section>",
        "<h2>Løst</h2><p>innhold</p>",
        "<section><details><p>uten tittel</p></details></section>",
        "<section><div data-type=\"grid\" data-columns=\"3\"><p>en</p></div></section>",
        "<section><table><tr><th>A</th></tr><tr><td>1</td></tr></table></section>",
        "<li>foreldreløs</li>",
    ];
    for sample in samples {
        let once = round_trip(sample);
        assert_eq!(round_trip(&once), once, "unstable round trip for {sample:?}");
    }
}
