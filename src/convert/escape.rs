//! Pure escaping utilities for markup emission.
//!
//! Decoding is never done here; entity decoding on the read side belongs
//! to the HTML parser, and the codec performs no decoding of its own.

/// Escape text content for markup emission.
///
/// Replaces the five HTML-unsafe characters with entities:
/// - `&` → `&amp;`
/// - `<` → `&lt;`
/// - `>` → `&gt;`
/// - `"` → `&quot;`
/// - `'` → `&#39;`
///
/// # Examples
///
/// ```
/// use tavle::convert::escape_text;
///
/// assert_eq!(escape_text("1 < 2 & 4 > 3"), "1 &lt; 2 &amp; 4 &gt; 3");
/// assert_eq!(escape_text("plain"), "plain");
/// ```
pub fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a double-quoted attribute value.
///
/// Only the ampersand and the delimiter are replaced; every other
/// character is legal inside a double-quoted value and round-trips
/// byte-for-byte.
pub fn escape_attr(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
