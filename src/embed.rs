//! Embed attribute codec.
//!
//! External resources (images, audio, video, H5P activities, concept
//! references, file attachments, related articles) are persisted as void
//! `<embed>` elements whose entire payload is a flat map of `data-*`
//! attributes. This module converts between that wire form and the plain
//! attribute records stored on tree nodes, and offers advisory validation
//! of the fields editors are expected to fill in.
//!
//! Unknown keys round-trip untouched. A record written by a newer editor
//! must survive an open/save cycle in an older one.

use log::warn;

use crate::tree::{AttributeMap, NodeKind};

/// Resource type of an embed, the value of its `data-resource` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedKind {
    Image,
    Audio,
    Video,
    File,
    H5p,
    Concept,
    RelatedContent,
}

impl EmbedKind {
    /// Stable wire name of this resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedKind::Image => "image",
            EmbedKind::Audio => "audio",
            EmbedKind::Video => "video",
            EmbedKind::File => "file",
            EmbedKind::H5p => "h5p",
            EmbedKind::Concept => "concept",
            EmbedKind::RelatedContent => "related-content",
        }
    }

    /// Parse a `data-resource` value.
    pub fn from_resource(value: &str) -> Option<EmbedKind> {
        match value {
            "image" => Some(EmbedKind::Image),
            "audio" => Some(EmbedKind::Audio),
            "video" => Some(EmbedKind::Video),
            "file" => Some(EmbedKind::File),
            "h5p" => Some(EmbedKind::H5p),
            "concept" => Some(EmbedKind::Concept),
            "related-content" => Some(EmbedKind::RelatedContent),
            _ => None,
        }
    }

    /// The tree kind a standalone embed of this type becomes.
    pub fn node_kind(&self) -> NodeKind {
        match self {
            EmbedKind::Image => NodeKind::Image,
            EmbedKind::Audio => NodeKind::Audio,
            EmbedKind::Video => NodeKind::Video,
            EmbedKind::File => NodeKind::File,
            EmbedKind::H5p => NodeKind::H5p,
            EmbedKind::Concept => NodeKind::Concept,
            EmbedKind::RelatedContent => NodeKind::RelatedContent,
        }
    }

    /// Whether embeds of this type are grouped in a wrapper, one record
    /// per item.
    pub fn is_grouped(&self) -> bool {
        matches!(self, EmbedKind::File | EmbedKind::RelatedContent)
    }

    /// Known fields in emission order. Fields not listed here are emitted
    /// after these, in record order.
    pub fn known_fields(&self) -> &'static [&'static str] {
        match self {
            EmbedKind::Image => &["resource-id", "alt", "caption", "size", "align", "decorative"],
            EmbedKind::Audio => &["resource-id", "type", "caption"],
            EmbedKind::Video => &["resource-id", "url", "caption", "autoplay"],
            EmbedKind::File => &["url", "title", "type", "display"],
            EmbedKind::H5p => &["path", "title"],
            EmbedKind::Concept => &["content-id", "type", "link-text"],
            EmbedKind::RelatedContent => &["article-id", "url", "title"],
        }
    }
}

/// Decode wire attributes into an attribute record.
///
/// Keys lose their `data-` prefix; the `data-resource` discriminator is
/// dropped (the caller has already turned it into an [`EmbedKind`]).
/// Attributes without the prefix are not embed payload and are skipped.
/// First-appearance order is preserved.
pub fn decode<'a>(attrs: impl Iterator<Item = (&'a str, &'a str)>) -> AttributeMap {
    let mut record = AttributeMap::new();
    for (name, value) in attrs {
        let Some(key) = name.strip_prefix("data-") else {
            continue;
        };
        if key == "resource" {
            continue;
        }
        record.set(key, value);
    }
    record
}

/// Encode an attribute record back to wire attributes.
///
/// `data-resource` comes first, then the kind's known fields in their
/// fixed order, then any remaining keys in record order. The fixed order
/// makes serialization independent of how the record was assembled, so an
/// untouched embed re-emits byte-identically.
pub fn encode(kind: EmbedKind, record: &AttributeMap) -> Vec<(String, String)> {
    let mut out = vec![("data-resource".to_string(), kind.as_str().to_string())];
    let known = kind.known_fields();

    for field in known {
        if let Some(value) = record.get(field) {
            out.push((format!("data-{}", field), value.to_string()));
        }
    }

    for (key, value) in record.iter() {
        if known.contains(&key) || key == "items" {
            continue;
        }
        if let crate::tree::AttrValue::Text(value) = value {
            out.push((format!("data-{}", key), value.to_string()));
        }
    }

    out
}

/// Advisory validation of editor-provided fields.
///
/// A failing record still decodes, serializes, and round-trips; this
/// signal exists so the editor can badge incomplete embeds. Failures are
/// logged once per check.
pub fn is_user_provided_data_valid(kind: EmbedKind, record: &AttributeMap) -> bool {
    let has = |key: &str| record.get(key).is_some_and(|v| !v.is_empty());

    let valid = match kind {
        EmbedKind::Image => has("alt") || record.get("decorative") == Some("true"),
        EmbedKind::Audio => has("resource-id"),
        EmbedKind::Video => has("resource-id") || has("url"),
        EmbedKind::H5p => has("path"),
        EmbedKind::Concept => has("content-id"),
        EmbedKind::File => has("url") && has("title"),
        EmbedKind::RelatedContent => has("article-id") || (has("url") && has("title")),
    };

    if !valid {
        warn!("incomplete {} embed payload", kind.as_str());
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(pairs: &[(&str, &str)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decode_strips_prefix_and_discriminator() {
        let attrs = [
            ("data-resource", "image"),
            ("data-resource-id", "123"),
            ("data-alt", "A glacier"),
            ("class", "editor-junk"),
        ];
        let record = decode(attrs.into_iter());

        assert_eq!(record.get("resource-id"), Some("123"));
        assert_eq!(record.get("alt"), Some("A glacier"));
        assert!(!record.contains("resource"));
        assert!(!record.contains("class"));
    }

    #[test]
    fn test_encode_fixed_field_order() {
        // Assembled out of order; emission order must not care.
        let record = record(&[("size", "full"), ("alt", "A glacier"), ("resource-id", "123")]);
        let wire = encode(EmbedKind::Image, &record);

        let keys: Vec<_> = wire.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["data-resource", "data-resource-id", "data-alt", "data-size"]
        );
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let attrs = [
            ("data-resource", "video"),
            ("data-resource-id", "55"),
            ("data-upcoming-feature", "yes"),
        ];
        let record = decode(attrs.into_iter());
        let wire = encode(EmbedKind::Video, &record);

        assert!(
            wire.contains(&("data-upcoming-feature".to_string(), "yes".to_string())),
            "unknown field must survive: {:?}",
            wire
        );
        // Unknown fields trail the known ones.
        assert_eq!(wire.last().unwrap().0, "data-upcoming-feature");
    }

    #[test]
    fn test_image_validation() {
        assert!(is_user_provided_data_valid(
            EmbedKind::Image,
            &record(&[("resource-id", "1"), ("alt", "A map of Norway")])
        ));
        assert!(is_user_provided_data_valid(
            EmbedKind::Image,
            &record(&[("resource-id", "1"), ("decorative", "true")])
        ));
        assert!(!is_user_provided_data_valid(
            EmbedKind::Image,
            &record(&[("resource-id", "1"), ("alt", "")])
        ));
    }

    #[test]
    fn test_related_content_validation() {
        assert!(is_user_provided_data_valid(
            EmbedKind::RelatedContent,
            &record(&[("article-id", "321")])
        ));
        assert!(is_user_provided_data_valid(
            EmbedKind::RelatedContent,
            &record(&[("url", "https://example.org"), ("title", "Elsewhere")])
        ));
        assert!(!is_user_provided_data_valid(
            EmbedKind::RelatedContent,
            &record(&[("url", "https://example.org")])
        ));
    }

    proptest! {
        #[test]
        fn prop_codec_preserves_every_field(
            kind_index in 0usize..7,
            known_values in prop::collection::vec("[a-zA-Z0-9 ./:-]{0,12}", 0..4),
            unknown in prop::collection::vec(("[a-z][a-z0-9-]{0,8}", "[a-zA-Z0-9 ]{0,10}"), 0..3),
        ) {
            let kinds = [
                EmbedKind::Image,
                EmbedKind::Audio,
                EmbedKind::Video,
                EmbedKind::File,
                EmbedKind::H5p,
                EmbedKind::Concept,
                EmbedKind::RelatedContent,
            ];
            let kind = kinds[kind_index];

            let mut record = AttributeMap::new();
            for (field, value) in kind.known_fields().iter().zip(&known_values) {
                record.set(*field, value.clone());
            }
            for (key, value) in &unknown {
                if key == "resource" || key == "items" || kind.known_fields().contains(&key.as_str()) {
                    continue;
                }
                record.set(key.clone(), value.clone());
            }

            let wire = encode(kind, &record);
            let decoded = decode(wire.iter().map(|(k, v)| (k.as_str(), v.as_str())));

            prop_assert_eq!(decoded.len(), record.len());
            for (key, _) in record.iter() {
                prop_assert_eq!(decoded.get(key), record.get(key));
            }
            // A second save emits byte-identical wire attributes.
            prop_assert_eq!(encode(kind, &decoded), wire);
        }
    }
}
