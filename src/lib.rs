//! # tavle
//!
//! The document core of an editorial tool for structured educational
//! content: a bidirectional codec between persisted markup and a typed
//! document tree, a fixpoint normalizer that repairs the tree to a fixed
//! grammar, and a semantic diff that guards saves against content loss.
//!
//! ## Features
//!
//! - Parse persisted markup into an arena-allocated [`Document`] tree
//! - Serialize a tree back to markup with stable attribute order
//! - Repair arbitrary trees to the editorial grammar (sections, grids,
//!   details, tables, embeds) by running rules to a fixpoint
//! - Check round trips with a diff that tolerates cosmetic rewrites but
//!   warns on any real deletion
//!
//! ## Quick Start
//!
//! ```
//! use tavle::{read_document, write_document, ConvertContext};
//!
//! let ctx = ConvertContext::new();
//! let doc = read_document("<section><h2>Tide</h2><p>Ebb and flow.</p></section>", &ctx).unwrap();
//! assert_eq!(
//!     write_document(&doc, &ctx),
//!     "<section><h2>Tide</h2><p>Ebb and flow.</p></section>",
//! );
//! ```
//!
//! ## Working with Documents
//!
//! The [`Document`] struct is the central data type: an arena of nodes
//! addressed by [`NodeId`], edited in place and serialized on demand:
//!
//! ```
//! use tavle::{ConvertContext, Document, MarkSet, NodeKind, write_document};
//!
//! let mut doc = Document::new();
//! let section = doc.create_element(NodeKind::Section);
//! doc.append(doc.root(), section);
//! let para = doc.create_element(NodeKind::Paragraph);
//! doc.append(section, para);
//! let text = doc.create_text("Hello", MarkSet::EMPTY);
//! doc.append(para, text);
//!
//! assert_eq!(
//!     write_document(&doc, &ConvertContext::new()),
//!     "<section><p>Hello</p></section>",
//! );
//! ```
//!
//! ## Guarding Saves
//!
//! [`check_markup`] round-trips markup through the codec and reports
//! whether saving the result would lose author content:
//!
//! ```
//! use tavle::{check_markup, ConvertContext};
//!
//! let outcome = check_markup("<section><p>Hi</p></section>", &ConvertContext::new()).unwrap();
//! assert!(!outcome.warn);
//! ```

pub mod convert;
pub mod diff;
pub mod dom;
pub mod embed;
mod error;
pub mod normalize;
pub mod rules;
pub mod tree;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use convert::{ConvertContext, check_markup, read_document, write_document};
pub use diff::{DiffOutcome, semantic_diff};
pub use error::{Error, Result};
pub use normalize::{NormalizeReport, normalize};
pub use tree::{
    AttrValue, AttributeMap, Document, Mark, MarkSet, Node, NodeData, NodeId, NodeKind,
};
