//! Core data model for editorial documents.
//!
//! This module contains:
//! - The arena-allocated [`Document`] tree
//! - Node types with closed structural kinds
//! - Insertion-ordered attribute maps
//! - Inline formatting mark sets

mod document;
mod node;

pub use document::Document;
pub use node::{AttrValue, AttributeMap, Mark, MarkSet, Node, NodeData, NodeId, NodeKind};
