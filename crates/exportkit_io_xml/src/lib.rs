//! `exportkit_io_xml` v1:
//! Hierarchical markup export kernel.
//!
//! Modules:
//! - `spec`   : element model, tree traits, errors
//! - `tree`   : forest serializer (id-indexed, depth-first pre-order)
//! - `encode` : `quick-xml` document encoder
pub mod encode;
pub mod spec;
pub mod tree;

pub use encode::{encode_document, write_document};
pub use spec::{LeafItem, SpecElement, SpecTreeLayout, ToXmlText, TreeNode, XmlExportError};
pub use tree::HierarchicalTreeSerializer;
