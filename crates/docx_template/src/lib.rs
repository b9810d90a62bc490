//! DOCX Template - content control filling for Word documents
//!
//! This crate reads a .docx package, locates the Structured Document Tags
//! (content controls) in the main document, headers and footers, and fills
//! them from a [`FillSource`]. Repeating sections are expanded by cloning
//! their template row once per data item.
//!
//! ## Structure
//!
//! - [`package`] - ZIP package reading and rewriting
//! - [`xml`] - owned XML tree parsed with quick-xml
//! - [`content_controls`] - SDT discovery and naming
//! - [`fill`] - value writing and repeating-section expansion
//! - [`body`] - block content appended to the document body

pub mod body;
pub mod content_controls;
mod error;
pub mod fill;
pub mod package;
pub mod xml;

pub use content_controls::{list_controls, ContentLevel, ControlInfo, ControlKind};
pub use error::{DocxError, DocxResult};
pub use fill::{fill_document, fill_package, FieldMap, FillReport, FillSource, PartReport};
pub use package::{DocxPackage, CONTENT_TYPES_PART, DOCUMENT_PART};
pub use xml::{XmlDocument, XmlElement, XmlNode};
