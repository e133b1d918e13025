//! Data model shared by the extractor, the outline pipeline and the output layer.
//!
//! Fragments flow in from an extractor, heading candidates are produced by the
//! classifier, and a [`DocumentResult`] is the one persisted artifact per file.

mod document;
mod fragment;
mod heading;

pub use document::{DocumentResult, ExtractedDocument, OutlineEntry, PageGeometry, ResultMetadata};
pub use fragment::{BBox, FontStyle, Fragment, StyleSignature};
pub use heading::{HeadingCandidate, HeadingLevel};
