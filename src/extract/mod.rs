// src/extract/mod.rs
// =============================================================================
// This module turns raw page HTML into plain text fragments.
//
// Submodules:
// - html: finds titles, headings and paragraphs on article/comment pages
// - clean: strips tags and decodes entities inside one fragment
// =============================================================================

mod clean;
mod html;

pub use html::{extract, Extraction, PageKind};
