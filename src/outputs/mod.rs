//! Reading and writing article record collections.
//!
//! # Submodules
//!
//! - [`json`]: Reads the upstream JSON array and writes the enriched one
//!
//! # Output Structure
//!
//! The output file holds the input records in their original order, each
//! with a `content` field added:
//!
//! ```text
//! [
//!   { "url": "https://…", "title": "…", "content": "Article text…" },
//!   { "url": "https://…", "title": "…", "content": null }
//! ]
//! ```

pub mod json;
