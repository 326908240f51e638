//! Article content algorithms.
//!
//! Pure, synchronous functions that turn an HTML document into article text.
//! Each extraction layer picks the algorithms it needs:
//!
//! | Algorithm | Module | Used by |
//! |-----------|--------|---------|
//! | Largest text block | [`main_block`] | static fast layer |
//! | Readability scoring | [`readability`] | static readability layer, rendered layer |
//! | Precision filter | [`precision`] | rendered layer fallback |
//!
//! [`dom`] and [`text`] hold the helpers they share.

pub mod dom;
pub mod main_block;
pub mod precision;
pub mod readability;
pub mod text;

use crate::models::{ContentExtractor, char_count};

/// Title and body recovered from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    pub text: String,
    pub extractor: ContentExtractor,
}

impl ExtractedArticle {
    pub fn chars(&self) -> usize {
        char_count(&self.text)
    }
}
