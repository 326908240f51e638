//! Main-block article extraction used by the fast static layer.
//!
//! Every paragraph-like element outside page chrome votes for its parent with
//! its word count (half a vote for the grandparent). The element with the most
//! votes is the largest contiguous block of article text; its paragraphs are
//! returned separated by blank lines.

use super::dom::{in_boilerplate, inner_text, link_density, page_title, selector};
use super::ExtractedArticle;
use crate::models::ContentExtractor;
use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// Paragraphs shorter than this (in characters) do not vote.
const MIN_PARAGRAPH_CHARS: usize = 20;
/// Paragraphs that are mostly links do not vote.
const MAX_LINK_DENSITY: f64 = 0.5;

const VOTERS: &str = "p, pre, td";
const OUTPUT_BLOCKS: &str = "p, pre, h2, h3, h4, blockquote, li";

/// Extract title and article text from a full HTML document.
///
/// Returns `None` when no element collects any votes.
pub fn extract(html: &str) -> Option<ExtractedArticle> {
    let doc = Html::parse_document(html);
    let top = top_block(&doc)?;
    let text = block_text(&top);
    if text.is_empty() {
        return None;
    }
    Some(ExtractedArticle {
        title: page_title(&doc),
        text,
        extractor: ContentExtractor::MainBlock,
    })
}

fn top_block<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    let voters = selector(VOTERS);
    // Value is (element, votes, first-seen order); order breaks ties.
    let mut scores: HashMap<_, (ElementRef<'a>, f64, usize)> = HashMap::new();

    for node in doc.select(&voters) {
        if in_boilerplate(&node) {
            continue;
        }
        let text = inner_text(&node);
        if text.chars().count() < MIN_PARAGRAPH_CHARS || link_density(&node) > MAX_LINK_DENSITY {
            continue;
        }
        let words = text.split_whitespace().count() as f64;

        let mut ancestors = node.ancestors().filter_map(ElementRef::wrap);
        if let Some(parent) = ancestors.next() {
            let order = scores.len();
            scores.entry(parent.id()).or_insert((parent, 0.0, order)).1 += words;
        }
        if let Some(grandparent) = ancestors.next() {
            let order = scores.len();
            scores.entry(grandparent.id()).or_insert((grandparent, 0.0, order)).1 += words / 2.0;
        }
    }

    scores
        .into_values()
        .max_by(|a, b| a.1.total_cmp(&b.1).then(b.2.cmp(&a.2)))
        .map(|(el, _, _)| el)
}

fn block_text(top: &ElementRef<'_>) -> String {
    let blocks = selector(OUTPUT_BLOCKS);
    let mut paragraphs: Vec<String> = Vec::new();

    for el in top.select(&blocks) {
        if nested_in_block(&el, top) || in_boilerplate(&el) {
            continue;
        }
        let text = inner_text(&el);
        if !text.is_empty() {
            paragraphs.push(text);
        }
    }
    paragraphs.join("\n\n")
}

/// Whether `el` sits inside another output block below `top`.
fn nested_in_block(el: &ElementRef<'_>, top: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|a| a.id() != top.id())
        .any(|a| matches!(a.value().name(), "p" | "pre" | "blockquote" | "li"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(n: usize) -> String {
        format!(
            "<p>Paragraph {n} explains how sustainable finance funds are being reviewed by regulators this year.</p>"
        )
    }

    #[test]
    fn test_picks_largest_text_block() {
        let body: String = (0..6).map(paragraph).collect();
        let html = format!(
            r#"<html><head><title>Green funds face tougher scrutiny | Example News</title></head>
            <body>
              <nav><p>Home and all the sections of this fine website are listed here</p></nav>
              <div class="teaser"><p>A short teaser paragraph that links elsewhere on the site.</p></div>
              <div class="story">{body}</div>
              <footer><p>Copyright notice for the publisher and all of its affiliates.</p></footer>
            </body></html>"#
        );

        let article = extract(&html).unwrap();
        assert_eq!(article.title.as_deref(), Some("Green funds face tougher scrutiny"));
        assert_eq!(article.extractor, ContentExtractor::MainBlock);
        assert!(article.text.starts_with("Paragraph 0"));
        assert!(article.text.contains("\n\nParagraph 5"));
        assert!(!article.text.contains("teaser"));
        assert!(!article.text.contains("Copyright"));
    }

    #[test]
    fn test_skips_link_lists() {
        let html = r#"<body><div>
            <p><a href="/a">A headline that is only a link to another story</a></p>
            <p><a href="/b">Another headline that is only a link somewhere</a></p>
        </div></body>"#;
        assert!(extract(html).is_none());
    }

    #[test]
    fn test_empty_document() {
        assert!(extract("").is_none());
        assert!(extract("<html><body><div></div></body></html>").is_none());
    }

    #[test]
    fn test_list_items_are_not_duplicated() {
        let html = format!(
            "<body><article>{}<ul><li><p>Nested paragraph inside a list item with enough text.</p></li></ul></article></body>",
            paragraph(1)
        );
        let article = extract(&html).unwrap();
        assert_eq!(article.text.matches("Nested paragraph").count(), 1);
    }

    #[test]
    fn test_equal_blocks_pick_the_first() {
        let html = format!(
            r#"<body><div id="first">{}</div><div id="second">{}</div></body>"#,
            paragraph(1),
            paragraph(2)
        );
        for _ in 0..20 {
            let article = extract(&html).unwrap();
            assert!(article.text.starts_with("Paragraph 1"));
            assert!(!article.text.contains("Paragraph 2"));
        }
    }
}
