//! Precision-favouring text extraction.
//!
//! Keeps only block-level text that sits outside page chrome, is not mostly
//! links and is long enough to be prose. Used as the rendered layer's fallback
//! when readability scoring finds too little.

use super::dom::{in_boilerplate, inner_text, link_density, selector, NEGATIVE};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

const BLOCKS: &str = "p, h1, h2, h3, h4, h5, h6, blockquote, pre, li";
const MIN_BLOCK_CHARS: usize = 40;
const MIN_HEADING_CHARS: usize = 10;
const MAX_LINK_DENSITY: f64 = 0.3;

/// Extract article text from a full HTML document.
///
/// Returns `None` when no block survives the filters.
pub fn extract(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let blocks = selector(BLOCKS);
    let mut seen = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    for el in doc.select(&blocks) {
        if contains_block(&el) || in_boilerplate(&el) || negative_ancestor(&el) {
            continue;
        }
        let text = inner_text(&el);
        let min = if is_heading(&el) {
            MIN_HEADING_CHARS
        } else {
            MIN_BLOCK_CHARS
        };
        if text.chars().count() < min || link_density(&el) > MAX_LINK_DENSITY {
            continue;
        }
        if seen.insert(text.clone()) {
            lines.push(text);
        }
    }

    // A trailing heading with nothing under it is navigation, not content.
    while lines.last().is_some_and(|l| l.chars().count() < MIN_BLOCK_CHARS) {
        lines.pop();
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn is_heading(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Blocks that wrap other blocks are represented by their children.
fn contains_block(el: &ElementRef<'_>) -> bool {
    let blocks = selector(BLOCKS);
    el.select(&blocks).any(|d| d.id() != el.id())
}

/// Stricter than [`in_boilerplate`]: any ancestor with a negative class/id is rejected.
fn negative_ancestor(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|a| !matches!(a.value().name(), "html" | "body"))
        .any(|a| {
            let class = a.value().attr("class").unwrap_or_default();
            let id = a.value().attr("id").unwrap_or_default();
            NEGATIVE.is_match(class) || NEGATIVE.is_match(id)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_prose_and_drops_chrome() {
        let html = r#"<html><body>
            <div class="promo-box"><p>Subscribe today and save forty percent on your first year of news.</p></div>
            <main>
              <h2>Fund flows reverse</h2>
              <p>Investors pulled money from sustainable equity funds for a third consecutive month.</p>
              <p>Short line.</p>
              <p><a href="/x">A paragraph that is entirely a link to another article on the site</a></p>
              <ul><li>Outflows were concentrated in large-cap funds domiciled in Europe.</li></ul>
            </main>
            <footer><p>All rights reserved by the publisher and its many partners.</p></footer>
        </body></html>"#;

        let text = extract(html).unwrap();
        assert_eq!(
            text,
            "Fund flows reverse\n\
             Investors pulled money from sustainable equity funds for a third consecutive month.\n\
             Outflows were concentrated in large-cap funds domiciled in Europe."
        );
    }

    #[test]
    fn test_duplicate_blocks_are_dropped() {
        let p = "<p>The same syndicated paragraph appears twice on this page layout.</p>";
        let text = extract(&format!("<body>{p}{p}</body>")).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_nothing_left() {
        assert!(extract("<body><nav><p>Only navigation text lives on this page anyway.</p></nav></body>").is_none());
        assert!(extract("<body><h2>Lonely heading</h2></body>").is_none());
    }
}
