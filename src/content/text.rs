//! HTML-to-plain-text flattening.
//!
//! Block-level elements start new lines; inline runs are joined with their
//! whitespace collapsed. Empty lines are dropped, and so is everything under
//! script-like tags, page chrome (nav/aside/footer/form) and unlikely class names.

use super::dom::{collapse_whitespace, is_block_tag, is_boilerplate_tag, is_unlikely};
use scraper::ElementRef;

/// Flatten an element to text with one line per block.
pub fn element_to_text(el: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    walk(el, &mut raw);
    raw.lines()
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn walk(el: &ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if is_boilerplate_tag(name) || is_unlikely(&child_el) {
                continue;
            }
            let block = is_block_tag(name);
            if block {
                out.push('\n');
            }
            walk(&child_el, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            // Source newlines inside a text run are layout, not structure.
            out.push_str(&text.replace(['\n', '\r'], " "));
        }
    }
}
