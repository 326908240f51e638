//! Readability-style article extraction.
//!
//! Scoring follows the reader-view approach: paragraph-like nodes earn points
//! for length and commas, pass them up to their ancestors (divided by depth),
//! ancestors start from a tag and class/id weight, and every candidate is
//! scaled down by its link density. The best candidate plus any siblings that
//! score close to it form the article, which is then flattened to text.

use super::dom::{
    in_boilerplate, inner_text, is_block_tag, link_density, page_title, selector, NEGATIVE,
    POSITIVE,
};
use super::text::element_to_text;
use scraper::{ElementRef, Html};
use std::collections::HashMap;

const SCORABLE: &str = "p, pre, td, section, h2, h3, h4, h5, h6, div";
const MIN_SCORABLE_CHARS: usize = 25;
const ANCESTOR_DEPTH: usize = 5;

/// Title and flattened body of the best-scoring subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Readable {
    pub title: Option<String>,
    pub text: String,
}

struct Candidate<'a> {
    el: ElementRef<'a>,
    score: f64,
    /// Order in which the candidate was first scored.
    order: usize,
}

/// Run readability scoring over a full HTML document.
///
/// Returns `None` when nothing scores or the chosen subtree has no text.
pub fn extract(html: &str) -> Option<Readable> {
    let doc = Html::parse_document(html);
    let title = page_title(&doc);

    let candidates = score_candidates(&doc);
    let (top, top_score) = candidates
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score).then(b.order.cmp(&a.order)))
        .map(|c| (c.el, c.score))?;

    let parts = merge_siblings(&top, top_score, &candidates);
    let text = parts
        .iter()
        .map(|el| element_to_text(el))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        return None;
    }
    Some(Readable { title, text })
}

fn score_candidates(doc: &Html) -> Vec<Candidate<'_>> {
    let scorable = selector(SCORABLE);
    let mut candidates = HashMap::new();

    for el in doc.select(&scorable) {
        if el.value().name() == "div" && has_block_children(&el) {
            continue;
        }
        if in_boilerplate(&el) {
            continue;
        }
        let text = inner_text(&el);
        let len = text.chars().count();
        if len < MIN_SCORABLE_CHARS {
            continue;
        }

        let commas = text.matches(',').count() as f64;
        let content_score = 1.0 + (commas + 1.0) + ((len / 100) as f64).min(3.0);

        let ancestors = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter(|a| a.value().name() != "html")
            .take(ANCESTOR_DEPTH);
        for (level, ancestor) in ancestors.enumerate() {
            let divider = match level {
                0 => 1.0,
                1 => 2.0,
                n => n as f64 * 3.0,
            };
            let order = candidates.len();
            candidates
                .entry(ancestor.id())
                .or_insert_with(|| Candidate {
                    el: ancestor,
                    score: initial_score(&ancestor),
                    order,
                })
                .score += content_score / divider;
        }
    }

    candidates
        .into_values()
        .map(|mut c: Candidate<'_>| {
            c.score *= 1.0 - link_density(&c.el);
            c
        })
        .collect()
}

/// Include siblings of the top candidate that score close to it or read like prose.
fn merge_siblings<'a>(
    top: &ElementRef<'a>,
    top_score: f64,
    candidates: &[Candidate<'a>],
) -> Vec<ElementRef<'a>> {
    let Some(parent) = top.parent().and_then(ElementRef::wrap) else {
        return vec![*top];
    };
    if matches!(parent.value().name(), "html") {
        return vec![*top];
    }

    let threshold = (top_score * 0.2).max(10.0);
    let top_class = top.value().attr("class").unwrap_or_default();

    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|sibling| {
            if sibling.id() == top.id() {
                return true;
            }
            if in_boilerplate(sibling) {
                return false;
            }
            let mut bonus = 0.0;
            if !top_class.is_empty() && sibling.value().attr("class") == Some(top_class) {
                bonus += top_score * 0.2;
            }
            if let Some(c) = candidates.iter().find(|c| c.el.id() == sibling.id()) {
                if c.score + bonus >= threshold {
                    return true;
                }
            }
            if sibling.value().name() == "p" {
                let text = inner_text(sibling);
                let len = text.chars().count();
                let density = link_density(sibling);
                return (len > 80 && density < 0.25)
                    || (len > 0 && len <= 80 && density == 0.0 && ends_sentence(&text));
            }
            false
        })
        .collect()
}

fn ends_sentence(text: &str) -> bool {
    text.ends_with('.') || text.contains(". ")
}

fn has_block_children(el: &ElementRef<'_>) -> bool {
    el.children()
        .filter_map(ElementRef::wrap)
        .any(|c| is_block_tag(c.value().name()) && c.value().name() != "br")
}

fn initial_score(el: &ElementRef<'_>) -> f64 {
    let tag = match el.value().name() {
        "div" | "article" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    };
    tag + class_weight(el)
}

fn class_weight(el: &ElementRef<'_>) -> f64 {
    let mut weight = 0.0;
    for attr in ["class", "id"] {
        if let Some(value) = el.value().attr(attr).filter(|v| !v.is_empty()) {
            if NEGATIVE.is_match(value) {
                weight -= 25.0;
            }
            if POSITIVE.is_match(value) {
                weight += 25.0;
            }
        }
    }
    weight
}
