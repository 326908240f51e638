//! DOM helpers shared by the content algorithms.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Class/id fragments of page chrome that never hold article text.
pub static UNLIKELY_CANDIDATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote|newsletter|cookie|subscribe|share|paywall-prompt",
    )
    .expect("UNLIKELY_CANDIDATES should compile")
});

/// Fragments that rescue an element matched by [`UNLIKELY_CANDIDATES`].
pub static MAYBE_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)and|article|body|column|content|main|shadow")
        .expect("MAYBE_CANDIDATE should compile")
});

pub static POSITIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story")
        .expect("POSITIVE should compile")
});

pub static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|foot|footer|footnote|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|tool|widget",
    )
    .expect("NEGATIVE should compile")
});

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE should compile"));

static TITLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[|\-–—:»]\s+").expect("TITLE_SEPARATOR should compile"));

/// Tags whose content is never text.
pub fn is_non_text_tag(name: &str) -> bool {
    matches!(
        name,
        "script"
            | "style"
            | "noscript"
            | "template"
            | "svg"
            | "iframe"
            | "object"
            | "embed"
            | "canvas"
            | "button"
            | "select"
            | "textarea"
            | "input"
            | "head"
    )
}

/// Non-text tags plus the structural page chrome around an article.
pub fn is_boilerplate_tag(name: &str) -> bool {
    is_non_text_tag(name) || matches!(name, "nav" | "header" | "footer" | "aside" | "form")
}

/// Tags that always start a new line when flattened to text.
pub fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "main"
            | "header"
            | "footer"
            | "aside"
            | "nav"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "dt"
            | "dd"
            | "blockquote"
            | "pre"
            | "table"
            | "thead"
            | "tbody"
            | "tr"
            | "td"
            | "th"
            | "figure"
            | "figcaption"
            | "br"
            | "hr"
            | "address"
            | "details"
            | "summary"
    )
}

/// `class` and `id` attributes joined by a space.
pub fn class_and_id(el: &ElementRef<'_>) -> String {
    let value = el.value();
    format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.attr("id").unwrap_or_default()
    )
}

/// Whether an element's own attributes mark it as page chrome.
pub fn is_unlikely(el: &ElementRef<'_>) -> bool {
    let name = el.value().name();
    if matches!(name, "html" | "body" | "article" | "main") {
        return false;
    }
    if el.value().attr("hidden").is_some() || el.value().attr("aria-hidden") == Some("true") {
        return true;
    }
    if matches!(el.value().attr("role"), Some("navigation" | "complementary" | "banner" | "contentinfo" | "dialog")) {
        return true;
    }
    let attrs = class_and_id(el);
    UNLIKELY_CANDIDATES.is_match(&attrs) && !MAYBE_CANDIDATE.is_match(&attrs)
}

/// Whether `el` or any of its ancestors is boilerplate.
pub fn in_boilerplate(el: &ElementRef<'_>) -> bool {
    std::iter::once(*el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(|e| is_boilerplate_tag(e.value().name()) || is_unlikely(&e))
}

/// Collapse every whitespace run to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Visible text of an element with whitespace collapsed.
///
/// Text inside script-like descendants is skipped.
pub fn inner_text(el: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(el: &ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if is_non_text_tag(name) {
                continue;
            }
            let block = is_block_tag(name);
            if block {
                out.push(' ');
            }
            collect_text(&child_el, out);
            if block {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// Share of an element's text that sits inside links, in `0.0..=1.0`.
pub fn link_density(el: &ElementRef<'_>) -> f64 {
    let total = inner_text(el).chars().count();
    if total == 0 {
        return 0.0;
    }
    let anchors = selector("a");
    let linked: usize = el
        .select(&anchors)
        .map(|a| inner_text(&a).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

/// Parse a selector literal that is known to be valid.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| panic!("invalid built-in selector {css:?}"))
}

/// Resolve the article title.
///
/// Prefers `og:title`, then `<title>` with a trailing site name removed, then
/// the first `<h1>`.
pub fn page_title(doc: &Html) -> Option<String> {
    let og = selector(r#"meta[property="og:title"], meta[name="twitter:title"]"#);
    if let Some(title) = doc
        .select(&og)
        .filter_map(|m| m.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
    {
        return Some(title);
    }

    let title_sel = selector("title");
    if let Some(raw) = doc
        .select(&title_sel)
        .map(|t| inner_text(&t))
        .find(|t| !t.is_empty())
    {
        return Some(strip_site_name(&raw));
    }

    let h1 = selector("h1");
    doc.select(&h1)
        .map(|h| inner_text(&h))
        .find(|t| !t.is_empty())
}

/// Drop a trailing " | Site Name" style suffix when what remains still reads as a title.
fn strip_site_name(raw: &str) -> String {
    let parts: Vec<&str> = TITLE_SEPARATOR.split(raw).collect();
    if parts.len() > 1 {
        let head = parts[..parts.len() - 1].join(" - ");
        if head.split_whitespace().count() >= 3 {
            return head;
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&selector(css)).next().unwrap()
    }

    #[test]
    fn test_inner_text_skips_scripts() {
        let doc = Html::parse_document(
            "<div id=x>Hello <script>evil()</script><b>world</b>\n\n  again</div>",
        );
        assert_eq!(inner_text(&first(&doc, "#x")), "Hello world again");
    }

    #[test]
    fn test_link_density() {
        let doc = Html::parse_document(
            r#"<div id=a><a href="/1">four</a>four</div><div id=b>plain text</div>"#,
        );
        let density = link_density(&first(&doc, "#a"));
        assert!(density > 0.4 && density < 0.6, "{density}");
        assert_eq!(link_density(&first(&doc, "#b")), 0.0);
    }

    #[test]
    fn test_in_boilerplate() {
        let doc = Html::parse_document(
            r#"<body>
                <nav><p id=n>Home</p></nav>
                <div class="sidebar"><p id=s>Trending</p></div>
                <div class="main-content sidebar"><p id=m>Kept</p></div>
                <article><p id=a>Story</p></article>
            </body>"#,
        );
        assert!(in_boilerplate(&first(&doc, "#n")));
        assert!(in_boilerplate(&first(&doc, "#s")));
        assert!(!in_boilerplate(&first(&doc, "#m")));
        assert!(!in_boilerplate(&first(&doc, "#a")));
    }

    #[test]
    fn test_page_title_prefers_og_title() {
        let doc = Html::parse_document(
            r#"<html><head><meta property="og:title" content="Funds face scrutiny"><title>Other</title></head></html>"#,
        );
        assert_eq!(page_title(&doc).as_deref(), Some("Funds face scrutiny"));
    }

    #[test]
    fn test_page_title_strips_site_name() {
        let doc = Html::parse_document(
            "<html><head><title>UK green funds face tougher scrutiny | Reuters</title></head></html>",
        );
        assert_eq!(
            page_title(&doc).as_deref(),
            Some("UK green funds face tougher scrutiny")
        );

        let short = Html::parse_document("<title>Home | Reuters</title>");
        assert_eq!(page_title(&short).as_deref(), Some("Home | Reuters"));
    }

    #[test]
    fn test_page_title_falls_back_to_h1() {
        let doc = Html::parse_document("<body><h1> Headline </h1></body>");
        assert_eq!(page_title(&doc).as_deref(), Some("Headline"));
    }
}
