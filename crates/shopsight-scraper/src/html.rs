//! Synchronous HTML helpers over `scraper`.
//!
//! `scraper::Html` is not `Send`, so parsing never crosses an await point:
//! every helper takes the raw document text, parses, extracts, and returns
//! owned data.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Where in the document an element sits. Chrome means the site-wide
/// header/footer/nav shell; links there are usually boilerplate, but for
/// social profiles the chrome copy is the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Chrome,
    Body,
}

/// An anchor pulled from a document, href left unresolved.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub href: String,
    pub text: String,
    pub region: Region,
}

const CHROME_TAGS: &[&str] = &["header", "footer", "nav"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn element_region(element: ElementRef<'_>) -> Region {
    let mut node = Some(element);
    while let Some(current) = node {
        let name = current.value().name();
        if CHROME_TAGS.contains(&name) {
            return Region::Chrome;
        }
        if let Some(class) = current.value().attr("class") {
            let lowered = class.to_ascii_lowercase();
            if CHROME_TAGS.iter().any(|t| lowered.contains(t)) {
                return Region::Chrome;
            }
        }
        node = current.parent().and_then(ElementRef::wrap);
    }
    Region::Body
}

/// Collapses all whitespace runs to single spaces and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_skipped_ancestor(node: NodeRef<'_, Node>, skip: &[&str]) -> bool {
    node.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| skip.contains(&el.value().name()))
}

fn text_under(root: ElementRef<'_>, skip: &[&str]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            if !has_skipped_ancestor(node, skip) {
                parts.push(&*text.text);
            }
        }
    }
    collapse_whitespace(&parts.join(" "))
}

/// Human-visible body text: text nodes minus script, style, and the chrome
/// shell.
#[must_use]
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = selector("body");
    let skip = ["script", "style", "noscript", "header", "footer", "nav"];
    document
        .select(&body)
        .next()
        .map(|el| text_under(el, &skip))
        .unwrap_or_default()
}

const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    ".main-content",
    ".policy-content",
    ".page-content",
    ".content",
    "#MainContent",
];

/// Text of the page's primary content region, falling back to the whole
/// visible body when no content container matches.
#[must_use]
pub fn main_content_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let skip = ["script", "style", "noscript"];
    for css in MAIN_CONTENT_SELECTORS {
        let sel = selector(css);
        if let Some(el) = document.select(&sel).next() {
            let text = text_under(el, &skip);
            if !text.is_empty() {
                return text;
            }
        }
    }
    visible_text(html)
}

/// Every anchor with a non-empty href, tagged with its document region.
#[must_use]
pub fn anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let sel = selector("a[href]");
    document
        .select(&sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            Some(Anchor {
                href: href.to_owned(),
                text: collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")),
                region: element_region(el),
            })
        })
        .collect()
}

/// The document `<title>` text, whitespace-collapsed.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let sel = selector("title");
    let title = document
        .select(&sel)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))?;
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// The `content` attribute of `<meta name="...">` or `<meta property="...">`.
#[must_use]
pub fn meta_content(html: &str, name: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for attr in ["name", "property"] {
        let sel = selector(&format!("meta[{attr}=\"{name}\"]"));
        if let Some(content) = document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
        {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_owned());
            }
        }
    }
    None
}
