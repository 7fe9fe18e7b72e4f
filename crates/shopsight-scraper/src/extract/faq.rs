//! FAQ discovery and parsing.
//!
//! Recognized markup shapes: `<details><summary>` panels, `<dt>/<dd>` pairs,
//! and heading-followed-by-paragraph inside faq/accordion-classed containers.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use shopsight_core::Faq;

use crate::fetch::{PageCache, RenderMode};
use crate::html::{self, collapse_whitespace};
use crate::urlnorm;

const FAQ_PATHS: &[&str] = &[
    "/faq",
    "/faqs",
    "/pages/faq",
    "/pages/faqs",
    "/help",
    "/support",
    "/frequently-asked-questions",
];

const FAQ_LINK_KEYWORDS: &[&str] = &["faq", "frequently asked", "help", "support"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Scans the homepage plus conventional FAQ pages and FAQ-like links for
/// question/answer pairs. Duplicate questions (normalized, case-insensitive)
/// merge, keeping the first answer seen.
pub async fn extract_faqs(base_url: &str, homepage_html: &str, cache: &PageCache) -> Vec<Faq> {
    let mut faqs: Vec<Faq> = Vec::new();
    let mut seen_questions: HashSet<String> = HashSet::new();

    let mut absorb = |found: Vec<Faq>| {
        for faq in found {
            let key = faq.question.to_lowercase();
            if seen_questions.insert(key) {
                faqs.push(faq);
            }
        }
    };

    absorb(parse_faqs(homepage_html));

    let mut page_urls: Vec<String> = FAQ_PATHS
        .iter()
        .map(|path| format!("{base_url}{path}"))
        .collect();
    for anchor in html::anchors(homepage_html) {
        let text = anchor.text.to_ascii_lowercase();
        if !FAQ_LINK_KEYWORDS.iter().any(|k| text.contains(k)) {
            continue;
        }
        if let Some(url) = urlnorm::resolve_href(base_url, &anchor.href) {
            if urlnorm::same_origin(base_url, &url) && !page_urls.contains(&url) {
                page_urls.push(url);
            }
        }
    }

    for url in page_urls {
        if let Ok(body) = cache.get_or_fetch(&url, RenderMode::Static).await {
            absorb(parse_faqs(&body));
        }
    }

    faqs
}

/// Pulls question/answer pairs out of one document. Pairs with an empty side
/// after trimming are dropped.
#[must_use]
pub fn parse_faqs(page_html: &str) -> Vec<Faq> {
    let document = Html::parse_document(page_html);
    let mut pairs: Vec<(String, String)> = Vec::new();

    collect_details_panels(&document, &mut pairs);
    collect_definition_lists(&document, &mut pairs);
    collect_accordion_headings(&document, &mut pairs);

    pairs
        .into_iter()
        .filter(|(q, a)| !q.is_empty() && !a.is_empty())
        .map(|(question, answer)| Faq {
            question,
            answer,
            category: None,
        })
        .collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn collect_details_panels(document: &Html, pairs: &mut Vec<(String, String)>) {
    let details_sel = selector("details");
    let summary_sel = selector("summary");
    for details in document.select(&details_sel) {
        let Some(summary) = details.select(&summary_sel).next() else {
            continue;
        };
        let question = element_text(summary);
        let full = element_text(details);
        let answer = match full.strip_prefix(question.as_str()) {
            Some(rest) => collapse_whitespace(rest),
            None => full,
        };
        pairs.push((question, answer));
    }
}

fn collect_definition_lists(document: &Html, pairs: &mut Vec<(String, String)>) {
    let dl_sel = selector("dl");
    for dl in document.select(&dl_sel) {
        let mut question: Option<String> = None;
        for child in dl.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "dt" => question = Some(element_text(child)),
                "dd" => {
                    if let Some(q) = question.take() {
                        pairs.push((q, element_text(child)));
                    }
                }
                _ => {}
            }
        }
    }
}

fn collect_accordion_headings(document: &Html, pairs: &mut Vec<(String, String)>) {
    let container_sel = selector(
        "[class*=\"faq\"], [class*=\"Faq\"], [class*=\"FAQ\"], [class*=\"accordion\"], [class*=\"Accordion\"]",
    );
    let heading_sel = selector("h2, h3, h4, h5");
    for container in document.select(&container_sel) {
        for heading in container.select(&heading_sel) {
            let question = element_text(heading);
            // The answer is the heading's next paragraph-like sibling.
            let answer = heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| matches!(el.value().name(), "p" | "div" | "span"))
                .map(element_text);
            if let Some(answer) = answer {
                pairs.push((question, answer));
            }
        }
    }
}
