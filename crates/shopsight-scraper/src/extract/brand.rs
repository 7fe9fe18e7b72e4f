//! Brand name, brand context ("about" narrative), and store metadata.

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::ExtractError;
use crate::fetch::{PageCache, RenderMode};
use crate::html::{self, collapse_whitespace};
use crate::urlnorm;

const ABOUT_PATHS: &[&str] = &[
    "/about",
    "/about-us",
    "/pages/about",
    "/pages/about-us",
    "/pages/our-story",
    "/story",
];

const ABOUT_LINK_KEYWORDS: &[&str] = &["about", "our story", "who we are"];

/// Storefront title suffixes that are boilerplate, not brand.
const TITLE_SUFFIXES: &[&str] = &[
    "home",
    "homepage",
    "welcome",
    "shop",
    "store",
    "official store",
    "official site",
    "online store",
    "online shop",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Brand name from the homepage `<title>`, cleaned of storefront suffixes,
/// falling back to a title-cased domain label.
#[must_use]
pub fn extract_brand_name(homepage_html: &str, base_url: &str) -> String {
    if let Some(title) = html::page_title(homepage_html) {
        let cleaned = clean_title(&title);
        if !cleaned.is_empty() {
            return cleaned;
        }
    }
    if let Some(name) = html::meta_content(homepage_html, "og:site_name") {
        let name = collapse_whitespace(&name);
        if !name.is_empty() {
            return name;
        }
    }
    domain_label(base_url)
}

fn clean_title(title: &str) -> String {
    let parts: Vec<&str> = title
        .split(['|', '–', '—'])
        .flat_map(|p| p.split(" - "))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let kept: Vec<&str> = parts
        .iter()
        .copied()
        .filter(|p| !TITLE_SUFFIXES.contains(&p.to_ascii_lowercase().as_str()))
        .collect();

    kept.first().copied().unwrap_or_default().to_owned()
}

fn domain_label(base_url: &str) -> String {
    let host = urlnorm::bare_host(base_url).unwrap_or_default();
    let label = host.split('.').next().unwrap_or_default();
    label
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Locates an about-style page (conventional paths, then about-like homepage
/// links, then the homepage narrative itself) and returns its main content.
/// Blocks shorter than `min_chars` are rejected; output is capped at
/// `max_chars` on a word boundary.
///
/// # Errors
///
/// [`ExtractError::NoMatchFound`] when no qualifying narrative block exists;
/// the orchestrator absorbs it into an absent field.
pub async fn extract_brand_context(
    base_url: &str,
    homepage_html: &str,
    cache: &PageCache,
    min_chars: usize,
    max_chars: usize,
) -> Result<String, ExtractError> {
    for path in ABOUT_PATHS {
        let url = format!("{base_url}{path}");
        if let Ok(body) = cache.get_or_fetch(&url, RenderMode::Static).await {
            if let Some(text) = qualifying_text(&body, min_chars, max_chars) {
                tracing::debug!(url, "brand context from conventional about path");
                return Ok(text);
            }
        }
    }

    for anchor in html::anchors(homepage_html) {
        let text = anchor.text.to_ascii_lowercase();
        if !ABOUT_LINK_KEYWORDS.iter().any(|k| text.contains(k)) {
            continue;
        }
        let Some(url) = urlnorm::resolve_href(base_url, &anchor.href) else {
            continue;
        };
        if !urlnorm::same_origin(base_url, &url) {
            continue;
        }
        if let Ok(body) = cache.get_or_fetch(&url, RenderMode::Static).await {
            if let Some(text) = qualifying_text(&body, min_chars, max_chars) {
                tracing::debug!(url, "brand context via about-like link");
                return Ok(text);
            }
        }
    }

    qualifying_text(homepage_html, min_chars, max_chars).ok_or(ExtractError::NoMatchFound {
        category: "brand context",
    })
}

fn qualifying_text(page_html: &str, min_chars: usize, max_chars: usize) -> Option<String> {
    let text = html::main_content_text(page_html);
    if text.len() < min_chars {
        return None;
    }
    Some(truncate_at_word(&text, max_chars))
}

fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_owned();
    }
    let mut limit = max_chars;
    while !text.is_char_boundary(limit) {
        limit -= 1;
    }
    let cut = text[..limit].rfind(char::is_whitespace).unwrap_or(limit);
    text[..cut].trim_end().to_owned()
}

/// Optional storefront metadata sniffed from homepage markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreMetadata {
    pub theme: Option<String>,
    pub currency: Option<String>,
    pub language: Option<String>,
}

/// Theme from platform script state or `data-theme` attributes, currency
/// from symbol/ISO-code occurrences, language from `<html lang>` or the
/// `content-language` meta.
#[must_use]
pub fn extract_store_metadata(homepage_html: &str) -> StoreMetadata {
    StoreMetadata {
        theme: detect_theme(homepage_html),
        currency: detect_currency(homepage_html),
        language: detect_language(homepage_html),
    }
}

fn detect_theme(homepage_html: &str) -> Option<String> {
    let theme_re = Regex::new(r#"Shopify\.theme\s*=\s*\{[^}]*"name"\s*:\s*"([^"]+)""#)
        .expect("valid theme regex");
    if let Some(captures) = theme_re.captures(homepage_html) {
        return Some(captures[1].to_owned());
    }

    let document = Html::parse_document(homepage_html);
    let sel = selector("[data-theme]");
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("data-theme"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

fn detect_currency(homepage_html: &str) -> Option<String> {
    let text = html::visible_text(homepage_html);

    let symbols = [('€', "EUR"), ('£', "GBP"), ('¥', "JPY"), ('₹', "INR"), ('$', "USD")];
    let (code, count) = symbols
        .iter()
        .map(|(sym, code)| (*code, text.matches(*sym).count()))
        .max_by_key(|(_, count)| *count)?;
    if count > 0 {
        return Some(code.to_owned());
    }

    let iso_re =
        Regex::new(r"\b(USD|EUR|GBP|CAD|AUD|NZD|JPY|INR|CHF|SEK)\b").expect("valid iso regex");
    iso_re
        .captures(&text)
        .map(|captures| captures[1].to_owned())
}

fn detect_language(homepage_html: &str) -> Option<String> {
    let document = Html::parse_document(homepage_html);
    let sel = selector("html[lang]");
    if let Some(lang) = document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        return Some(lang.to_owned());
    }
    html::meta_content(homepage_html, "content-language")
}
