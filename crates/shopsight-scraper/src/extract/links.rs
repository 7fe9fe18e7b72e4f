//! Curated navigation-link extraction.

use std::collections::HashSet;
use std::sync::Arc;

use shopsight_core::ImportantLink;

use crate::extract::social::classify_profile_url;
use crate::html;
use crate::urlnorm;

/// A link qualifies when its visible text or URL path mentions one of these.
const LINK_KEYWORDS: &[&str] = &[
    "track order",
    "track-order",
    "order status",
    "contact",
    "blog",
    "shipping info",
    "size guide",
    "size-guide",
    "sizing",
    "careers",
    "store locator",
    "store-locator",
    "gift card",
    "gift-card",
    "rewards",
    "loyalty",
    "wholesale",
    "affiliate",
];

/// Links already categorized as policies are excluded here.
const POLICY_KEYWORDS: &[&str] = &["privacy", "return", "refund", "terms", "/policies/"];

/// Collects keyword-matching outbound links across all fetched pages,
/// excluding social profiles and policy pages, deduplicated by normalized
/// URL. Pages must be pre-sorted by URL for a deterministic result.
#[must_use]
pub fn extract_important_links(
    base_url: &str,
    pages: &[(String, Arc<str>)],
) -> Vec<ImportantLink> {
    let mut links: Vec<ImportantLink> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (_, body) in pages {
        for anchor in html::anchors(body) {
            let Some(absolute) = urlnorm::resolve_href(base_url, &anchor.href) else {
                continue;
            };
            if classify_profile_url(&absolute).is_some() {
                continue;
            }

            let text_lower = anchor.text.to_ascii_lowercase();
            let url_lower = absolute.to_ascii_lowercase();
            if POLICY_KEYWORDS
                .iter()
                .any(|k| text_lower.contains(k) || url_lower.contains(k))
            {
                continue;
            }
            if !LINK_KEYWORDS
                .iter()
                .any(|k| text_lower.contains(k) || url_lower.contains(k))
            {
                continue;
            }

            let url = urlnorm::normalize_link(&absolute);
            if !seen.insert(url.clone()) {
                continue;
            }

            let title = if anchor.text.is_empty() {
                title_from_path(&url)
            } else {
                anchor.text.clone()
            };
            if title.is_empty() {
                continue;
            }

            links.push(ImportantLink {
                title,
                url,
                description: None,
            });
        }
    }

    links
}

/// Cleans the last path segment into a title: `size-guide` → `Size Guide`.
fn title_from_path(url: &str) -> String {
    let segment = url
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    segment
        .split(['-', '_'])
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
