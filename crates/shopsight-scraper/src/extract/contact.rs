//! Email, phone, address, and contact-form extraction.

use std::sync::Arc;

use regex::Regex;
use scraper::{Html, Selector};
use shopsight_core::ContactInfo;

use crate::html::{self, collapse_whitespace};
use crate::urlnorm;

/// Image filenames match the email pattern (`logo@2x.png`); these suffixes
/// disqualify a candidate.
const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

const ADDRESS_KEYWORDS: &[&str] = &["address:", "located at", "visit us at"];

const CONTACT_LINK_KEYWORDS: &[&str] = &["contact", "contact-us", "contact_us", "get in touch"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Scans every fetched HTML page for emails, phone numbers, street
/// addresses, and a contact-form link. Catalog feed pages are skipped: a
/// 13-digit product id reads like a phone number. All sets come back
/// deduplicated and normalized; pages must be pre-sorted by URL for a
/// deterministic result.
#[must_use]
pub fn extract_contact_info(base_url: &str, pages: &[(String, Arc<str>)]) -> ContactInfo {
    let email_re = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("valid email regex");
    let phone_re = Regex::new(r"\+?\d[\d\s().\-]{7,16}\d").expect("valid phone regex");

    let mut info = ContactInfo::default();

    for (url, body) in pages {
        if is_feed_page(url, body) {
            continue;
        }
        let text = html::visible_text(body);

        for m in email_re.find_iter(&text) {
            push_email(&mut info.emails, m.as_str());
        }
        for m in phone_re.find_iter(&text) {
            if let Some(normalized) = normalize_phone(m.as_str()) {
                push_unique(&mut info.phone_numbers, normalized);
            }
        }

        for anchor in html::anchors(body) {
            let href = anchor.href.trim();
            if let Some(target) = href.strip_prefix("mailto:") {
                let target = target.split('?').next().unwrap_or(target);
                if email_re.is_match(target) {
                    push_email(&mut info.emails, target);
                }
            } else if let Some(target) = href.strip_prefix("tel:") {
                if let Some(normalized) = normalize_phone(target) {
                    push_unique(&mut info.phone_numbers, normalized);
                }
            } else if info.contact_form_url.is_none() && is_contact_link(&anchor.text, href) {
                if let Some(url) = urlnorm::resolve_href(base_url, href) {
                    if urlnorm::same_origin(base_url, &url) {
                        info.contact_form_url = Some(url);
                    }
                }
            }
        }

        for address in page_addresses(body) {
            push_unique(&mut info.addresses, address);
        }
    }

    info
}

/// Catalog feed responses live in the same cache as HTML pages; match them
/// by the `.json` path or by a body that parses as JSON.
fn is_feed_page(url: &str, body: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.ends_with(".json") {
        return true;
    }
    let trimmed = body.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(body).is_ok()
}

fn push_email(emails: &mut Vec<String>, raw: &str) {
    let email = raw.trim().to_lowercase();
    if IMAGE_SUFFIXES.iter().any(|s| email.ends_with(s)) {
        return;
    }
    push_unique(emails, email);
}

fn push_unique(items: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !items.contains(&candidate) {
        items.push(candidate);
    }
}

/// Digits with an optional leading `+`, validated against false positives:
/// 10 to 15 digits, not all the same digit, no long strictly-sequential run
/// (rejects timestamps and order numbers).
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let plus = raw.trim_start().starts_with('+');
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 || digits.len() > 15 {
        return None;
    }
    let bytes = digits.as_bytes();
    if bytes.iter().all(|&b| b == bytes[0]) {
        return None;
    }
    if longest_sequential_run(bytes) >= 6 {
        return None;
    }
    Some(if plus { format!("+{digits}") } else { digits })
}

fn longest_sequential_run(digits: &[u8]) -> usize {
    let mut longest = 1;
    let mut current = 1;
    for pair in digits.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    longest
}

fn is_contact_link(text: &str, href: &str) -> bool {
    let text = text.to_ascii_lowercase();
    let href = href.to_ascii_lowercase();
    CONTACT_LINK_KEYWORDS
        .iter()
        .any(|k| text.contains(k) || href.contains(k))
}

/// `<address>` elements whole, plus keyword-prefixed text blocks
/// ("Address: …", "Located at …", "Visit us at …").
fn page_addresses(page_html: &str) -> Vec<String> {
    let document = Html::parse_document(page_html);
    let mut found = Vec::new();

    let address_sel = selector("address");
    for el in document.select(&address_sel) {
        let text = collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() {
            found.push(text);
        }
    }

    let block_sel = selector("p, li, div, span");
    for el in document.select(&block_sel) {
        // Leaf blocks only, so a wrapping <div> does not duplicate its <p>.
        if el.children().any(|c| {
            scraper::ElementRef::wrap(c)
                .is_some_and(|child| matches!(child.value().name(), "p" | "li" | "div" | "span"))
        }) {
            continue;
        }
        let text = collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "));
        let lowered = text.to_ascii_lowercase();
        for keyword in ADDRESS_KEYWORDS {
            if let Some(pos) = lowered.find(keyword) {
                let rest = text[pos + keyword.len()..].trim().to_owned();
                if rest.len() >= 8 {
                    found.push(rest);
                }
                break;
            }
        }
    }

    found
}
