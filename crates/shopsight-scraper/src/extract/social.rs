//! Social profile link extraction across all fetched pages.

use std::collections::BTreeMap;
use std::sync::Arc;

use shopsight_core::{SocialHandle, SocialPlatform};
use url::Url;

use crate::html::{self, Region};

/// Path segments that mark share/intent endpoints rather than profiles.
const NON_PROFILE_SEGMENTS: &[&str] = &[
    "sharer",
    "share",
    "share.php",
    "intent",
    "dialog",
    "plugins",
    "hashtag",
    "embed",
    "watch",
];

/// Scans outbound links on every fetched page for social profile URLs.
/// One handle per platform: a footer/header occurrence beats a body one;
/// among equals the first encountered wins. Pages must be pre-sorted by URL
/// for a deterministic result.
#[must_use]
pub fn extract_social_handles(pages: &[(String, Arc<str>)]) -> Vec<SocialHandle> {
    let mut best: BTreeMap<SocialPlatform, (SocialHandle, Region)> = BTreeMap::new();

    for (_, body) in pages {
        for anchor in html::anchors(body) {
            let Some((platform, handle, url)) = classify_profile_url(&anchor.href) else {
                continue;
            };
            match best.get(&platform) {
                None => {
                    best.insert(
                        platform,
                        (
                            SocialHandle {
                                platform,
                                handle,
                                url: Some(url),
                            },
                            anchor.region,
                        ),
                    );
                }
                Some((_, Region::Body)) if anchor.region == Region::Chrome => {
                    best.insert(
                        platform,
                        (
                            SocialHandle {
                                platform,
                                handle,
                                url: Some(url),
                            },
                            Region::Chrome,
                        ),
                    );
                }
                Some(_) => {}
            }
        }
    }

    best.into_values().map(|(handle, _)| handle).collect()
}

/// Matches a URL against the known platform domain patterns, returning the
/// platform, the extracted handle, and the cleaned profile URL.
#[must_use]
pub fn classify_profile_url(href: &str) -> Option<(SocialPlatform, String, String)> {
    let parsed = Url::parse(href).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    let first = segments.first().copied()?;
    if NON_PROFILE_SEGMENTS.contains(&first.to_ascii_lowercase().as_str()) {
        return None;
    }

    let (platform, handle) = match host {
        "instagram.com" => (SocialPlatform::Instagram, first),
        "facebook.com" | "fb.com" => (SocialPlatform::Facebook, first),
        "tiktok.com" => {
            if !first.starts_with('@') {
                return None;
            }
            (SocialPlatform::Tiktok, first)
        }
        "twitter.com" | "x.com" => (SocialPlatform::Twitter, first),
        "pinterest.com" => (SocialPlatform::Pinterest, first),
        "youtube.com" => match first {
            "channel" | "user" | "c" => {
                (SocialPlatform::Youtube, *segments.get(1)?)
            }
            handle if handle.starts_with('@') => (SocialPlatform::Youtube, handle),
            _ => return None,
        },
        "linkedin.com" => match first {
            "company" | "in" => (SocialPlatform::Linkedin, *segments.get(1)?),
            _ => return None,
        },
        "snapchat.com" => {
            if first != "add" {
                return None;
            }
            (SocialPlatform::Snapchat, *segments.get(1)?)
        }
        _ => return None,
    };

    let handle = handle.trim_start_matches('@');
    if handle.is_empty() {
        return None;
    }

    let mut clean = parsed.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    Some((platform, handle.to_owned(), clean.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_page(body: &str) -> (String, Arc<str>) {
        (
            "https://shop.example/".to_owned(),
            Arc::from(format!("<html><body>{body}</body></html>").as_str()),
        )
    }

    #[test]
    fn classifies_the_known_platforms() {
        let cases = [
            ("https://instagram.com/acmesoap", SocialPlatform::Instagram, "acmesoap"),
            ("https://www.facebook.com/acmesoap", SocialPlatform::Facebook, "acmesoap"),
            ("https://fb.com/acmesoap", SocialPlatform::Facebook, "acmesoap"),
            ("https://tiktok.com/@acmesoap", SocialPlatform::Tiktok, "acmesoap"),
            ("https://x.com/acmesoap", SocialPlatform::Twitter, "acmesoap"),
            ("https://pinterest.com/acmesoap", SocialPlatform::Pinterest, "acmesoap"),
            (
                "https://youtube.com/channel/UCabc123",
                SocialPlatform::Youtube,
                "UCabc123",
            ),
            ("https://youtube.com/@acmesoap", SocialPlatform::Youtube, "acmesoap"),
            (
                "https://linkedin.com/company/acme-soap",
                SocialPlatform::Linkedin,
                "acme-soap",
            ),
            (
                "https://snapchat.com/add/acmesoap",
                SocialPlatform::Snapchat,
                "acmesoap",
            ),
        ];
        for (url, platform, handle) in cases {
            let (p, h, _) = classify_profile_url(url)
                .unwrap_or_else(|| panic!("{url} should classify"));
            assert_eq!(p, platform, "{url}");
            assert_eq!(h, handle, "{url}");
        }
    }

    #[test]
    fn share_and_intent_endpoints_are_ignored() {
        assert!(classify_profile_url("https://facebook.com/sharer/sharer.php?u=x").is_none());
        assert!(classify_profile_url("https://twitter.com/intent/tweet?text=hi").is_none());
        assert!(classify_profile_url("https://tiktok.com/acmesoap").is_none());
    }

    #[test]
    fn query_strings_are_stripped_from_the_profile_url() {
        let (_, _, url) =
            classify_profile_url("https://instagram.com/acmesoap?igshid=xyz").unwrap();
        assert_eq!(url, "https://instagram.com/acmesoap");
    }

    #[test]
    fn footer_occurrence_beats_body_occurrence() {
        let page = make_page(
            r#"
            <main><a href="https://instagram.com/old_account">old</a></main>
            <footer><a href="https://instagram.com/acmesoap">Instagram</a></footer>"#,
        );
        let handles = extract_social_handles(&[page]);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].handle, "acmesoap");
    }

    #[test]
    fn one_handle_per_platform_first_wins_among_equals() {
        let page = make_page(
            r#"
            <footer>
              <a href="https://instagram.com/first">a</a>
              <a href="https://instagram.com/second">b</a>
            </footer>"#,
        );
        let handles = extract_social_handles(&[page]);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].handle, "first");
    }
}
