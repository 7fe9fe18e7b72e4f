//! Policy page discovery and extraction.

use shopsight_core::{Policies, PolicyKind};

use crate::fetch::{PageCache, RenderMode};
use crate::html::{self, Anchor};
use crate::urlnorm;

/// Conventional paths per kind, probed in order. `/policies/...` is the
/// platform's canonical prefix and comes first.
fn conventional_paths(kind: PolicyKind) -> &'static [&'static str] {
    match kind {
        PolicyKind::Privacy => &[
            "/policies/privacy-policy",
            "/privacy-policy",
            "/privacy",
            "/pages/privacy-policy",
            "/legal/privacy-policy",
        ],
        PolicyKind::Return => &[
            "/policies/return-policy",
            "/return-policy",
            "/returns",
            "/pages/return-policy",
            "/shipping-and-returns",
        ],
        PolicyKind::Refund => &[
            "/policies/refund-policy",
            "/refund-policy",
            "/refunds",
            "/pages/refund-policy",
        ],
        PolicyKind::Shipping => &[
            "/policies/shipping-policy",
            "/shipping-policy",
            "/shipping",
            "/pages/shipping-policy",
        ],
        PolicyKind::TermsOfService => &[
            "/policies/terms-of-service",
            "/terms-of-service",
            "/terms",
            "/pages/terms-of-service",
            "/legal/terms-of-service",
        ],
    }
}

fn link_keywords(kind: PolicyKind) -> &'static [&'static str] {
    match kind {
        PolicyKind::Privacy => &["privacy"],
        PolicyKind::Return => &["return"],
        PolicyKind::Refund => &["refund"],
        PolicyKind::Shipping => &["shipping"],
        PolicyKind::TermsOfService => &["terms"],
    }
}

/// For each policy kind: conventional paths first, then a homepage link with
/// kind-matching anchor text. First non-empty main-content body wins. Kinds
/// not found are absent from the map.
pub async fn extract_policies(
    base_url: &str,
    homepage_html: &str,
    cache: &PageCache,
) -> Policies {
    let homepage_anchors = html::anchors(homepage_html);
    let mut policies = Policies::new();

    for kind in PolicyKind::ALL {
        if let Some(text) = find_policy_text(base_url, kind, &homepage_anchors, cache).await {
            policies.insert(kind, text);
        } else {
            tracing::debug!(kind = %kind, "no policy page found");
        }
    }

    policies
}

async fn find_policy_text(
    base_url: &str,
    kind: PolicyKind,
    homepage_anchors: &[Anchor],
    cache: &PageCache,
) -> Option<String> {
    for path in conventional_paths(kind) {
        let url = format!("{base_url}{path}");
        if let Some(text) = fetch_policy_body(&url, cache).await {
            tracing::debug!(kind = %kind, url, "policy found at conventional path");
            return Some(text);
        }
    }

    for anchor in homepage_anchors {
        if !anchor_matches(kind, anchor) {
            continue;
        }
        let Some(url) = urlnorm::resolve_href(base_url, &anchor.href) else {
            continue;
        };
        if !urlnorm::same_origin(base_url, &url) {
            continue;
        }
        if let Some(text) = fetch_policy_body(&url, cache).await {
            tracing::debug!(kind = %kind, url, "policy found via link text");
            return Some(text);
        }
    }

    None
}

fn anchor_matches(kind: PolicyKind, anchor: &Anchor) -> bool {
    let text = anchor.text.to_ascii_lowercase();
    link_keywords(kind).iter().any(|k| text.contains(k))
}

async fn fetch_policy_body(url: &str, cache: &PageCache) -> Option<String> {
    let body = cache.get_or_fetch(url, RenderMode::Static).await.ok()?;
    let text = html::main_content_text(&body);
    (!text.is_empty()).then_some(text)
}
