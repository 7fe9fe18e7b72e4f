//! URL canonicalization helpers shared across the pipeline.

use url::Url;

use crate::error::RunError;

/// Canonicalizes a user-supplied store URL down to its origin.
///
/// A bare domain gets an `https://` scheme; the host is lowercased; path,
/// query, and fragment are dropped. The result has no trailing slash so it
/// can be concatenated with absolute paths directly.
///
/// # Errors
///
/// Returns [`RunError::InvalidTargetUrl`] when the input is not an absolute
/// `http(s)` URL with a host after scheme defaulting.
pub fn normalize_base_url(raw: &str) -> Result<String, RunError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RunError::InvalidTargetUrl {
            url: raw.to_owned(),
            reason: "empty URL".to_owned(),
        });
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).map_err(|e| RunError::InvalidTargetUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RunError::InvalidTargetUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| RunError::InvalidTargetUrl {
            url: raw.to_owned(),
            reason: "missing host".to_owned(),
        })?
        .to_ascii_lowercase();

    let mut base = format!("{}://{host}", parsed.scheme());
    if let Some(port) = parsed.port() {
        base.push_str(&format!(":{port}"));
    }
    Ok(base)
}

/// Resolves `href` against `base`, returning an absolute URL string.
/// Unparseable hrefs (and non-http schemes like `mailto:`) yield `None`.
#[must_use]
pub fn resolve_href(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    Some(joined.to_string())
}

/// True when both URLs share scheme, host, and port.
#[must_use]
pub fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}

/// Strips the fragment and any trailing slash so equivalent links dedup to
/// one key.
#[must_use]
pub fn normalize_link(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_owned();
    };
    parsed.set_fragment(None);
    let mut out = parsed.to_string();
    while out.ends_with('/') && !out.ends_with("://") {
        out.pop();
    }
    out
}

/// The registrable host of a URL, lowercased, with any `www.` prefix removed.
#[must_use]
pub fn bare_host(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_owned())
}

/// Host for same-site comparisons: like [`bare_host`] but keeping an explicit
/// port, so two stores on one host with different ports stay distinct.
#[must_use]
pub fn site_host(raw: &str) -> Option<String> {
    let host = bare_host(raw)?;
    let parsed = Url::parse(raw).ok()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}
