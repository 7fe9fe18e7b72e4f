//! The `StoreInsights` aggregate and its fragment types.
//!
//! Field names here are the wire contract: the aggregate is handed to
//! persistence/response collaborators as a single immutable JSON value, so
//! renames are breaking changes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A product extracted from a storefront, either from the JSON catalog feed
/// or from homepage markup (hero products).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Platform numeric product ID, stored as a string to avoid precision loss.
    /// Absent for hero products scraped from markup only.
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    /// Raw HTML from the feed's `body_html` field, or visible card text for
    /// hero products.
    #[serde(default)]
    pub description: Option<String>,
    /// Non-negative decimal price, serialized as a decimal string.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    /// ISO 4217 currency code (e.g., `"USD"`), present whenever `price` is.
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Canonical storefront URL, e.g. `"https://shop.example/products/slug"`.
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Category from the feed's `product_type`, when non-empty.
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    /// Returns `true` when the product satisfies its own invariants:
    /// non-empty title, and a currency code paired with any present price.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let price_ok = match self.price {
            Some(p) => p >= Decimal::ZERO && self.currency.is_some(),
            None => true,
        };
        !self.title.trim().is_empty() && price_ok
    }
}

/// The fixed set of policy kinds a storefront conventionally publishes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Privacy,
    Return,
    Refund,
    Shipping,
    TermsOfService,
}

impl PolicyKind {
    /// All kinds, in serialization order.
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Privacy,
        PolicyKind::Return,
        PolicyKind::Refund,
        PolicyKind::Shipping,
        PolicyKind::TermsOfService,
    ];
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::Privacy => write!(f, "privacy"),
            PolicyKind::Return => write!(f, "return"),
            PolicyKind::Refund => write!(f, "refund"),
            PolicyKind::Shipping => write!(f, "shipping"),
            PolicyKind::TermsOfService => write!(f, "terms-of-service"),
        }
    }
}

/// Policy texts keyed by kind. A missing key means "not found"; an empty
/// string is never stored ([`Policies::insert`] rejects it), so present keys
/// always carry text.
///
/// Backed by a `BTreeMap` so serialization order is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policies(BTreeMap<PolicyKind, String>);

impl Policies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a policy text for `kind`, unless the trimmed text is empty.
    /// Returns `true` when the entry was stored.
    pub fn insert(&mut self, kind: PolicyKind, text: String) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.0.insert(kind, text);
        true
    }

    #[must_use]
    pub fn get(&self, kind: PolicyKind) -> Option<&str> {
        self.0.get(&kind).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PolicyKind, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// A question/answer pair. Both sides are non-empty after trimming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// The recognized set of social platforms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Tiktok,
    Twitter,
    Pinterest,
    Youtube,
    Linkedin,
    Snapchat,
}

impl std::fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Tiktok => "tiktok",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Pinterest => "pinterest",
            SocialPlatform::Youtube => "youtube",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Snapchat => "snapchat",
        };
        write!(f, "{name}")
    }
}

/// A social profile discovered on the storefront. At most one per platform
/// survives into the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialHandle {
    pub platform: SocialPlatform,
    pub handle: String,
    /// Canonical profile URL as found on the page.
    #[serde(default)]
    pub url: Option<String>,
}

/// Deduplicated, normalized contact details.
///
/// Emails are lower-cased; phone numbers are stripped to digits with an
/// optional leading `+`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub contact_form_url: Option<String>,
}

impl ContactInfo {
    /// Returns `true` when no contact detail of any kind was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.phone_numbers.is_empty()
            && self.addresses.is_empty()
            && self.contact_form_url.is_none()
    }
}

/// A curated navigation link (track order, size guide, blog, ...),
/// deduplicated by normalized URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportantLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A competitor store, optionally carrying a nested reduced-run aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub website_url: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Populated by a reduced re-run (validator + catalog + brand context).
    #[serde(default)]
    pub insights: Option<Box<StoreInsights>>,
}

/// The aggregate record produced by one extraction run.
///
/// Constructed exclusively by the orchestrator, immutable once assembled.
/// Invariants: `total_products == products.len()`; every product title is
/// non-empty; hero products resolve into `products` by URL/id when the
/// catalog fetch succeeded, and stand alone otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInsights {
    pub brand_name: String,
    /// Canonical base URL: scheme/host only, no trailing slash.
    pub website_url: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub hero_products: Vec<Product>,
    #[serde(default)]
    pub policies: Policies,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub social_handles: Vec<SocialHandle>,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub brand_context: Option<String>,
    #[serde(default)]
    pub important_links: Vec<ImportantLink>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    /// Snapshot timestamp, attached once all extractors have settled.
    pub scraped_at: DateTime<Utc>,
    pub total_products: usize,
    #[serde(default)]
    pub store_theme: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl StoreInsights {
    /// Returns the social handle for `platform`, if one was extracted.
    #[must_use]
    pub fn social_handle(&self, platform: SocialPlatform) -> Option<&SocialHandle> {
        self.social_handles.iter().find(|h| h.platform == platform)
    }

    /// Returns `true` when the hero product at `index` resolves into the full
    /// catalog by id or URL.
    #[must_use]
    pub fn hero_resolves(&self, hero: &Product) -> bool {
        self.products.iter().any(|p| {
            (hero.id.is_some() && p.id == hero.id)
                || (hero.product_url.is_some() && p.product_url == hero.product_url)
        })
    }

    /// SHA-256 hex digest over the timestamp-independent JSON rendering.
    ///
    /// Two runs against an unchanged page set produce the same fingerprint
    /// even though `scraped_at` differs; persistence layers use this for
    /// change detection.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        // serde_json's default map is sorted, so the rendering is stable.
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        strip_timestamps(&mut value);
        let canonical = value.to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = hasher.finalize();
        digest.iter().fold(String::with_capacity(64), |mut acc, b| {
            use std::fmt::Write as _;
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }
}

/// Drops every `scraped_at` key, including the ones inside nested competitor
/// aggregates.
fn strip_timestamps(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("scraped_at");
            for child in map.values_mut() {
                strip_timestamps(child);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                strip_timestamps(item);
            }
        }
        _ => {}
    }
}
