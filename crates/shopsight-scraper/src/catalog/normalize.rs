//! Feed item → `Product` normalization.

use rust_decimal::Decimal;
use scraper::Html;
use shopsight_core::Product;

use super::types::FeedProduct;
use crate::html::collapse_whitespace;

/// Normalizes one feed item. Returns `None` when the item has no usable
/// title; callers count those as skipped.
#[must_use]
pub fn normalize_product(base_url: &str, item: &FeedProduct) -> Option<Product> {
    let title = collapse_whitespace(&item.title);
    if title.is_empty() {
        return None;
    }

    let priced_variant = item.variants.iter().find(|v| v.price.is_some());
    let price = priced_variant
        .and_then(|v| v.price.as_deref())
        .and_then(|p| p.trim().parse::<Decimal>().ok());
    let currency = Some(
        priced_variant
            .and_then(|v| v.currency.clone())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "USD".to_owned()),
    );

    let product_url = (!item.handle.is_empty())
        .then(|| format!("{base_url}/products/{}", item.handle));

    Some(Product {
        id: item.id.clone(),
        title,
        description: item
            .body_html
            .as_deref()
            .map(strip_html)
            .filter(|d| !d.is_empty()),
        price,
        currency,
        image_url: item.images.first().and_then(|i| i.src.clone()),
        product_url,
        available: Some(item.published_at.is_some()),
        tags: item.tags.clone(),
        category: item
            .product_type
            .clone()
            .map(|c| collapse_whitespace(&c))
            .filter(|c| !c.is_empty()),
    })
}

fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}
