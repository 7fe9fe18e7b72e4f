//! Homepage hero-product extraction.

use scraper::{ElementRef, Html, Selector};
use shopsight_core::Product;

use crate::html::collapse_whitespace;
use crate::urlnorm;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Product-card anchor found on the homepage, before catalog resolution.
#[derive(Debug)]
struct HeroCard {
    url: String,
    title: String,
    image_url: Option<String>,
}

/// Finds product-card-like anchors on the homepage and resolves each against
/// the catalog by detail URL or identifier. Unresolvable cards are kept as
/// standalone entries with whatever the homepage showed. Order follows the
/// markup; duplicates by URL collapse to the first occurrence; anchors with
/// no derivable title are skipped.
#[must_use]
pub fn extract_hero_products(
    homepage_html: &str,
    base_url: &str,
    catalog: &[Product],
) -> Vec<Product> {
    let mut heroes: Vec<Product> = Vec::new();

    for card in hero_cards(homepage_html, base_url) {
        if heroes
            .iter()
            .any(|h| h.product_url.as_deref() == Some(card.url.as_str()))
        {
            continue;
        }

        let resolved = catalog.iter().find(|p| {
            p.product_url
                .as_deref()
                .is_some_and(|u| urlnorm::normalize_link(u) == card.url)
        });

        match resolved {
            Some(product) => heroes.push(product.clone()),
            None => heroes.push(Product {
                id: None,
                title: card.title,
                description: None,
                price: None,
                currency: None,
                image_url: card.image_url,
                product_url: Some(card.url),
                available: None,
                tags: Vec::new(),
                category: None,
            }),
        }
    }

    heroes
}

fn hero_cards(homepage_html: &str, base_url: &str) -> Vec<HeroCard> {
    let document = Html::parse_document(homepage_html);
    let anchor_sel = selector("a[href*=\"/products/\"]");
    let mut cards = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(absolute) = urlnorm::resolve_href(base_url, href) else {
            continue;
        };
        if !urlnorm::same_origin(base_url, &absolute) {
            continue;
        }
        let Some(title) = card_title(anchor) else {
            continue;
        };
        cards.push(HeroCard {
            url: urlnorm::normalize_link(&absolute),
            title,
            image_url: card_image(anchor, base_url),
        });
    }

    cards
}

/// Title from the anchor text, a heading inside or near the anchor, or the
/// image alt text, in that order.
fn card_title(anchor: ElementRef<'_>) -> Option<String> {
    let own_text = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
    if !own_text.is_empty() {
        return Some(own_text);
    }

    let heading_sel = selector("h1, h2, h3, h4");
    if let Some(container) = anchor.parent().and_then(ElementRef::wrap) {
        if let Some(heading) = container.select(&heading_sel).next() {
            let text = collapse_whitespace(&heading.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    let img_sel = selector("img[alt]");
    anchor
        .select(&img_sel)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(collapse_whitespace)
        .filter(|alt| !alt.is_empty())
}

fn card_image(anchor: ElementRef<'_>, base_url: &str) -> Option<String> {
    let img_sel = selector("img[src]");
    let from = |el: ElementRef<'_>| {
        el.select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| urlnorm::resolve_href(base_url, src))
    };
    from(anchor).or_else(|| anchor.parent().and_then(ElementRef::wrap).and_then(from))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const BASE: &str = "https://shop.example";

    fn make_catalog_product(handle: &str, title: &str) -> Product {
        Product {
            id: Some(format!("id-{handle}")),
            title: title.to_owned(),
            description: Some("from the catalog".to_owned()),
            price: "12.00".parse::<Decimal>().ok(),
            currency: Some("USD".to_owned()),
            image_url: None,
            product_url: Some(format!("{BASE}/products/{handle}")),
            available: Some(true),
            tags: Vec::new(),
            category: Some("Soap".to_owned()),
        }
    }

    #[test]
    fn resolves_against_the_catalog_by_url() {
        let catalog = vec![make_catalog_product("lavender-bar", "Lavender Bar")];
        let html = r#"<body><a href="/products/lavender-bar">Lavender Bar</a></body>"#;
        let heroes = extract_hero_products(html, BASE, &catalog);
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].description.as_deref(), Some("from the catalog"));
        assert_eq!(heroes[0].id.as_deref(), Some("id-lavender-bar"));
    }

    #[test]
    fn unresolved_cards_become_standalone_entries() {
        let html = r#"
            <body><a href="/products/limited-run">
              <img src="/cdn/limited.jpg" alt="">Limited Run
            </a></body>"#;
        let heroes = extract_hero_products(html, BASE, &[]);
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].title, "Limited Run");
        assert!(heroes[0].id.is_none());
        assert_eq!(
            heroes[0].image_url.as_deref(),
            Some("https://shop.example/cdn/limited.jpg")
        );
    }

    #[test]
    fn duplicate_urls_collapse_to_first() {
        let html = r#"
            <body>
              <a href="/products/bar">Bar</a>
              <a href="/products/bar#reviews">Bar again</a>
            </body>"#;
        let heroes = extract_hero_products(html, BASE, &[]);
        assert_eq!(heroes.len(), 1);
        assert_eq!(heroes[0].title, "Bar");
    }

    #[test]
    fn image_only_anchor_takes_alt_title() {
        let html = r#"<body><a href="/products/rose"><img src="/r.jpg" alt="Rose Bar"></a></body>"#;
        let heroes = extract_hero_products(html, BASE, &[]);
        assert_eq!(heroes[0].title, "Rose Bar");
    }

    #[test]
    fn titleless_and_offsite_anchors_are_skipped() {
        let html = r#"
            <body>
              <a href="/products/mystery"><img src="/m.jpg"></a>
              <a href="https://other.example/products/x">Elsewhere</a>
            </body>"#;
        assert!(extract_hero_products(html, BASE, &[]).is_empty());
    }
}
