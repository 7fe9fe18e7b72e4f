//! End-to-end pipeline tests against a local `wiremock` server.
//!
//! Each test stands up its own `MockServer`, so no real network traffic is
//! made. Scenarios cover validation rejection, partial-failure absorption,
//! pagination guards, competitor probing, and aggregate idempotence.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopsight_core::{PolicyKind, SocialPlatform};
use shopsight_scraper::catalog::{self, CatalogOptions};
use shopsight_scraper::{
    run_insights, CompetitorCandidate, CompetitorSource, ExtractError, HttpFetcher, PageCache,
    PageFetcher, RunError, RunOptions,
};

/// 5-second timeout, descriptive UA, no retries.
fn test_fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(HttpFetcher::new(5, "shopsight-test/0.1", 0, 0).expect("failed to build HttpFetcher"))
}

fn test_options() -> RunOptions {
    RunOptions {
        max_catalog_pages: 5,
        catalog_page_size: 2,
        inter_page_delay_ms: 0,
        brand_context_min_chars: 40,
        run_deadline_secs: 30,
        ..RunOptions::default()
    }
}

fn storefront_homepage() -> String {
    r#"<html lang="en">
<head>
  <title>Acme Soap Co. | Shop</title>
  <script src="https://cdn.shopify.com/s/files/1/theme.js"></script>
</head>
<body>
  <header class="site-header">
    <a href="/pages/contact">Contact us</a>
  </header>
  <main>
    <p>Small-batch soap, hand poured in Portland since 2011. Every bar is
       made from organic oils and cut by hand in our riverside workshop.</p>
    <a href="/products/lavender-bar">Lavender Bar</a>
    <a href="/products/ghost"><img src="/cdn/ghost.jpg" alt="">Ghost Bar</a>
    <a href="https://instagram.com/acmesoap_old">our feed</a>
    <details class="faq">
      <summary>Do you ship internationally?</summary>
      <p>Yes, we ship to most countries worldwide.</p>
    </details>
    <p>Write to hello@acmesoap.com or call <a href="tel:+1-503-555-0177">us</a>.</p>
  </main>
  <footer>
    <a href="https://instagram.com/acmesoap">Instagram</a>
    <a href="https://tiktok.com/@acmesoap">TikTok</a>
    <a href="/policies/privacy-policy">Privacy policy</a>
  </footer>
</body>
</html>"#
        .to_owned()
}

fn catalog_page(ids: &[i64]) -> serde_json::Value {
    json!({
        "products": ids.iter().map(|id| json!({
            "id": id,
            "title": format!("Product {id}"),
            "handle": if *id == 1 { "lavender-bar".to_owned() } else { format!("product-{id}") },
            "body_html": "<p>A very fine bar of soap.</p>",
            "product_type": "Soap",
            "published_at": "2026-01-05T00:00:00Z",
            "tags": ["vegan"],
            "variants": [{"price": "12.50", "available": true}],
            "images": [{"src": format!("https://cdn.example/{id}.jpg")}]
        })).collect::<Vec<_>>()
    })
}

/// Homepage + privacy policy; the catalog feed is configured per test.
async fn mount_storefront_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(storefront_homepage()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/policies/privacy-policy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><main class="policy-content">
               We collect only the data needed to fulfil your order and never
               sell personal information to third parties.
               </main></body></html>"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn non_storefront_target_aborts_before_any_extraction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>A plain brochure site</h1></body></html>"),
        )
        .mount(&server)
        .await;

    let result = run_insights(&server.uri(), test_fetcher(), None, &test_options()).await;
    assert!(
        matches!(result, Err(RunError::NotAStorefront { .. })),
        "expected NotAStorefront, got: {result:?}"
    );

    // Only the signature probes ran; no policy/FAQ/about page was touched.
    let requests = server.received_requests().await.expect("recording enabled");
    for request in &requests {
        let p = request.url.path();
        assert!(
            p == "/" || p == "/products.json",
            "unexpected request during failed validation: {p}"
        );
    }
}

#[tokio::test]
async fn unreachable_catalog_still_yields_a_populated_aggregate() {
    let server = MockServer::start().await;
    mount_storefront_pages(&server).await;
    // No /products.json mock: probe and catalog walk both 404. Validation
    // falls through to homepage markers.

    let (insights, metadata) =
        run_insights(&server.uri(), test_fetcher(), None, &test_options())
            .await
            .expect("run should succeed on homepage markers");

    assert_eq!(insights.total_products, 0);
    assert!(insights.products.is_empty());

    // Heroes survive as standalone entries.
    let hero_titles: Vec<&str> = insights
        .hero_products
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(hero_titles, vec!["Lavender Bar", "Ghost Bar"]);
    assert!(insights.hero_products.iter().all(|p| p.id.is_none()));

    // Other categories populate independently.
    assert!(insights.policies.get(PolicyKind::Privacy).is_some());
    assert_eq!(insights.faqs.len(), 1);
    assert!(insights.contact_info.emails.contains(&"hello@acmesoap.com".to_owned()));
    assert!(insights
        .contact_info
        .phone_numbers
        .contains(&"+15035550177".to_owned()));
    assert_eq!(insights.brand_name, "Acme Soap Co.");
    assert!(insights.brand_context.is_some());
    assert_eq!(insights.language.as_deref(), Some("en"));

    assert!(
        metadata
            .extractor_failures
            .iter()
            .any(|f| f.starts_with("catalog:")),
        "catalog failure should be tallied: {:?}",
        metadata.extractor_failures
    );
}

#[tokio::test]
async fn footer_social_link_wins_over_body_link() {
    let server = MockServer::start().await;
    mount_storefront_pages(&server).await;

    let (insights, _) = run_insights(&server.uri(), test_fetcher(), None, &test_options())
        .await
        .expect("run should succeed");

    let instagram = insights
        .social_handle(SocialPlatform::Instagram)
        .expect("one instagram handle");
    assert_eq!(instagram.handle, "acmesoap");
    assert_eq!(
        insights
            .social_handles
            .iter()
            .filter(|h| h.platform == SocialPlatform::Instagram)
            .count(),
        1
    );
    assert!(insights.social_handle(SocialPlatform::Tiktok).is_some());
}

#[tokio::test]
async fn hero_products_resolve_against_the_catalog() {
    let server = MockServer::start().await;
    mount_storefront_pages(&server).await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_page(&[1])))
        .mount(&server)
        .await;

    let (insights, metadata) =
        run_insights(&server.uri(), test_fetcher(), None, &test_options())
            .await
            .expect("run should succeed");

    assert_eq!(insights.total_products, 1);
    assert_eq!(insights.hero_products.len(), 2);

    // "Lavender Bar" resolves into the catalog entry, "Ghost Bar" stands alone.
    let resolved = &insights.hero_products[0];
    assert_eq!(resolved.id.as_deref(), Some("1"));
    assert_eq!(resolved.title, "Product 1");
    assert!(insights.hero_resolves(resolved));
    let standalone = &insights.hero_products[1];
    assert!(standalone.id.is_none());
    assert_eq!(standalone.title, "Ghost Bar");

    assert_eq!(metadata.skipped_products, 0);
    assert!(metadata.extractor_failures.is_empty());
}

#[tokio::test]
async fn pagination_stops_on_short_page_and_skips_untitled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_page(&[1, 2])))
        .expect(1)
        .mount(&server)
        .await;
    let mut short_page = catalog_page(&[3]);
    short_page["products"][0]["title"] = json!("");
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&short_page))
        .expect(1)
        .mount(&server)
        .await;

    let cache = PageCache::new(test_fetcher());
    let options = CatalogOptions {
        max_pages: 100,
        page_size: 2,
        inter_page_delay_ms: 0,
    };
    let pull = catalog::pull_catalog(&server.uri(), &cache, &options)
        .await
        .expect("catalog should pull");

    assert_eq!(pull.pages_fetched, 2);
    assert_eq!(pull.products.len(), 2);
    assert_eq!(pull.skipped_untitled, 1);
    server.verify().await;
}

#[tokio::test]
async fn pagination_terminates_when_the_feed_repeats_itself() {
    let server = MockServer::start().await;
    // Every page echoes the same two products, never a short page.
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_page(&[1, 2])))
        .mount(&server)
        .await;

    let cache = PageCache::new(test_fetcher());
    let options = CatalogOptions {
        max_pages: 100,
        page_size: 2,
        inter_page_delay_ms: 0,
    };
    let pull = catalog::pull_catalog(&server.uri(), &cache, &options)
        .await
        .expect("catalog should pull");

    // Page 1 contributes both ids; pages 2 and 3 contribute nothing and trip
    // the loop guard long before max_pages.
    assert_eq!(pull.products.len(), 2);
    assert_eq!(pull.pages_fetched, 3);
}

#[tokio::test]
async fn catalog_unavailable_is_an_error_for_the_extractor_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>splash</html>"))
        .mount(&server)
        .await;

    let cache = PageCache::new(test_fetcher());
    let options = CatalogOptions {
        max_pages: 5,
        page_size: 2,
        inter_page_delay_ms: 0,
    };
    let result = catalog::pull_catalog(&server.uri(), &cache, &options).await;
    assert!(
        matches!(result, Err(ExtractError::CatalogUnavailable { .. })),
        "expected CatalogUnavailable, got: {result:?}"
    );
}

struct FixedSource {
    candidates: Vec<CompetitorCandidate>,
}

#[async_trait]
impl CompetitorSource for FixedSource {
    async fn candidates(
        &self,
        _brand: &str,
        _category: Option<&str>,
    ) -> Result<Vec<CompetitorCandidate>, ExtractError> {
        Ok(self.candidates.clone())
    }
}

async fn mount_rival(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Rival Soap | Shop</title></head>
               <body><main><p>Rival soap, made by rivals, for rival people,
               in a rival factory near the rival river.</p></main></body></html>"#,
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_page(&[9])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn invalid_competitor_candidates_are_dropped_silently() {
    let target = MockServer::start().await;
    mount_storefront_pages(&target).await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_page(&[1])))
        .mount(&target)
        .await;

    let rival = MockServer::start().await;
    mount_rival(&rival).await;
    // Nothing mounted here: every candidate probe 404s and fails validation.
    let dead = MockServer::start().await;

    let make = |name: &str, domain: String| CompetitorCandidate {
        name: name.to_owned(),
        domain,
        description: None,
    };
    let source = Arc::new(FixedSource {
        candidates: vec![
            make("Rival One", rival.uri()),
            make("Rival Two", rival.uri()),
            make("Dead Store", dead.uri()),
            make("Rival Three", rival.uri()),
            make("Rival Four", rival.uri()),
        ],
    });

    let options = RunOptions {
        competitor_discovery: true,
        ..test_options()
    };
    let (insights, _) = run_insights(&target.uri(), test_fetcher(), Some(source), &options)
        .await
        .expect("run should succeed");

    let names: Vec<&str> = insights.competitors.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Rival One", "Rival Two", "Rival Three", "Rival Four"],
        "the dead candidate is dropped, order preserved"
    );
    let nested = insights.competitors[0]
        .insights
        .as_ref()
        .expect("reduced-run insights attached");
    assert_eq!(nested.brand_name, "Rival Soap");
    assert_eq!(nested.total_products, 1);
}

#[tokio::test]
async fn repeated_runs_produce_the_same_fingerprint() {
    let server = MockServer::start().await;
    mount_storefront_pages(&server).await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&catalog_page(&[1, 2])))
        .mount(&server)
        .await;

    let options = test_options();
    let (first, _) = run_insights(&server.uri(), test_fetcher(), None, &options)
        .await
        .expect("first run");
    let (second, _) = run_insights(&server.uri(), test_fetcher(), None, &options)
        .await
        .expect("second run");

    assert_ne!(first.scraped_at, second.scraped_at);
    assert_eq!(
        first.fingerprint(),
        second.fingerprint(),
        "aggregate must be identical apart from the snapshot timestamp"
    );
}
