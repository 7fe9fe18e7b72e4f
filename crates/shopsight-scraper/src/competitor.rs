//! Competitor candidate sourcing and probing.

use std::future::Future;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use shopsight_core::{Competitor, Product};
use tokio::time::Instant;

use crate::error::ExtractError;
use crate::urlnorm;

/// A competitor lead before probing: name, bare domain, optional blurb.
#[derive(Debug, Clone)]
pub struct CompetitorCandidate {
    pub name: String,
    pub domain: String,
    pub description: Option<String>,
}

/// The consumed competitor-lookup capability. Absent a configured source,
/// discovery is skipped entirely.
#[async_trait]
pub trait CompetitorSource: Send + Sync {
    /// Candidate competitor domains for a brand in a category.
    ///
    /// # Errors
    ///
    /// [`ExtractError::CompetitorLookupFailed`] when the backend cannot
    /// answer; the orchestrator absorbs it and skips discovery.
    async fn candidates(
        &self,
        brand: &str,
        category: Option<&str>,
    ) -> Result<Vec<CompetitorCandidate>, ExtractError>;
}

/// The most frequent product category in the catalog, first-seen on ties.
#[must_use]
pub fn dominant_category(products: &[Product]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for product in products {
        let Some(category) = product.category.as_deref() else {
            continue;
        };
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category, 1)),
        }
    }
    // Strict comparison keeps the earlier category on ties.
    counts
        .into_iter()
        .reduce(|best, next| if next.1 > best.1 { next } else { best })
        .map(|(category, _)| category.to_owned())
}

/// Probes up to `max_candidates` candidates concurrently, dropping those
/// whose probe declines (failed validation) and truncating at `deadline`.
///
/// Candidates pointing back at `own_host` are discarded before probing.
/// Results come back in candidate order regardless of completion order.
pub async fn probe_candidates<F, Fut>(
    candidates: Vec<CompetitorCandidate>,
    own_host: &str,
    max_candidates: usize,
    fanout_width: usize,
    deadline: Instant,
    probe: F,
) -> Vec<Competitor>
where
    F: Fn(CompetitorCandidate) -> Fut,
    Fut: Future<Output = Option<Competitor>>,
{
    let eligible: Vec<CompetitorCandidate> = candidates
        .into_iter()
        .filter(|c| candidate_host(c).as_deref() != Some(own_host))
        .take(max_candidates)
        .collect();

    let mut in_flight = stream::iter(eligible.into_iter().enumerate())
        .map(|(index, candidate)| {
            let fut = probe(candidate);
            async move { (index, fut.await) }
        })
        .buffer_unordered(fanout_width.max(1));

    let sleep = tokio::time::sleep_until(deadline);
    tokio::pin!(sleep);

    let mut settled: Vec<(usize, Competitor)> = Vec::new();
    loop {
        tokio::select! {
            next = in_flight.next() => match next {
                Some((index, Some(competitor))) => settled.push((index, competitor)),
                Some((_, None)) => {}
                None => break,
            },
            () = &mut sleep => {
                tracing::warn!(
                    probed = settled.len(),
                    "run deadline reached; truncating competitor lookups"
                );
                break;
            }
        }
    }

    settled.sort_by_key(|(index, _)| *index);
    settled.into_iter().map(|(_, c)| c).collect()
}

/// Same-site host of a candidate's domain field, tolerating full URLs.
#[must_use]
pub fn candidate_host(candidate: &CompetitorCandidate) -> Option<String> {
    let domain = candidate.domain.trim();
    if domain.is_empty() {
        return None;
    }
    let with_scheme = if domain.contains("://") {
        domain.to_owned()
    } else {
        format!("https://{domain}")
    };
    urlnorm::site_host(&with_scheme)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn make_candidate(domain: &str) -> CompetitorCandidate {
        CompetitorCandidate {
            name: domain.to_owned(),
            domain: domain.to_owned(),
            description: None,
        }
    }

    fn make_product(category: Option<&str>) -> Product {
        Product {
            id: None,
            title: "x".to_owned(),
            description: None,
            price: None,
            currency: None,
            image_url: None,
            product_url: None,
            available: None,
            tags: Vec::new(),
            category: category.map(str::to_owned),
        }
    }

    #[test]
    fn dominant_category_counts_and_breaks_ties_first_seen() {
        let products = vec![
            make_product(Some("Soap")),
            make_product(Some("Candles")),
            make_product(Some("Candles")),
            make_product(None),
        ];
        assert_eq!(dominant_category(&products).as_deref(), Some("Candles"));

        let tied = vec![make_product(Some("Soap")), make_product(Some("Candles"))];
        assert_eq!(dominant_category(&tied).as_deref(), Some("Soap"));
        assert_eq!(dominant_category(&[]), None);
    }

    #[test]
    fn candidate_host_tolerates_urls_and_www() {
        assert_eq!(
            candidate_host(&make_candidate("www.rival.example")).as_deref(),
            Some("rival.example")
        );
        assert_eq!(
            candidate_host(&make_candidate("https://rival.example/shop")).as_deref(),
            Some("rival.example")
        );
        assert_eq!(candidate_host(&make_candidate("  ")), None);
    }

    #[tokio::test]
    async fn own_host_is_discarded_and_failures_are_silent() {
        let candidates = vec![
            make_candidate("shop.example"),
            make_candidate("rival-a.example"),
            make_candidate("rival-b.example"),
        ];
        let deadline = Instant::now() + Duration::from_secs(5);
        let competitors = probe_candidates(
            candidates,
            "shop.example",
            5,
            2,
            deadline,
            |candidate| async move {
                if candidate.domain.contains("rival-a") {
                    None
                } else {
                    Some(Competitor {
                        name: candidate.name,
                        website_url: format!("https://{}", candidate.domain),
                        description: None,
                        insights: None,
                    })
                }
            },
        )
        .await;

        assert_eq!(competitors.len(), 1);
        assert_eq!(competitors[0].website_url, "https://rival-b.example");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_truncates_remaining_probes() {
        let candidates = vec![make_candidate("slow-a.example"), make_candidate("slow-b.example")];
        let deadline = Instant::now() + Duration::from_millis(50);
        let competitors = probe_candidates(
            candidates,
            "shop.example",
            5,
            1,
            deadline,
            |candidate| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Some(Competitor {
                    name: candidate.name,
                    website_url: format!("https://{}", candidate.domain),
                    description: None,
                    insights: None,
                })
            },
        )
        .await;

        assert!(competitors.is_empty());
    }
}
