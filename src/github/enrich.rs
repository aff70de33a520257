//! Detail enrichment of search results.
//!
//! Search results lack diff statistics, so each one costs a second lookup.
//! Lookups run concurrently with a bounded number in flight and are paired
//! back with their summary by position. The batch is all-or-nothing: the
//! first failure is returned and every outstanding lookup is dropped.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::debug;

use super::classify::classify;
use super::error::SearchError;
use super::models::{DetailRecord, EnrichedRecord, SummaryRecord};
use super::transport::Transport;

/// Default number of detail lookups in flight.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Upper bound on lookups in flight; one full search page.
pub const MAX_CONCURRENCY: usize = 100;

/// Fetches detail records for search results.
pub struct DetailEnricher {
    transport: Arc<dyn Transport>,
    concurrency: usize,
}

impl DetailEnricher {
    /// Creates an enricher allowing `concurrency` lookups in flight.
    ///
    /// The value is clamped to `1..=MAX_CONCURRENCY`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, concurrency: usize) -> Self {
        Self {
            transport,
            concurrency: concurrency.clamp(1, MAX_CONCURRENCY),
        }
    }

    /// Effective concurrency bound.
    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Pairs every summary with its detail record, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedRecord`] when a summary has no usable
    /// detail locator (before any lookup is issued) or a detail body cannot
    /// be decoded, and the classified transport failure of the first lookup
    /// that fails.
    pub async fn enrich(
        &self,
        summaries: Vec<SummaryRecord>,
    ) -> Result<Vec<EnrichedRecord>, SearchError> {
        let routes = summaries
            .iter()
            .map(SummaryRecord::detail_route)
            .collect::<Result<Vec<_>, _>>()?;

        let mut details: Vec<Option<DetailRecord>> = vec![None; summaries.len()];
        let mut pending = routes.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        for (index, route) in pending.by_ref().take(self.concurrency) {
            in_flight.push(fetch_detail(Arc::clone(&self.transport), index, route));
        }

        while let Some(outcome) = in_flight.next().await {
            let (index, detail) = outcome?;
            if let Some(slot) = details.get_mut(index) {
                *slot = Some(detail);
            }
            if let Some((next_index, next_route)) = pending.next() {
                in_flight.push(fetch_detail(
                    Arc::clone(&self.transport),
                    next_index,
                    next_route,
                ));
            }
        }

        debug!(count = summaries.len(), "detail records fetched");

        summaries
            .into_iter()
            .zip(details)
            .map(|(summary, fetched)| {
                let number = summary.number;
                fetched
                    .map(|detail| EnrichedRecord { summary, detail })
                    .ok_or_else(|| SearchError::malformed(format!("no detail record for #{number}")))
            })
            .collect()
    }
}

async fn fetch_detail(
    transport: Arc<dyn Transport>,
    index: usize,
    route: String,
) -> Result<(usize, DetailRecord), SearchError> {
    let body = transport
        .get(&route, &[])
        .await
        .map_err(|error| classify(&error))?;
    let detail = serde_json::from_value(body)
        .map_err(|error| SearchError::malformed(format!("detail record {route}: {error}")))?;
    Ok((index, detail))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use http::StatusCode;
    use mockall::predicate::{always, eq};
    use rstest::rstest;
    use serde_json::Value;

    use super::{DetailEnricher, MAX_CONCURRENCY};
    use crate::github::error::SearchError;
    use crate::github::models::SummaryRecord;
    use crate::github::models::test_support::{
        detail_json, detail_route, issue_summary_json, summary_json,
    };
    use crate::github::transport::{MockTransport, QueryParams, Transport, TransportError};

    const CREATED: &str = "2024-03-01T10:00:00Z";

    fn summaries(numbers: &[u64]) -> Vec<SummaryRecord> {
        numbers
            .iter()
            .map(|number| {
                serde_json::from_value(summary_json(*number, "open", CREATED))
                    .expect("summary should decode")
            })
            .collect()
    }

    /// Serves detail bodies after a per-route delay and records the peak
    /// number of concurrent requests.
    struct DelayedTransport {
        delays: HashMap<String, Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl DelayedTransport {
        fn new(delays: impl IntoIterator<Item = (u64, u64)>) -> Self {
            Self {
                delays: delays
                    .into_iter()
                    .map(|(number, millis)| (detail_route(number), Duration::from_millis(millis)))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for DelayedTransport {
        async fn get(&self, route: &str, _params: &QueryParams) -> Result<Value, TransportError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(current, Ordering::SeqCst);
            let delay = self.delays.get(route).copied().unwrap_or_default();
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let number: u64 = route
                .rsplit('/')
                .next()
                .and_then(|segment| segment.parse().ok())
                .expect("route should end in a number");
            Ok(detail_json(number * 10, number))
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn preserves_input_order_when_lookups_finish_out_of_order() {
        let transport = Arc::new(DelayedTransport::new([(1, 300), (2, 100), (3, 200)]));
        let enricher = DetailEnricher::new(transport, 10);

        let enriched = enricher
            .enrich(summaries(&[1, 2, 3]))
            .await
            .expect("enrichment should succeed");

        let pairs: Vec<(u64, u64)> = enriched
            .iter()
            .map(|record| (record.summary.number, record.detail.additions))
            .collect();
        assert_eq!(pairs, vec![(1, 10), (2, 20), (3, 30)]);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn never_exceeds_concurrency_bound() {
        let numbers: Vec<u64> = (1..=12).collect();
        let transport = Arc::new(DelayedTransport::new(
            numbers.iter().map(|number| (*number, 50 + number * 7)),
        ));
        let enricher = DetailEnricher::new(Arc::clone(&transport) as Arc<dyn Transport>, 3);

        let enriched = enricher
            .enrich(summaries(&numbers))
            .await
            .expect("enrichment should succeed");

        assert_eq!(enriched.len(), 12);
        assert_eq!(transport.peak.load(Ordering::SeqCst), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let transport = MockTransport::new();
        let enricher = DetailEnricher::new(Arc::new(transport), 10);

        let enriched = enricher
            .enrich(Vec::new())
            .await
            .expect("enrichment should succeed");

        assert!(enriched.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn first_failure_aborts_the_batch() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .with(eq(detail_route(1)), always())
            .times(1)
            .returning(|_, _| {
                Err(TransportError::Http {
                    status: StatusCode::NOT_FOUND,
                    message: "Not Found".to_owned(),
                    documentation_url: None,
                })
            });
        let enricher = DetailEnricher::new(Arc::new(transport), 1);

        let result = enricher.enrich(summaries(&[1, 2, 3])).await;

        assert_eq!(
            result,
            Err(SearchError::RemoteService {
                status: 404,
                message: "Not Found".to_owned()
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn missing_locator_fails_before_any_lookup() {
        let transport = MockTransport::new();
        let enricher = DetailEnricher::new(Arc::new(transport), 10);
        let mut records = summaries(&[1]);
        records.push(
            serde_json::from_value(issue_summary_json(2, CREATED)).expect("summary should decode"),
        );

        let result = enricher.enrich(records).await;

        assert!(matches!(result, Err(SearchError::MalformedRecord { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn undecodable_detail_is_malformed() {
        let mut transport = MockTransport::new();
        transport
            .expect_get()
            .returning(|_, _| Ok(serde_json::json!({ "additions": "many" })));
        let enricher = DetailEnricher::new(Arc::new(transport), 10);

        let result = enricher.enrich(summaries(&[1])).await;

        assert!(matches!(result, Err(SearchError::MalformedRecord { .. })));
    }

    #[rstest]
    #[case::zero(0, 1)]
    #[case::typical(10, 10)]
    #[case::above_page_size(1000, MAX_CONCURRENCY)]
    fn clamps_concurrency(#[case] requested: usize, #[case] expected: usize) {
        let enricher = DetailEnricher::new(Arc::new(MockTransport::new()), requested);
        assert_eq!(enricher.concurrency(), expected);
    }
}
