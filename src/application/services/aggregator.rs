//! Concurrent page fan-out and record aggregation.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::entities::{RecordSet, normalize};
use crate::domain::page_fetcher::PageFetcher;

/// Outcome of one aggregation cycle.
///
/// `records` holds everything that could be fetched; `pages_failed` tells how
/// many pages were dropped on the way. A degraded cycle is not an error.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub records: RecordSet,
    pub pages_requested: usize,
    pub pages_failed: usize,
}

impl AggregateReport {
    pub fn pages_succeeded(&self) -> usize {
        self.pages_requested - self.pages_failed
    }

    pub fn is_degraded(&self) -> bool {
        self.pages_failed > 0
    }
}

/// Fans page fetches out across tokio tasks and flattens the results.
///
/// Every page task is spawned up front. A semaphore sized by `concurrency`
/// limits how many of them talk to the upstream at once.
pub struct Aggregator {
    fetcher: Arc<dyn PageFetcher>,
}

impl Aggregator {
    /// Creates a new aggregator over the given page source.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches `total_records / per_page` pages and returns their normalized records.
    ///
    /// # Semantics
    ///
    /// - The page count uses integer division; a remainder is not fetched
    /// - Page indices run from 1 through the page count
    /// - A page that fails (or whose task panics) contributes no records and
    ///   is counted in [`AggregateReport::pages_failed`]
    /// - Returns once every spawned task has finished
    /// - Records of one page keep upstream order; pages appear in completion order
    pub async fn aggregate_all(
        &self,
        total_records: usize,
        per_page: usize,
        concurrency: usize,
    ) -> AggregateReport {
        let pages = total_records.checked_div(per_page).unwrap_or(0);
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));

        debug!(pages, per_page, concurrency, "Launching page fetches");

        let mut tasks = JoinSet::new();
        for page_index in 1..=pages {
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only waits.
                let _permit = permits.acquire_owned().await.ok();
                (page_index, fetcher.fetch(per_page, page_index).await)
            });
        }

        let mut records = RecordSet::new();
        let mut pages_failed = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(page))) => {
                    records.extend(page.results.into_iter().map(normalize));
                }
                Ok((page_index, Err(e))) => {
                    pages_failed += 1;
                    warn!(page = page_index, error = %e, "Dropping upstream page");
                }
                Err(e) => {
                    pages_failed += 1;
                    warn!(error = %e, "Page task did not complete; dropping page");
                }
            }
        }

        metrics::counter!("users.pages.fetched").increment((pages - pages_failed) as u64);
        metrics::counter!("users.pages.failed").increment(pages_failed as u64);

        let report = AggregateReport {
            records,
            pages_requested: pages,
            pages_failed,
        };

        if report.is_degraded() {
            warn!(
                pages_failed,
                pages_requested = pages,
                records = report.records.len(),
                "Aggregation finished with missing pages"
            );
        } else {
            info!(
                pages_requested = pages,
                records = report.records.len(),
                "Aggregation finished"
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RawLogin, RawName, RawPage, RawUser};
    use crate::domain::page_fetcher::{FetchError, MockPageFetcher};
    use async_trait::async_trait;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    fn page_of(size: usize, page_index: usize) -> RawPage {
        RawPage {
            results: (0..size)
                .map(|i| RawUser {
                    gender: "female".to_string(),
                    name: RawName {
                        first: format!("P{page_index}"),
                        last: format!("N{i}"),
                    },
                    login: RawLogin {
                        uuid: format!("{page_index}-{i}"),
                    },
                    ..RawUser::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_aggregate_all_pages_succeed() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|size, index| Ok(page_of(size, index)));

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(8, 4, 4).await;

        assert_eq!(report.pages_requested, 2);
        assert_eq!(report.pages_failed, 0);
        assert_eq!(report.records.len(), 8);
        assert!(!report.is_degraded());
    }

    #[tokio::test]
    async fn test_aggregate_requests_each_page_index_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|size, _| *size == 5)
            .times(4)
            .returning(move |size, index| {
                seen_clone.lock().unwrap().push(index);
                Ok(page_of(size, index))
            });

        let aggregator = Aggregator::new(Arc::new(fetcher));
        let report = aggregator.aggregate_all(20, 5, 2).await;

        let mut indices = seen.lock().unwrap().clone();
        indices.sort_unstable();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        assert_eq!(report.records.len(), 20);
    }

    #[tokio::test]
    async fn test_aggregate_drops_remainder() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(3)
            .returning(|size, index| Ok(page_of(size, index)));

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(10, 3, 4).await;

        assert_eq!(report.pages_requested, 3);
        assert_eq!(report.records.len(), 9);
    }

    #[tokio::test]
    async fn test_aggregate_one_failed_page_is_omitted() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(4).returning(|size, index| {
            if index == 3 {
                Err(FetchError::UpstreamStatus(503))
            } else {
                Ok(page_of(size, index))
            }
        });

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(40, 10, 4).await;

        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.pages_succeeded(), 3);
        assert_eq!(report.records.len(), 30);
        assert!(report.records.iter().all(|r| r.first_name != "P3"));
    }

    #[tokio::test]
    async fn test_aggregate_all_pages_fail_yields_empty_set() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(3)
            .returning(|_, _| Err(FetchError::Transport("connection refused".to_string())));

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(9, 3, 1).await;

        assert!(report.records.is_empty());
        assert_eq!(report.pages_failed, 3);
    }

    #[tokio::test]
    async fn test_aggregate_preserves_order_within_page() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|size, index| Ok(page_of(size, index)));

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(6, 6, 1).await;

        let last_names: Vec<&str> = report.records.iter().map(|r| r.last_name.as_str()).collect();
        assert_eq!(last_names, vec!["N0", "N1", "N2", "N3", "N4", "N5"]);
    }

    #[tokio::test]
    async fn test_aggregate_zero_per_page_fetches_nothing() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(0);

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(10, 0, 4).await;

        assert_eq!(report.pages_requested, 0);
        assert!(report.records.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_huge_page_size_does_not_preallocate() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|_, _| Ok(RawPage::default()));

        let aggregator = Aggregator::new(Arc::new(fetcher));

        let report = aggregator.aggregate_all(usize::MAX, usize::MAX / 2, 2).await;

        assert_eq!(report.pages_requested, 2);
        assert_eq!(report.pages_failed, 0);
        assert!(report.records.is_empty());
    }

    #[derive(Default)]
    struct CountingRecorder {
        counters: Mutex<HashMap<String, Arc<AtomicU64>>>,
    }

    impl CountingRecorder {
        fn value(&self, name: &str) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .get(name)
                .map_or(0, |c| c.load(Ordering::SeqCst))
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let counter = self
                .counters
                .lock()
                .unwrap()
                .entry(key.name().to_string())
                .or_default()
                .clone();
            Counter::from_arc(counter)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_aggregate_records_page_counters() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(3).returning(|size, index| {
            if index == 2 {
                Err(FetchError::UpstreamStatus(500))
            } else {
                Ok(page_of(size, index))
            }
        });
        let aggregator = Aggregator::new(Arc::new(fetcher));
        let recorder = CountingRecorder::default();

        // Current-thread runtime keeps every task on the thread holding the local recorder.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let report = metrics::with_local_recorder(&recorder, || {
            runtime.block_on(aggregator.aggregate_all(6, 2, 2))
        });

        assert_eq!(report.pages_failed, 1);
        assert_eq!(recorder.value("users.pages.fetched"), 2);
        assert_eq!(recorder.value("users.pages.failed"), 1);
    }

    struct PanicOnPage(usize);

    #[async_trait]
    impl PageFetcher for PanicOnPage {
        async fn fetch(&self, page_size: usize, page_index: usize) -> Result<RawPage, FetchError> {
            if page_index == self.0 {
                panic!("fetcher blew up on page {page_index}");
            }
            Ok(page_of(page_size, page_index))
        }
    }

    #[tokio::test]
    async fn test_aggregate_survives_panicking_task() {
        let aggregator = Aggregator::new(Arc::new(PanicOnPage(2)));

        let report = aggregator.aggregate_all(6, 2, 3).await;

        assert_eq!(report.pages_failed, 1);
        assert_eq!(report.records.len(), 4);
    }

    struct InFlightProbe {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for InFlightProbe {
        async fn fetch(&self, page_size: usize, page_index: usize) -> Result<RawPage, FetchError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(page_of(page_size, page_index))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_aggregate_bounds_in_flight_fetches() {
        let probe = Arc::new(InFlightProbe {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });

        let aggregator = Aggregator::new(probe.clone());
        let report = aggregator.aggregate_all(40, 1, 2).await;

        assert_eq!(report.records.len(), 40);
        assert!(probe.peak.load(Ordering::SeqCst) <= 2);

        let uuids: HashSet<&str> = report.records.iter().map(|r| r.uuid.as_str()).collect();
        assert_eq!(uuids.len(), 40);
    }
}
