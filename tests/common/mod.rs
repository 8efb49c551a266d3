#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use users_cache::application::services::{Aggregator, DatasetSettings, UsersService};
use users_cache::domain::entities::{RawLocation, RawLogin, RawName, RawPage, RawUser};
use users_cache::domain::{FetchError, PageFetcher};
use users_cache::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use users_cache::state::AppState;

/// Page source that synthesizes users and fails on chosen page indices.
#[derive(Default)]
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    failing_pages: HashSet<usize>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pages: &[usize]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failing_pages: pages.iter().copied().collect(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn raw_user(page_index: usize, i: usize) -> RawUser {
    RawUser {
        gender: if i % 2 == 0 { "female" } else { "male" }.to_string(),
        name: RawName {
            first: format!("First{page_index}"),
            last: format!("Last{i}"),
        },
        email: format!("p{page_index}u{i}@example.com"),
        location: RawLocation {
            city: "Porto".to_string(),
            country: "Portugal".to_string(),
        },
        login: RawLogin {
            uuid: format!("{page_index}-{i}"),
        },
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, page_size: usize, page_index: usize) -> Result<RawPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_pages.contains(&page_index) {
            return Err(FetchError::UpstreamStatus(500));
        }

        Ok(RawPage {
            results: (0..page_size).map(|i| raw_user(page_index, i)).collect(),
        })
    }
}

/// In-memory cache with switchable failures.
#[derive(Default)]
pub struct FlakyCache {
    inner: MemoryCache,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub sets: AtomicUsize,
}

impl FlakyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_get() -> Self {
        let cache = Self::default();
        cache.fail_get.store(true, Ordering::SeqCst);
        cache
    }

    pub fn failing_set() -> Self {
        let cache = Self::default();
        cache.fail_set.store(true, Ordering::SeqCst);
        cache
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheService for FlakyCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError("connection refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionError("broken pipe".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> bool {
        !self.fail_get.load(Ordering::SeqCst)
    }
}

pub fn settings(total_records: usize, per_page: usize, single_flight: bool) -> DatasetSettings {
    DatasetSettings {
        cache_key: "users".to_string(),
        total_records,
        per_page,
        concurrency: 4,
        single_flight,
    }
}

pub fn create_service(
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn CacheService>,
    settings: DatasetSettings,
) -> Arc<UsersService> {
    Arc::new(UsersService::new(cache, Aggregator::new(fetcher), settings))
}

pub fn create_test_state(
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn CacheService>,
    settings: DatasetSettings,
) -> AppState {
    let service = create_service(fetcher, cache.clone(), settings);
    AppState::new(service, cache)
}
