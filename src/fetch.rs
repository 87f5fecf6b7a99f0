//! Fetch orchestration: cache lookup, the three fan-out strategies, timing and
//! cache write-back.
//!
//! # Strategies
//! - [`Strategy::All`]: every page must succeed. The first failure aborts
//!   the batch and drops the requests still in flight.
//! - [`Strategy::AllSettled`]: wait for every page and keep the ones that
//!   succeeded, in page order. Dropped pages are reported to the caller.
//! - [`Strategy::Worker`]: hand the [`FetchPlan`] to an [`Offload`] (a web
//!   worker in the browser) which runs the all-or-nothing fan-out off the
//!   main thread.
//!
//! All strategies share one cache slot and the same TTL check. Only complete
//! collections are written back; a partial `AllSettled` result is returned
//! but not cached. A load never overwrites an entry stamped after it started.

use futures::future::{join_all, try_join_all, LocalBoxFuture};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

use crate::cache::{CacheLookup, UserCache};
use crate::clock::Clock;
use crate::config::{API_BASE_URL, PAGES, PAGE_SIZE, REQUEST_TIMEOUT_MS};
use crate::error::{FetchError, LoadError};
use crate::model::{Strategy, User};
use crate::source::{HttpPageSource, PageSource};
use crate::storage::KeyValueStore;
use crate::timing::TimingBoard;

/// Everything needed to fetch the collection; also the worker's request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchPlan {
    pub base_url: String,
    pub page_size: u32,
    pub pages: Vec<u32>,
    pub request_timeout_ms: u32,
}

impl Default for FetchPlan {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            page_size: PAGE_SIZE,
            pages: PAGES.to_vec(),
            request_timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }
}

impl FetchPlan {
    pub fn http_source(&self) -> HttpPageSource {
        HttpPageSource::new(self.base_url.clone(), self.page_size, self.request_timeout_ms)
    }
}

/// Runs a whole [`FetchPlan`] somewhere other than the calling thread.
pub trait Offload {
    fn run(&self, plan: FetchPlan) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>>;
}

/// Result of a partial-tolerance fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    pub users: Vec<User>,
    pub dropped_pages: Vec<u32>,
}

/// Fetch every page concurrently; fail on the first page that fails.
pub async fn fetch_all<S>(source: &S, pages: &[u32]) -> Result<Vec<User>, LoadError>
where
    S: PageSource + ?Sized,
{
    let requests = pages.iter().map(|&page| async move {
        source
            .fetch_page(page)
            .await
            .map_err(|err| LoadError::Page { page, source: err })
    });
    let batches = try_join_all(requests).await?;
    Ok(batches.into_iter().flatten().collect())
}

/// Fetch every page concurrently and keep whichever succeed.
pub async fn fetch_all_settled<S>(source: &S, pages: &[u32]) -> Result<PageBatch, LoadError>
where
    S: PageSource + ?Sized,
{
    let results = join_all(pages.iter().map(|&page| source.fetch_page(page))).await;

    let mut users = Vec::new();
    let mut dropped_pages = Vec::new();
    for (&page, result) in pages.iter().zip(results) {
        match result {
            Ok(batch) => users.extend(batch),
            Err(e) => {
                warn!("Page {} dropped: {}", page, e);
                dropped_pages.push(page);
            }
        }
    }

    if !pages.is_empty() && dropped_pages.len() == pages.len() {
        return Err(LoadError::NoPages {
            attempted: pages.len(),
        });
    }
    Ok(PageBatch {
        users,
        dropped_pages,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Origin {
    Cache {
        age_ms: u64,
        populated_by: Option<Strategy>,
    },
    Network {
        elapsed_ms: f64,
        dropped_pages: Vec<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub strategy: Strategy,
    pub users: Vec<User>,
    pub origin: Origin,
}

/// Produces the merged user collection for a strategy.
pub struct UserLoader<S, K, C, W> {
    source: S,
    offload: W,
    store: K,
    cache: UserCache<K>,
    clock: C,
    plan: FetchPlan,
    timings: RefCell<TimingBoard>,
}

impl<S, K, C, W> UserLoader<S, K, C, W>
where
    S: PageSource,
    K: KeyValueStore + Clone,
    C: Clock,
    W: Offload,
{
    pub fn new(source: S, offload: W, store: K, clock: C, plan: FetchPlan) -> Self {
        let timings = RefCell::new(TimingBoard::load(&store));
        Self {
            source,
            offload,
            cache: UserCache::new(store.clone()),
            store,
            clock,
            plan,
            timings,
        }
    }

    pub fn timings(&self) -> TimingBoard {
        self.timings.borrow().clone()
    }

    pub async fn load(&self, strategy: Strategy) -> Result<LoadOutcome, LoadError> {
        let now = self.clock.epoch_ms();
        match self.cache.lookup(now) {
            CacheLookup::Fresh(entry) => {
                info!(
                    "Serving {} cached users (fetched via {:?})",
                    entry.users.len(),
                    entry.strategy
                );
                return Ok(LoadOutcome {
                    strategy,
                    origin: Origin::Cache {
                        age_ms: now - entry.saved_at,
                        populated_by: entry.strategy,
                    },
                    users: entry.users,
                });
            }
            CacheLookup::Expired { age_ms } => debug!("Cache expired ({} ms old)", age_ms),
            CacheLookup::Torn => warn!("Discarding inconsistent cache entry"),
            CacheLookup::Missing => debug!("Cache empty"),
        }

        info!("Fetching pages {:?} using {}", self.plan.pages, strategy);
        let started = self.clock.precise_ms();
        let (users, dropped_pages) = match strategy {
            Strategy::All => (fetch_all(&self.source, &self.plan.pages).await?, Vec::new()),
            Strategy::AllSettled => {
                let batch = fetch_all_settled(&self.source, &self.plan.pages).await?;
                (batch.users, batch.dropped_pages)
            }
            Strategy::Worker => {
                let users = self
                    .offload
                    .run(self.plan.clone())
                    .await
                    .map_err(LoadError::Offload)?;
                (users, Vec::new())
            }
        };
        let elapsed_ms = self.clock.precise_ms() - started;

        self.timings
            .borrow_mut()
            .record(&self.store, strategy, elapsed_ms);

        if dropped_pages.is_empty() {
            match self.cache.store(&users, strategy, now) {
                Ok(true) => debug!("Cached {} users", users.len()),
                Ok(false) => debug!("Cache already holds a newer collection"),
                Err(e) => warn!("Could not cache users: {}", e),
            }
        } else {
            info!(
                "Not caching partial result (pages {:?} missing)",
                dropped_pages
            );
        }

        info!(
            "Loaded {} users via {} in {:.2} ms",
            users.len(),
            strategy,
            elapsed_ms
        );
        Ok(LoadOutcome {
            strategy,
            users,
            origin: Origin::Network {
                elapsed_ms,
                dropped_pages,
            },
        })
    }

    /// Drop the cached collection and load again from the network.
    pub async fn refresh(&self, strategy: Strategy) -> Result<LoadOutcome, LoadError> {
        self.cache.invalidate();
        self.load(strategy).await
    }
}
