use futures::executor::block_on;
use futures::future::LocalBoxFuture;
use pengguna_explorer::cache::UserCache;
use pengguna_explorer::clock::Clock;
use pengguna_explorer::config::{CACHE_KEY, CACHE_TIMESTAMP_KEY};
use pengguna_explorer::fetch::Offload;
use pengguna_explorer::source::PageSource;
use pengguna_explorer::storage::{KeyValueStore, MemoryStore};
use pengguna_explorer::{
    FetchError, FetchPlan, LoadError, Origin, Strategy, User, UserLoader,
};
use rstest::rstest;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

const TTL: u64 = 300_000;

/// Serves pages from a table and counts every request.
#[derive(Default)]
struct ScriptedPages {
    pages: RefCell<HashMap<u32, Result<Vec<User>, FetchError>>>,
    calls: Cell<usize>,
    /// Runs on every request, while the load is in flight.
    on_fetch: RefCell<Option<Box<dyn Fn()>>>,
}

impl ScriptedPages {
    fn standard() -> Rc<Self> {
        let source = Self::default();
        for page in 1..=3u32 {
            let first = (page - 1) * 50 + 1;
            let users = (first..first + 50).map(|id| User(json!({ "id": id }))).collect();
            source.pages.borrow_mut().insert(page, Ok(users));
        }
        Rc::new(source)
    }

    fn fail(&self, page: u32, err: FetchError) {
        self.pages.borrow_mut().insert(page, Err(err));
    }

    fn on_fetch(&self, f: impl Fn() + 'static) {
        *self.on_fetch.borrow_mut() = Some(Box::new(f));
    }
}

impl PageSource for ScriptedPages {
    fn fetch_page(&self, page: u32) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>> {
        self.calls.set(self.calls.get() + 1);
        if let Some(f) = self.on_fetch.borrow().as_ref() {
            f();
        }
        let result = self
            .pages
            .borrow()
            .get(&page)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)));
        Box::pin(futures::future::ready(result))
    }
}

/// Stands in for the web worker by fetching from the same scripted pages.
struct InlineOffload {
    pages: Rc<ScriptedPages>,
    fail_with: Option<FetchError>,
    runs: Rc<Cell<usize>>,
}

impl Offload for InlineOffload {
    fn run(&self, plan: FetchPlan) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>> {
        self.runs.set(self.runs.get() + 1);
        Box::pin(async move {
            if let Some(err) = self.fail_with.clone() {
                return Err(err);
            }
            pengguna_explorer::fetch::fetch_all(&self.pages, &plan.pages)
                .await
                .map_err(|e| FetchError::Worker(e.to_string()))
        })
    }
}

#[derive(Clone)]
struct ManualClock {
    epoch: Rc<Cell<u64>>,
    precise: Rc<Cell<f64>>,
}

impl ManualClock {
    fn at(epoch: u64) -> Self {
        Self {
            epoch: Rc::new(Cell::new(epoch)),
            precise: Rc::new(Cell::new(0.0)),
        }
    }

    fn advance(&self, ms: u64) {
        self.epoch.set(self.epoch.get() + ms);
    }
}

impl Clock for ManualClock {
    fn epoch_ms(&self) -> u64 {
        self.epoch.get()
    }

    // Each reading moves forward 12.5 ms so a load measures exactly that.
    fn precise_ms(&self) -> f64 {
        let now = self.precise.get();
        self.precise.set(now + 12.5);
        now
    }
}

type TestLoader = UserLoader<Rc<ScriptedPages>, Rc<MemoryStore>, ManualClock, InlineOffload>;

struct Harness {
    pages: Rc<ScriptedPages>,
    store: Rc<MemoryStore>,
    clock: ManualClock,
    worker_runs: Rc<Cell<usize>>,
    loader: TestLoader,
}

fn harness() -> Harness {
    harness_with(ScriptedPages::standard(), None)
}

fn harness_with(pages: Rc<ScriptedPages>, worker_error: Option<FetchError>) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = Rc::new(MemoryStore::new());
    let clock = ManualClock::at(1_700_000_000_000);
    let worker_runs = Rc::new(Cell::new(0));
    let offload = InlineOffload {
        pages: pages.clone(),
        fail_with: worker_error,
        runs: worker_runs.clone(),
    };
    let loader = UserLoader::new(
        pages.clone(),
        offload,
        store.clone(),
        clock.clone(),
        FetchPlan::default(),
    );
    Harness {
        pages,
        store,
        clock,
        worker_runs,
        loader,
    }
}

fn ids(users: &[User]) -> Vec<u64> {
    users
        .iter()
        .map(|u| u.0["id"].as_u64().unwrap())
        .collect()
}

#[test]
fn all_merges_pages_in_ascending_order() {
    let h = harness();
    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert_eq!(ids(&outcome.users), (1..=150).collect::<Vec<_>>());
    assert_eq!(h.pages.calls.get(), 3);
    assert!(matches!(
        outcome.origin,
        Origin::Network { ref dropped_pages, .. } if dropped_pages.is_empty()
    ));
}

#[rstest]
#[case(Strategy::All)]
#[case(Strategy::AllSettled)]
#[case(Strategy::Worker)]
fn every_strategy_yields_the_same_collection(#[case] strategy: Strategy) {
    let h = harness();
    let outcome = block_on(h.loader.load(strategy)).unwrap();
    assert_eq!(outcome.strategy, strategy);
    assert_eq!(outcome.users.len(), 150);
    assert_eq!(ids(&outcome.users), (1..=150).collect::<Vec<_>>());
}

#[test]
fn all_surfaces_the_failing_page() {
    let pages = ScriptedPages::standard();
    pages.fail(2, FetchError::Status(500));
    let h = harness_with(pages, None);

    let err = block_on(h.loader.load(Strategy::All)).unwrap_err();
    assert_eq!(
        err,
        LoadError::Page {
            page: 2,
            source: FetchError::Status(500)
        }
    );
    assert_eq!(h.store.get(CACHE_KEY), None);
    assert_eq!(h.loader.timings().get(Strategy::All), None);
}

#[test]
fn all_settled_reports_and_skips_the_failing_page() {
    let pages = ScriptedPages::standard();
    pages.fail(2, FetchError::Network("connection refused".into()));
    let h = harness_with(pages, None);

    let outcome = block_on(h.loader.load(Strategy::AllSettled)).unwrap();
    let expected: Vec<u64> = (1..=50).chain(101..=150).collect();
    assert_eq!(ids(&outcome.users), expected);
    match outcome.origin {
        Origin::Network { dropped_pages, .. } => assert_eq!(dropped_pages, vec![2]),
        other => panic!("expected network origin, got {:?}", other),
    }
    // partial results are shown but never cached
    assert_eq!(h.store.get(CACHE_KEY), None);
}

#[test]
fn reload_within_ttl_is_served_from_cache() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    h.clock.advance(TTL - 1);

    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert_eq!(h.pages.calls.get(), 3);
    assert_eq!(outcome.users.len(), 150);
    assert_eq!(
        outcome.origin,
        Origin::Cache {
            age_ms: TTL - 1,
            populated_by: Some(Strategy::All)
        }
    );
}

#[test]
fn reload_after_ttl_fetches_again() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    h.clock.advance(TTL);

    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert_eq!(h.pages.calls.get(), 6);
    assert!(matches!(outcome.origin, Origin::Network { .. }));
}

#[test]
fn refresh_always_fetches() {
    let h = harness();
    block_on(h.loader.load(Strategy::AllSettled)).unwrap();
    block_on(h.loader.refresh(Strategy::AllSettled)).unwrap();
    assert_eq!(h.pages.calls.get(), 6);
}

#[test]
fn strategies_share_one_cache_slot() {
    let h = harness();
    block_on(h.loader.load(Strategy::AllSettled)).unwrap();

    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert_eq!(h.pages.calls.get(), 3);
    assert_eq!(
        outcome.origin,
        Origin::Cache {
            age_ms: 0,
            populated_by: Some(Strategy::AllSettled)
        }
    );
}

#[test]
fn worker_respects_ttl() {
    let h = harness();
    block_on(h.loader.load(Strategy::Worker)).unwrap();
    assert_eq!(h.worker_runs.get(), 1);

    block_on(h.loader.load(Strategy::Worker)).unwrap();
    assert_eq!(h.worker_runs.get(), 1);

    h.clock.advance(TTL);
    block_on(h.loader.load(Strategy::Worker)).unwrap();
    assert_eq!(h.worker_runs.get(), 2);
}

#[test]
fn worker_failure_is_reported() {
    let h = harness_with(
        ScriptedPages::standard(),
        Some(FetchError::Timeout { ms: 15_000 }),
    );
    let err = block_on(h.loader.load(Strategy::Worker)).unwrap_err();
    assert_eq!(err, LoadError::Offload(FetchError::Timeout { ms: 15_000 }));
    assert_eq!(h.store.get(CACHE_KEY), None);
}

#[test]
fn torn_cache_write_is_refetched() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    h.store.remove(CACHE_TIMESTAMP_KEY);

    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert!(matches!(outcome.origin, Origin::Network { .. }));
    assert_eq!(h.pages.calls.get(), 6);
}

#[test]
fn timings_are_recorded_per_strategy_and_persisted() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    block_on(h.loader.refresh(Strategy::Worker)).unwrap();

    let timings = h.loader.timings();
    assert_eq!(timings.get(Strategy::All), Some("12.50"));
    assert_eq!(timings.get(Strategy::Worker), Some("12.50"));
    assert_eq!(timings.get(Strategy::AllSettled), None);
    assert_eq!(h.store.get("waktuAll").as_deref(), Some("12.50"));
    assert_eq!(h.store.get("waktuWorker").as_deref(), Some("12.50"));
}

#[test]
fn cache_hits_leave_timings_untouched() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    block_on(h.loader.load(Strategy::AllSettled)).unwrap();
    assert_eq!(h.loader.timings().get(Strategy::AllSettled), None);
}

#[test]
fn cache_written_by_loader_is_readable_directly() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    let cache = UserCache::new(h.store.clone());
    match cache.lookup(h.clock.epoch_ms()) {
        pengguna_explorer::cache::CacheLookup::Fresh(entry) => {
            assert_eq!(entry.users.len(), 150);
            assert_eq!(entry.strategy, Some(Strategy::All));
        }
        other => panic!("expected fresh entry, got {:?}", other),
    }
}

#[test]
fn cache_array_entry_from_another_writer_is_served() {
    let h = harness();
    let now = h.clock.epoch_ms();
    h.store.set(CACHE_KEY, r#"[{"id":9}]"#).unwrap();
    h.store.set(CACHE_TIMESTAMP_KEY, &now.to_string()).unwrap();

    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert_eq!(h.pages.calls.get(), 0);
    assert_eq!(ids(&outcome.users), vec![9]);
    assert_eq!(
        outcome.origin,
        Origin::Cache {
            age_ms: 0,
            populated_by: None
        }
    );
}

#[test]
fn loader_writes_the_cache_as_a_json_array() {
    let h = harness();
    block_on(h.loader.load(Strategy::All)).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&h.store.get(CACHE_KEY).unwrap()).unwrap();
    assert_eq!(raw.as_array().map(Vec::len), Some(150));
    assert_eq!(
        h.store.get(CACHE_TIMESTAMP_KEY),
        Some(h.clock.epoch_ms().to_string())
    );
}

#[test]
fn slow_load_does_not_overwrite_a_newer_entry() {
    let h = harness();
    let started = h.clock.epoch_ms();
    let store = h.store.clone();
    h.pages.on_fetch(move || {
        let newer = [User(json!({ "id": 999 }))];
        UserCache::new(store.clone())
            .store(&newer, Strategy::AllSettled, started + 10)
            .unwrap();
    });

    let outcome = block_on(h.loader.load(Strategy::All)).unwrap();
    assert_eq!(outcome.users.len(), 150);
    assert_eq!(
        h.store.get(CACHE_TIMESTAMP_KEY),
        Some((started + 10).to_string())
    );
    match UserCache::new(h.store.clone()).lookup(started + 10) {
        pengguna_explorer::cache::CacheLookup::Fresh(entry) => {
            assert_eq!(ids(&entry.users), vec![999]);
            assert_eq!(entry.strategy, Some(Strategy::AllSettled));
        }
        other => panic!("expected fresh entry, got {:?}", other),
    }
}
