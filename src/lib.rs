//! Fetches three pages of users, merges them, caches the result for five
//! minutes and compares how long each fetch strategy takes.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod explorer;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod source;
pub mod storage;
pub mod timing;
pub mod utils;
pub mod worker_agent;

use std::rc::Rc;

pub use error::{FetchError, LoadError, StorageError};
pub use fetch::{FetchPlan, LoadOutcome, Origin, UserLoader};
pub use model::{Strategy, User};

use clock::SystemClock;
use config::{WORKER_SCRIPT, WORKER_TIMEOUT_MS};
use source::HttpPageSource;
use storage::KeyValueStore;
use worker_agent::WorkerOffload;

/// Loader wired to the browser: HTTP pages, `localStorage`, the page clock and
/// a web worker.
pub type BrowserLoader =
    UserLoader<HttpPageSource, Rc<dyn KeyValueStore>, SystemClock, WorkerOffload>;

pub fn browser_loader() -> BrowserLoader {
    let plan = FetchPlan::default();
    UserLoader::new(
        plan.http_source(),
        WorkerOffload::new(WORKER_SCRIPT, WORKER_TIMEOUT_MS),
        storage::browser_store(),
        SystemClock,
        plan,
    )
}
