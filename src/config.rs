//! Application-level configuration constants.

use log::LevelFilter;

// API
pub const API_BASE_URL: &str = "http://localhost:3000/api/pengguna";
pub const PAGE_SIZE: u32 = 50;
pub const PAGES: [u32; 3] = [1, 2, 3];

// Timeouts
pub const REQUEST_TIMEOUT_MS: u32 = 10_000;
pub const WORKER_TIMEOUT_MS: u32 = 15_000;
pub const WORKER_SCRIPT: &str = "worker.js";

// Cache
pub const CACHE_TTL_MS: u64 = 300_000;
pub const CACHE_KEY: &str = "penggunaCache";
pub const CACHE_TIMESTAMP_KEY: &str = "cacheTimestamp";
pub const CACHE_STRATEGY_KEY: &str = "cacheStrategy";

// Timing readouts, one key per strategy
pub const TIMING_KEY_ALL: &str = "waktuAll";
pub const TIMING_KEY_ALL_SETTLED: &str = "waktuAllSettled";
pub const TIMING_KEY_WORKER: &str = "waktuWorker";

// Logging
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;
