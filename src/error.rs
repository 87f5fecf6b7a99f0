//! Error types shared by the loader, the storage layer and the worker.

use thiserror::Error;

/// Failure of a single page request, or of the worker handoff.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("timed out after {ms} ms")]
    Timeout { ms: u32 },
    #[error("worker closed before replying")]
    WorkerClosed,
    #[error("worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("browser storage is unavailable")]
    Unavailable,
    #[error("failed to write key '{0}'")]
    Write(String),
    #[error("failed to encode value: {0}")]
    Encode(String),
}

/// Why a load produced no collection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// All-or-nothing batch aborted by the first failing page.
    #[error("page {page} failed: {source}")]
    Page { page: u32, source: FetchError },
    /// Partial-tolerance batch where every page failed.
    #[error("all {attempted} pages failed")]
    NoPages { attempted: usize },
    #[error("background worker: {0}")]
    Offload(FetchError),
}
