//! Web Worker agent that runs the all-or-nothing fan-out off the main thread,
//! and the main-thread handle that talks to it.

use futures::future::{select, Either, LocalBoxFuture};
use futures::sink::SinkExt;
use futures::{pin_mut, StreamExt};
use gloo_timers::future::TimeoutFuture;
use log::{info, warn};
use yew_agent::reactor::{reactor, ReactorScope};
use yew_agent::Spawnable;

use crate::error::FetchError;
use crate::fetch::{fetch_all, FetchPlan, Offload};
use crate::model::User;

/// Reply sent back to the main thread: the merged users as a JSON array, or
/// an error message. Users are opaque JSON, which the worker's binary codec
/// cannot carry directly, so they cross the boundary as text.
pub type WorkerReply = Result<String, String>;

/// Worker reactor that fetches and merges every page of a [`FetchPlan`].
#[reactor]
pub async fn PageFetchTask(mut scope: ReactorScope<FetchPlan, WorkerReply>) {
    while let Some(plan) = scope.next().await {
        let source = plan.http_source();
        let reply = match fetch_all(&source, &plan.pages).await {
            Ok(users) => serde_json::to_string(&users).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = &reply {
            warn!("Worker fetch failed: {}", e);
        }

        // abort loop if all bridges dropped
        if scope.send(reply).await.is_err() {
            break;
        }
    }
}

/// Spawns a fresh [`PageFetchTask`] worker for every run. Dropping the
/// bridge (on reply or timeout) terminates the worker.
#[derive(Debug, Clone)]
pub struct WorkerOffload {
    script: String,
    timeout_ms: u32,
}

impl WorkerOffload {
    pub fn new(script: impl Into<String>, timeout_ms: u32) -> Self {
        Self {
            script: script.into(),
            timeout_ms,
        }
    }
}

impl Offload for WorkerOffload {
    fn run(&self, plan: FetchPlan) -> LocalBoxFuture<'_, Result<Vec<User>, FetchError>> {
        Box::pin(async move {
            let mut bridge = <PageFetchTask as Spawnable>::spawner().spawn(&self.script);
            info!("Posting plan for {} pages to worker", plan.pages.len());
            bridge
                .send(plan)
                .await
                .map_err(|_| FetchError::WorkerClosed)?;

            let reply = bridge.next();
            let timeout = TimeoutFuture::new(self.timeout_ms);
            pin_mut!(reply, timeout);

            match select(reply, timeout).await {
                Either::Left((Some(Ok(payload)), _)) => serde_json::from_str(&payload)
                    .map_err(|e| FetchError::Decode(e.to_string())),
                Either::Left((Some(Err(message)), _)) => Err(FetchError::Worker(message)),
                Either::Left((None, _)) => Err(FetchError::WorkerClosed),
                Either::Right(_) => {
                    warn!("Worker gave no reply within {} ms", self.timeout_ms);
                    Err(FetchError::Timeout {
                        ms: self.timeout_ms,
                    })
                }
            }
        })
    }
}
