//! User records and fetch strategies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::config::{TIMING_KEY_ALL, TIMING_KEY_ALL_SETTLED, TIMING_KEY_WORKER};

/// One user as returned by the API. The shape is not enforced; the helpers
/// only read well-known fields when they happen to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(pub Value);

impl User {
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        ["nama", "name"]
            .iter()
            .find_map(|field| self.0.get(*field).and_then(Value::as_str))
    }

    pub fn age(&self) -> Option<u64> {
        ["umur", "age"]
            .iter()
            .find_map(|field| self.0.get(*field).and_then(Value::as_u64))
    }
}

impl From<Value> for User {
    fn from(value: Value) -> Self {
        User(value)
    }
}

/// Concurrency approach used to fetch and merge the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Every page must succeed.
    All,
    /// Keep whichever pages succeed.
    AllSettled,
    /// Fetch off the main thread in a web worker.
    Worker,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::All, Strategy::AllSettled, Strategy::Worker];

    /// Storage key holding the last elapsed time for this strategy.
    pub fn timing_key(self) -> &'static str {
        match self {
            Strategy::All => TIMING_KEY_ALL,
            Strategy::AllSettled => TIMING_KEY_ALL_SETTLED,
            Strategy::Worker => TIMING_KEY_WORKER,
        }
    }

    /// Inverse of the `Display` label ("all", "allSettled", "worker").
    pub fn from_label(label: &str) -> Option<Strategy> {
        Strategy::ALL.into_iter().find(|s| s.to_string() == label.trim())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::All => write!(f, "all"),
            Strategy::AllSettled => write!(f, "allSettled"),
            Strategy::Worker => write!(f, "worker"),
        }
    }
}
