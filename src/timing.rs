//! Elapsed-time readouts, one per strategy, persisted across reloads.

use log::warn;
use std::collections::HashMap;

use crate::model::Strategy;
use crate::storage::KeyValueStore;
use crate::utils::format_elapsed_ms;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingBoard {
    readings: HashMap<Strategy, String>,
}

impl TimingBoard {
    /// Read whatever timings a previous session left behind.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let readings = Strategy::ALL
            .iter()
            .filter_map(|&s| store.get(s.timing_key()).map(|v| (s, v)))
            .collect();
        Self { readings }
    }

    pub fn get(&self, strategy: Strategy) -> Option<&str> {
        self.readings.get(&strategy).map(String::as_str)
    }

    /// Overwrite the reading for `strategy` in memory and in `store`.
    pub fn record(&mut self, store: &impl KeyValueStore, strategy: Strategy, elapsed_ms: f64) {
        let value = format_elapsed_ms(elapsed_ms);
        if let Err(e) = store.set(strategy.timing_key(), &value) {
            warn!("Could not persist {} timing: {}", strategy, e);
        }
        self.readings.insert(strategy, value);
    }
}
