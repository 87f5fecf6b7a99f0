//! Wall-clock and high-resolution time sources.

/// `epoch_ms` stamps cache entries; `precise_ms` measures elapsed time.
pub trait Clock {
    fn epoch_ms(&self) -> u64;
    fn precise_ms(&self) -> f64;
}

/// Browser clock on wasm (`Date.now()` / `performance.now()`), system time
/// elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn precise_ms(&self) -> f64 {
        gloo_utils::window()
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn precise_ms(&self) -> f64 {
        use std::sync::OnceLock;
        use std::time::Instant;
        static ORIGIN: OnceLock<Instant> = OnceLock::new();
        ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}
