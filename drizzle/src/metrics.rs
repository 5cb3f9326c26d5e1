//! Run-wide metric accumulators.
//!
//! Metrics are interned by name in a process-wide [`Registry`] and live for
//! the entire run; handles are cheap to clone and safe to update from any
//! number of concurrent virtual users. Every update is mirrored to the
//! `metrics` facade (under a snake_case key) so an installed exporter sees
//! the same series live.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// A monotonically increasing count, reported at run end.
pub struct Counter {
    name: String,
    key: String,
    value: AtomicU64,
}

impl Counter {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: facade_key(name),
            value: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        ::metrics::counter!(self.key.clone()).increment(n);
    }

    /// Adds 1 when `hit` is true, 0 otherwise. One facade update either way,
    /// so the series' update count matches the invocation count.
    pub fn increment_if(&self, hit: bool) {
        self.add(hit as u64);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A boolean-sample accumulator; reports the fraction of samples that were
/// true over the run.
pub struct Rate {
    name: String,
    key: String,
    hits: AtomicU64,
    total: AtomicU64,
}

impl Rate {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            key: facade_key(name),
            hits: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&self, sample: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if sample {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        #[cfg(feature = "metrics")]
        {
            ::metrics::counter!(format!("{}_total", self.key)).increment(1);
            ::metrics::counter!(format!("{}_hits", self.key)).increment(sample as u64);
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

/// A paired error counter and error rate fed by a single outcome.
///
/// Both series must never diverge in update count, so the pairing is
/// structural: `record` is the only way to feed them. The two updates are
/// plain atomic stores with no await point in between, so a virtual user
/// cancelled mid-iteration can never tear them apart.
#[derive(Clone)]
pub struct ErrorMeter {
    counter: Arc<Counter>,
    rate: Arc<Rate>,
}

impl ErrorMeter {
    pub fn new(counter_name: &str, rate_name: &str) -> Self {
        Self {
            counter: counter(counter_name),
            rate: rate(rate_name),
        }
    }

    /// Records one iteration outcome: +1 on the counter when `failed`, and a
    /// `failed` sample on the rate either way.
    pub fn record(&self, failed: bool) {
        self.counter.increment_if(failed);
        self.rate.add(failed);
    }

    pub fn errors(&self) -> u64 {
        self.counter.value()
    }

    pub fn samples(&self) -> u64 {
        self.rate.total()
    }

    pub fn error_rate(&self) -> f64 {
        self.rate.fraction()
    }
}

/// Process-wide metric registry. Metrics are interned by name: asking twice
/// for the same name returns the same accumulator.
#[derive(Default)]
pub struct Registry {
    counters: Mutex<Vec<Arc<Counter>>>,
    rates: Mutex<Vec<Arc<Rate>>>,
    checks: Mutex<Vec<Arc<Rate>>>,
}

impl Registry {
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::default)
    }

    pub fn counter(&self, name: &str) -> Arc<Counter> {
        let mut counters = self.counters.lock().unwrap();
        if let Some(counter) = counters.iter().find(|c| c.name == name) {
            return counter.clone();
        }
        let counter = Arc::new(Counter::new(name));
        counters.push(counter.clone());
        counter
    }

    pub fn rate(&self, name: &str) -> Arc<Rate> {
        let mut rates = self.rates.lock().unwrap();
        if let Some(rate) = rates.iter().find(|r| r.name == name) {
            return rate.clone();
        }
        let rate = Arc::new(Rate::new(name));
        rates.push(rate.clone());
        rate
    }

    /// Checks are pass-rates kept in their own namespace so the report can
    /// list them apart from user metrics.
    pub(crate) fn check(&self, name: &str) -> Arc<Rate> {
        let mut checks = self.checks.lock().unwrap();
        if let Some(check) = checks.iter().find(|c| c.name == name) {
            return check.clone();
        }
        let check = Arc::new(Rate::new(name));
        checks.push(check.clone());
        check
    }

    /// Registration-order snapshot handles, for reporting.
    pub fn counters(&self) -> Vec<Arc<Counter>> {
        self.counters.lock().unwrap().clone()
    }

    pub fn rates(&self) -> Vec<Arc<Rate>> {
        self.rates.lock().unwrap().clone()
    }

    pub fn checks(&self) -> Vec<Arc<Rate>> {
        self.checks.lock().unwrap().clone()
    }
}

/// Returns the process-wide counter with the given name, creating it on
/// first use.
pub fn counter(name: &str) -> Arc<Counter> {
    Registry::global().counter(name)
}

/// Returns the process-wide rate with the given name, creating it on first
/// use.
pub fn rate(name: &str) -> Arc<Rate> {
    Registry::global().rate(name)
}

// Facade exporters dislike spaces in keys; "Error HTTP Rate" becomes
// "error_http_rate".
fn facade_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
