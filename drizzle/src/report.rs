//! End-of-run reporting.
use crate::metrics::Registry;
use crate::scenario::ScenarioConfig;
use std::fmt;
use std::time::Duration;

/// Snapshot of one run: iteration totals, latency quantiles, and the state
/// of every registered counter, rate, and check at run end.
pub struct RunReport {
    pub scenario: String,
    pub users: usize,
    pub elapsed: Duration,
    pub iterations: u64,
    pub latency_p50: Duration,
    pub latency_p90: Duration,
    pub latency_p99: Duration,
    pub counters: Vec<CounterSnapshot>,
    pub rates: Vec<RateSnapshot>,
    pub checks: Vec<CheckSnapshot>,
}

pub struct CounterSnapshot {
    pub name: String,
    pub value: u64,
}

pub struct RateSnapshot {
    pub name: String,
    pub hits: u64,
    pub total: u64,
}

impl RateSnapshot {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64
        }
    }
}

pub struct CheckSnapshot {
    pub name: String,
    pub passes: u64,
    pub total: u64,
}

impl RunReport {
    pub(crate) fn new(
        config: &ScenarioConfig,
        elapsed: Duration,
        iterations: u64,
        mut latencies: Vec<Duration>,
    ) -> Self {
        latencies.sort_unstable();
        let registry = Registry::global();

        Self {
            scenario: config.name.clone(),
            users: config.users,
            elapsed,
            iterations,
            latency_p50: quantile(&latencies, 0.50),
            latency_p90: quantile(&latencies, 0.90),
            latency_p99: quantile(&latencies, 0.99),
            counters: registry
                .counters()
                .iter()
                .map(|c| CounterSnapshot {
                    name: c.name().to_string(),
                    value: c.value(),
                })
                .collect(),
            rates: registry
                .rates()
                .iter()
                .map(|r| RateSnapshot {
                    name: r.name().to_string(),
                    hits: r.hits(),
                    total: r.total(),
                })
                .collect(),
            checks: registry
                .checks()
                .iter()
                .map(|c| CheckSnapshot {
                    name: c.name().to_string(),
                    passes: c.hits(),
                    total: c.total(),
                })
                .collect(),
        }
    }

    pub fn iterations_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.iterations as f64 / secs
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "scenario {:?}: {} iterations across {} users in {:.1?} ({:.2} iters/s)",
            self.scenario,
            self.iterations,
            self.users,
            self.elapsed,
            self.iterations_per_sec(),
        )?;
        writeln!(
            f,
            "latency: p50={:?} p90={:?} p99={:?}",
            self.latency_p50, self.latency_p90, self.latency_p99,
        )?;
        for check in &self.checks {
            writeln!(f, "check {:?}: {}/{} passed", check.name, check.passes, check.total)?;
        }
        for counter in &self.counters {
            writeln!(f, "{}: {}", counter.name, counter.value)?;
        }
        for rate in &self.rates {
            writeln!(
                f,
                "{}: {:.4} ({}/{})",
                rate.name,
                rate.fraction(),
                rate.hits,
                rate.total,
            )?;
        }
        Ok(())
    }
}

// Nearest-rank on the sorted samples; exact, since the report is one-shot.
fn quantile(sorted: &[Duration], q: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}
