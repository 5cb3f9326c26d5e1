//! The virtual-user loop.
use crate::report::RunReport;
use crate::scenario::{ScenarioConfig, ScenarioError};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics_util::AtomicBucket;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

#[tracing::instrument(name = "scenario", skip_all, fields(name = config.name))]
pub(crate) async fn run_scenario<T, F>(
    scenario: T,
    config: ScenarioConfig,
) -> Result<RunReport, ScenarioError>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = ()> + Send,
{
    if config.users == 0 {
        return Err(ScenarioError::NoUsers {
            scenario: config.name.clone(),
        });
    }
    if config.duration.is_none() && config.iterations.is_none() {
        return Err(ScenarioError::MissingStopCondition {
            scenario: config.name.clone(),
        });
    }

    info!("Running {} with config {:?}", config.name, &config);
    let shared = Arc::new(UserShared::new(&config));
    let start = Instant::now();

    let mut users = JoinSet::new();
    for _ in 0..config.users {
        let scenario = scenario.clone();
        let shared = shared.clone();
        users.spawn(async move {
            loop {
                if let Some(limiter) = &shared.limiter {
                    limiter.until_ready().await;
                }
                if !shared.claim_iteration() {
                    break;
                }
                let iter_start = Instant::now();
                scenario().await;
                shared.latency.push(iter_start.elapsed());
                shared.completed.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    if let Some(duration) = config.duration {
        if tokio::time::timeout(duration, drain(&mut users)).await.is_err() {
            debug!("Duration elapsed; stopping {} virtual users", config.users);
            users.abort_all();
            drain(&mut users).await;
        }
    } else {
        drain(&mut users).await;
    }

    let elapsed = start.elapsed();
    let iterations = shared.completed.load(Ordering::Relaxed);
    let mut latencies = Vec::new();
    shared.latency.clear_with(|durs| {
        latencies.extend_from_slice(durs);
    });

    info!("Scenario complete; {iterations} iterations in {elapsed:?}");
    Ok(RunReport::new(&config, elapsed, iterations, latencies))
}

/// Waits for every virtual user to finish. A panicking user takes down only
/// itself; its failure is logged and the rest of the run proceeds.
async fn drain(users: &mut JoinSet<()>) {
    while let Some(res) = users.join_next().await {
        if let Err(err) = res {
            if err.is_panic() {
                error!("Virtual user panicked: {err}");
            }
        }
    }
}

/// State shared by every virtual-user task in a run.
struct UserShared {
    limiter: Option<DefaultDirectRateLimiter>,
    budget: Option<u64>,
    claimed: AtomicU64,
    completed: AtomicU64,
    latency: AtomicBucket<Duration>,
}

impl UserShared {
    fn new(config: &ScenarioConfig) -> Self {
        Self {
            limiter: config.tps.map(rate_limiter),
            budget: config.iterations,
            claimed: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            latency: AtomicBucket::new(),
        }
    }

    /// Claims one iteration from the shared budget. Always succeeds on
    /// duration-only runs; cancellation handles the stop there.
    fn claim_iteration(&self) -> bool {
        match self.budget {
            Some(budget) => self.claimed.fetch_add(1, Ordering::Relaxed) < budget,
            None => true,
        }
    }
}

fn rate_limiter(tps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(tps).allow_burst(NonZeroU32::new(1).unwrap()))
}
