//! Scenario configuration and entry point.
use crate::report::RunReport;
use crate::runner::run_scenario;
use std::{
    future::Future,
    num::NonZeroU32,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

#[doc(hidden)]
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub name: String,
    pub users: usize,
    pub duration: Option<Duration>,
    pub iterations: Option<u64>,
    pub tps: Option<NonZeroU32>,
}

impl ScenarioConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            users: 1,
            duration: None,
            iterations: None,
            tps: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario {scenario} has no stop condition; set .duration() and/or .iterations()")]
    MissingStopCondition { scenario: String },
    #[error("scenario {scenario} is configured with zero virtual users")]
    NoUsers { scenario: String },
}

/// A load-test scenario: an async function plus run configuration.
///
/// The wrapped function is invoked with no arguments, repeatedly and
/// concurrently across the configured virtual users, and returns nothing;
/// outcomes are recorded through checks and metrics, never raised. Awaiting
/// the `Scenario` runs it to completion and yields the [`RunReport`].
#[pin_project::pin_project]
pub struct Scenario<T> {
    func: T,
    runner_fut: Option<Pin<Box<dyn Future<Output = Result<RunReport, ScenarioError>> + Send>>>,
    config: ScenarioConfig,
}

impl<T> Scenario<T> {
    pub fn new(name: &str, func: T) -> Self {
        Self {
            func,
            runner_fut: None,
            config: ScenarioConfig::new(name),
        }
    }
}

impl<T, F> Future for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    type Output = Result<RunReport, ScenarioError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if this.runner_fut.is_none() {
            let func = this.func.clone();
            let config = this.config.clone();
            *this.runner_fut = Some(Box::pin(run_scenario(func, config)));
        }

        match this.runner_fut {
            Some(runner) => runner.as_mut().poll(cx),
            None => unreachable!(),
        }
    }
}

pub trait ConfigurableScenario<T: Send>: Future<Output = T> + Sized + Send {
    fn users(self, users: usize) -> Self;
    fn duration(self, duration: Duration) -> Self;
    fn iterations(self, iterations: u64) -> Self;
    fn tps(self, tps: NonZeroU32) -> Self;
}

impl<T, F> ConfigurableScenario<Result<RunReport, ScenarioError>> for Scenario<T>
where
    T: Fn() -> F + Send + 'static + Clone + Sync,
    F: Future<Output = ()> + Send + 'static,
{
    /// Number of concurrent virtual users. Defaults to 1.
    fn users(mut self, users: usize) -> Self {
        self.config.users = users;
        self
    }

    /// Stop the run after this much wall-clock time. Virtual users are
    /// cancelled at their next await point once the deadline passes.
    fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = Some(duration);
        self
    }

    /// Stop the run after this many total iterations, shared across all
    /// virtual users. Exact: the scenario function is invoked precisely this
    /// many times (barring a panicking user or an expired `.duration()`).
    fn iterations(mut self, iterations: u64) -> Self {
        self.config.iterations = Some(iterations);
        self
    }

    /// Global iteration rate limit across all users. No ramping; the limit
    /// is fixed for the whole run.
    fn tps(mut self, tps: NonZeroU32) -> Self {
        self.config.tps = Some(tps);
        self
    }
}
