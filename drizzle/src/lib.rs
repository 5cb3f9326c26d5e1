#![doc = include_str!("../README.md")]

pub mod check;
pub mod metrics;
pub mod report;
pub mod scenario;

pub(crate) mod runner;

pub use check::check;
pub use metrics::{counter, rate, ErrorMeter};
pub use report::RunReport;
pub use scenario::Scenario;

pub mod prelude {
    pub use crate::check::check;
    pub use crate::metrics::{counter, rate, ErrorMeter};
    pub use crate::report::RunReport;
    pub use crate::scenario::{ConfigurableScenario, Scenario, ScenarioError};
}
