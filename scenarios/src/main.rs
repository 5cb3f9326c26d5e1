//! Load-test scenario for the dora-the-explorer endpoint.
//!
//! One GET against the local service, one status check, two error metrics.
//! Everything else (virtual users, stop conditions, reporting) is the
//! harness's job and is configured from the command line.
use anyhow::Result;
use clap::Parser;
use drizzle::prelude::*;
use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::{Client, StatusCode};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const TARGET_URL: &str = "http://localhost:1323/dora-the-explorer?is_rainy_day=true";

static CLIENT: OnceLock<Client> = OnceLock::new();

fn error_meter() -> &'static ErrorMeter {
    static METER: OnceLock<ErrorMeter> = OnceLock::new();
    METER.get_or_init(|| ErrorMeter::new("Error HTTP", "Error HTTP Rate"))
}

#[derive(Parser, Debug)]
#[command(about = "Load-tests GET /dora-the-explorer on the local service")]
struct Args {
    /// Concurrent virtual users
    #[arg(long, default_value_t = 10)]
    users: usize,

    /// Wall-clock run duration, e.g. "30s" or "5m"
    #[arg(long, value_parser = humantime::parse_duration, default_value = "30s")]
    duration: Duration,

    /// Total iteration budget shared across users; whichever of this and
    /// --duration hits first ends the run
    #[arg(long)]
    iterations: Option<u64>,

    /// Fixed global rate limit, in iterations per second
    #[arg(long)]
    tps: Option<NonZeroU32>,

    /// Per-request timeout
    #[arg(long, value_parser = humantime::parse_duration, default_value = "30s")]
    timeout: Duration,

    /// Serve Prometheus metrics on this address for the duration of the run
    #[arg(long)]
    prometheus: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if let Some(addr) = args.prometheus {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
    }

    let client = Client::builder().timeout(args.timeout).build()?;
    let _ = CLIENT.set(client);

    let mut scenario = Scenario::new("dora-the-explorer", dora_the_explorer)
        .users(args.users)
        .duration(args.duration);
    if let Some(iterations) = args.iterations {
        scenario = scenario.iterations(iterations);
    }
    if let Some(tps) = args.tps {
        scenario = scenario.tps(tps);
    }

    let report = scenario.await?;
    println!("{report}");

    Ok(())
}

/// One virtual-user iteration. Transport failures are not errors here, only
/// data: anything that prevents a 200 resolves the check to false.
async fn dora_the_explorer() {
    let client = CLIENT.get_or_init(Client::new);

    let status = match client.get(TARGET_URL).send().await {
        Ok(res) => Some(res.status()),
        Err(err) => {
            debug!("request failed: {err}");
            None
        }
    };

    let ok = check("status is 200", status == Some(StatusCode::OK));
    error_meter().record(!ok);
}
