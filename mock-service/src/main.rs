use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_service=debug,tower_http=debug".into()),
        )
        .init();

    let addr: SocketAddr = "0.0.0.0:1323".parse().unwrap();
    info!("mock service listening on {addr}");
    mock_service::run(addr).await;
}
