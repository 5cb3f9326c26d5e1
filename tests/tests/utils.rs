use axum::Router;
use drizzle::ErrorMeter;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::OnceLock;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();
    ONCE_LOCK.get_or_init(|| {
        FmtSubscriber::builder()
            .with_env_filter("drizzle=debug,mock_service=debug")
            .init();
    });
}

/// Serves the router on an ephemeral local port and returns the address.
#[allow(unused)]
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// The scenario shape under test: one GET, one status evaluation, one paired
/// metric update. Transport failures resolve to a failed outcome.
#[allow(unused)]
pub fn get_and_record(
    client: Client,
    url: String,
    meter: ErrorMeter,
) -> impl Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Clone + Send + Sync + 'static {
    move || {
        let client = client.clone();
        let url = url.clone();
        let meter = meter.clone();
        Box::pin(async move {
            let status = client.get(&url).send().await.ok().map(|res| res.status());
            meter.record(status != Some(StatusCode::OK));
        })
    }
}
