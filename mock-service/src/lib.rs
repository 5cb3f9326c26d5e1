//! Stand-in for the external service the dora-the-explorer scenario targets.
//!
//! Serves `GET /dora-the-explorer` on the port the scenario expects (1323),
//! plus a flaky variant for exercising the error path.
use axum::{
    debug_handler,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub async fn run(addr: SocketAddr) {
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, router()).await.unwrap();
}

pub fn router() -> Router {
    Router::new()
        .route("/dora-the-explorer", get(dora_the_explorer))
        .route("/flaky/:fail_every/dora-the-explorer", get(flaky))
        .layer(TraceLayer::new_for_http())
}

#[derive(Deserialize)]
pub struct Weather {
    is_rainy_day: bool,
}

/// Always 200. Missing or malformed `is_rainy_day` rejects with 400 before
/// the handler runs.
#[debug_handler]
pub async fn dora_the_explorer(Query(weather): Query<Weather>) -> Json<Value> {
    counter!("mock-service.requests").increment(1);

    if weather.is_rainy_day {
        check_raincoat_stock().await;
        pack_raincoat().await;
        Json(json!({ "message": "raincoat packed for the rainy day" }))
    } else {
        Json(json!({ "message": "sunny day, travel light" }))
    }
}

/// Returns 500 on every Nth hit, 200 otherwise. `fail_every = 0` never
/// fails.
#[debug_handler]
pub async fn flaky(
    Path(fail_every): Path<u64>,
    Query(weather): Query<Weather>,
) -> Result<Json<Value>, StatusCode> {
    counter!("mock-service.requests").increment(1);

    let hit = FLAKY_HITS.fetch_add(1, Ordering::Relaxed) + 1;
    if fail_every != 0 && hit % fail_every == 0 {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if weather.is_rainy_day {
        check_raincoat_stock().await;
        pack_raincoat().await;
    }
    Ok(Json(json!({ "message": "raincoat packed for the rainy day" })))
}

static FLAKY_HITS: AtomicU64 = AtomicU64::new(0);

// The real service fronts a raincoat supplier; these stand in for its two
// downstream calls.
async fn check_raincoat_stock() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn pack_raincoat() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}
