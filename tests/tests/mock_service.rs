mod utils;
#[allow(unused)]
use utils::*;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ntest::timeout(60_000)]
async fn rainy_day_returns_200_with_a_raincoat() -> Result<()> {
    init();
    let addr = serve(mock_service::router()).await;

    let res = reqwest::get(format!("http://{addr}/dora-the-explorer?is_rainy_day=true")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "raincoat packed for the rainy day");
    Ok(())
}

#[tokio::test]
#[ntest::timeout(60_000)]
async fn sunny_day_is_still_a_200() -> Result<()> {
    init();
    let addr = serve(mock_service::router()).await;

    let res = reqwest::get(format!("http://{addr}/dora-the-explorer?is_rainy_day=false")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "sunny day, travel light");
    Ok(())
}

#[tokio::test]
#[ntest::timeout(60_000)]
async fn missing_weather_param_is_rejected() -> Result<()> {
    init();
    let addr = serve(mock_service::router()).await;

    let res = reqwest::get(format!("http://{addr}/dora-the-explorer")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
#[ntest::timeout(60_000)]
async fn flaky_route_fails_every_nth_hit() -> Result<()> {
    init();
    let addr = serve(mock_service::router()).await;

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let res =
            reqwest::get(format!("http://{addr}/flaky/5/dora-the-explorer?is_rainy_day=true"))
                .await?;
        statuses.push(res.status());
    }

    let failures = statuses
        .iter()
        .filter(|s| **s == StatusCode::INTERNAL_SERVER_ERROR)
        .count();
    assert_eq!(failures, 1);
    assert_eq!(statuses[4], StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
