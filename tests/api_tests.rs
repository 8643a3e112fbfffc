//! End-to-end tests for the forecast endpoint

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode},
};
use chrono::{Duration, NaiveDate};
use http_body_util::BodyExt;
use tower::ServiceExt;

use culex::{
    CulexError, ForecastKey, ForecastProvider, ProviderHandle, WeatherForecast,
    api::{ApiForecast, AppState},
    grain::{GrainDirectory, GrainReference, ProviderOptions},
    source::{ForecastSource, StaticForecastSource},
    web,
};

struct FixedProvider(Vec<WeatherForecast>);

#[async_trait]
impl ForecastProvider for FixedProvider {
    async fn get_forecast(&self) -> culex::Result<Vec<WeatherForecast>> {
        Ok(self.0.clone())
    }
}

struct UnreachableProvider;

#[async_trait]
impl ForecastProvider for UnreachableProvider {
    async fn get_forecast(&self) -> culex::Result<Vec<WeatherForecast>> {
        Err(CulexError::forwarding("provider is unreachable"))
    }
}

/// Every call returns a batch of five records stamped with the call number.
struct BatchProvider {
    calls: AtomicI32,
}

#[async_trait]
impl ForecastProvider for BatchProvider {
    async fn get_forecast(&self) -> culex::Result<Vec<WeatherForecast>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut batch = Vec::new();
        for day in 0..5 {
            // give other requests a chance to run mid-batch
            tokio::task::yield_now().await;
            batch.push(WeatherForecast::new(
                start + Duration::days(day),
                call,
                Some(format!("batch-{call}")),
            ));
        }
        Ok(batch)
    }
}

/// Panics on its first call, like a provider with a latent bug.
struct PanickingSource;

impl ForecastSource for PanickingSource {
    fn forecasts(&mut self) -> culex::Result<Vec<WeatherForecast>> {
        panic!("forecast source crashed");
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn test_single_forecast_body() {
    let app = web::app(AppState::new(FixedProvider(vec![WeatherForecast::new(
        date(2024, 1, 1),
        0,
        Some("Freezing".to_string()),
    )])));

    let (status, body) = get(app, "/weatherforecast").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        std::str::from_utf8(&body).unwrap(),
        r#"[{"date":"2024-01-01","temperatureC":0,"temperatureF":32,"summary":"Freezing"}]"#
    );
}

#[tokio::test]
async fn test_response_preserves_provider_order() {
    let forecasts = vec![
        WeatherForecast::new(date(2024, 1, 3), 30, Some("Hot".to_string())),
        WeatherForecast::new(date(2024, 1, 1), -10, None),
        WeatherForecast::new(date(2024, 1, 2), 100, Some("Scorching".to_string())),
    ];
    let app = web::app(AppState::new(FixedProvider(forecasts.clone())));

    let (status, body) = get(app, "/weatherforecast").await;
    assert_eq!(status, StatusCode::OK);

    let received: Vec<ApiForecast> = serde_json::from_slice(&body).unwrap();
    let expected: Vec<ApiForecast> = forecasts.iter().map(ApiForecast::from).collect();
    assert_eq!(received, expected);
    assert_eq!(received[2].temperature_f, 211);
}

#[tokio::test]
async fn test_empty_provider_returns_empty_array() {
    let app = web::app(AppState::new(FixedProvider(Vec::new())));

    let (status, body) = get(app, "/weatherforecast").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn test_controller_route_casing() {
    let app = web::app(AppState::new(FixedProvider(vec![WeatherForecast::new(
        date(2024, 1, 1),
        0,
        None,
    )])));

    let (status, _) = get(app.clone(), "/WeatherForecast").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(app, "/forecasts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_provider_is_server_error() {
    let app = web::app(AppState::new(UnreachableProvider));

    let (status, body) = get(app, "/weatherforecast").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_forwards_to_provider_actor() {
    let forecasts = vec![
        WeatherForecast::new(date(2024, 1, 1), 0, Some("Freezing".to_string())),
        WeatherForecast::new(date(2024, 1, 2), 12, None),
    ];
    let handle = ProviderHandle::spawn(
        ForecastKey::EMPTY,
        StaticForecastSource::new(forecasts.clone()),
        ProviderOptions::default(),
    );
    let app = web::app(AppState::new(handle));

    let (status, body) = get(app, "/weatherforecast").await;
    assert_eq!(status, StatusCode::OK);

    let parsed: Vec<WeatherForecast> = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed, forecasts);
}

#[tokio::test]
async fn test_stopped_provider_actor_is_server_error() {
    let handle = ProviderHandle::spawn(
        ForecastKey::EMPTY,
        StaticForecastSource::new(vec![WeatherForecast::new(date(2024, 1, 1), 0, None)]),
        ProviderOptions::default(),
    );
    handle.shutdown().await;
    let app = web::app(AppState::new(handle));

    let (status, body) = get(app, "/weatherforecast").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_get_whole_batches() {
    let app = web::app(AppState::new(BatchProvider {
        calls: AtomicI32::new(0),
    }));

    let requests = (0..100).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { get(app, "/weatherforecast").await })
    });
    let responses = futures::future::join_all(requests).await;

    let mut seen = HashSet::new();
    for response in responses {
        let (status, body) = response.unwrap();
        assert_eq!(status, StatusCode::OK);

        let batch: Vec<ApiForecast> = serde_json::from_slice(&body).unwrap();
        assert_eq!(batch.len(), 5);

        let call = batch[0].temperature_c;
        for (day, forecast) in batch.iter().enumerate() {
            assert_eq!(forecast.temperature_c, call);
            assert_eq!(forecast.summary.as_deref(), Some(format!("batch-{call}").as_str()));
            assert_eq!(forecast.date, date(2024, 1, 1) + Duration::days(day as i64));
        }
        assert!(seen.insert(call), "batch {call} was served twice");
    }
    assert_eq!(seen.len(), 100);
}

#[tokio::test]
async fn test_wire_round_trip_rederives_fahrenheit() {
    let app = web::app(AppState::new(FixedProvider(vec![
        WeatherForecast::new(date(2024, 7, 14), 37, Some("Sweltering".to_string())),
        WeatherForecast::new(date(2024, 7, 15), -1, None),
    ])));

    let (_, body) = get(app, "/weatherforecast").await;
    let sent: Vec<ApiForecast> = serde_json::from_slice(&body).unwrap();
    let parsed: Vec<WeatherForecast> = serde_json::from_slice(&body).unwrap();

    for (wire, record) in sent.iter().zip(&parsed) {
        assert_eq!(record.date, wire.date);
        assert_eq!(record.temperature_c, wire.temperature_c);
        assert_eq!(record.summary, wire.summary);
        assert_eq!(record.temperature_f(), wire.temperature_f);
    }
    assert_eq!(sent[0].temperature_f, 98);
    assert_eq!(sent[1].temperature_f, 31);
}

#[tokio::test]
async fn test_extreme_temperatures_are_served() {
    let handle = ProviderHandle::spawn(
        ForecastKey::EMPTY,
        StaticForecastSource::new(vec![
            WeatherForecast::new(date(2024, 1, 1), 2_000_000_000, None),
            WeatherForecast::new(date(2024, 1, 2), i32::MIN, None),
        ]),
        ProviderOptions::default(),
    );
    let app = web::app(AppState::new(handle));

    let (status, body) = get(app, "/weatherforecast").await;
    assert_eq!(status, StatusCode::OK);

    let received: Vec<ApiForecast> = serde_json::from_slice(&body).unwrap();
    assert_eq!(received[0].temperature_f, i32::MAX);
    assert_eq!(received[1].temperature_f, i32::MIN);
}

#[tokio::test]
async fn test_crashed_provider_is_reactivated() {
    let activations = Arc::new(AtomicUsize::new(0));
    let directory = Arc::new(GrainDirectory::new(ProviderOptions::default(), {
        let activations = activations.clone();
        move |_key| -> Box<dyn ForecastSource> {
            if activations.fetch_add(1, Ordering::SeqCst) == 0 {
                Box::new(PanickingSource)
            } else {
                Box::new(StaticForecastSource::new(vec![WeatherForecast::new(
                    date(2024, 1, 1),
                    0,
                    Some("Freezing".to_string()),
                )]))
            }
        }
    }));
    let app = web::app(AppState::new(GrainReference::new(
        directory.clone(),
        ForecastKey::EMPTY,
    )));

    let (status, body) = get(app.clone(), "/weatherforecast").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());

    for _ in 0..2 {
        let (status, body) = get(app.clone(), "/weatherforecast").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            r#"[{"date":"2024-01-01","temperatureC":0,"temperatureF":32,"summary":"Freezing"}]"#
        );
    }
    assert_eq!(activations.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_through_provider_actor() {
    let forecasts = vec![
        WeatherForecast::new(date(2024, 1, 1), 0, Some("Freezing".to_string())),
        WeatherForecast::new(date(2024, 1, 2), 12, None),
        WeatherForecast::new(date(2024, 1, 3), 25, Some("Warm".to_string())),
    ];
    // more requests than mailbox slots, so some callers wait for room
    let handle = ProviderHandle::spawn(
        ForecastKey::EMPTY,
        StaticForecastSource::new(forecasts.clone()),
        ProviderOptions::default(),
    );
    let app = web::app(AppState::new(handle));
    let expected: Vec<ApiForecast> = forecasts.iter().map(ApiForecast::from).collect();

    let requests = (0..100).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { get(app, "/weatherforecast").await })
    });
    let responses = futures::future::join_all(requests).await;

    assert_eq!(responses.len(), 100);
    for response in responses {
        let (status, body) = response.unwrap();
        assert_eq!(status, StatusCode::OK);
        let received: Vec<ApiForecast> = serde_json::from_slice(&body).unwrap();
        assert_eq!(received, expected);
    }
}
