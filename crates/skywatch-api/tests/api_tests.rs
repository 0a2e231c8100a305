use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use chrono::{Duration, FixedOffset, Utc};
use tokio::sync::RwLock;
use tower::ServiceExt;

use skywatch_core::{CurrentConditions, ForecastSlot};
use skywatch_provider::{ScriptedProvider, WeatherProvider};
use skywatch_store::SubscriptionStore;

async fn scripted_app(
    provider: ScriptedProvider,
) -> (axum::Router, Arc<skywatch_api::ApiContext>, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(RwLock::new(SubscriptionStore::load(
        dir.path().join("subscriptions.json"),
    )));
    let provider: Arc<dyn WeatherProvider> = Arc::new(provider);
    let (app, ctx) = skywatch_api::build_app(store, provider);
    (app, ctx, dir)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_and_readiness() {
    let (app, ctx, _dir) = scripted_app(ScriptedProvider::new()).await;

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    skywatch_api::set_ready(&ctx, true);
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn subscription_lifecycle() {
    let provider = ScriptedProvider::new();
    provider
        .set_current(
            "berlin",
            CurrentConditions {
                description: "Clear".to_string(),
                temperature: 10.0,
                wind_speed: 5.0,
                observed_at: Utc::now().fixed_offset(),
                is_day: true,
            },
        )
        .await;
    let (app, _ctx, _dir) = scripted_app(provider).await;

    // Subscribe to a known city
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/subscriptions",
            serde_json::json!({"user_id": "42", "city": "Berlin"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["status"], "subscribed");

    // Subscribing again reports it without error
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/subscriptions",
            serde_json::json!({"user_id": "42", "city": "berlin"}),
        ))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["status"], "already subscribed");

    // Listed for the user
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/subscriptions/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["cities"], serde_json::json!(["berlin"]));

    // Unsubscribe, then a second attempt is a 404
    let res = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/v1/subscriptions",
            serde_json::json!({"user_id": "42", "city": "berlin"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_request(
            "DELETE",
            "/api/v1/subscriptions",
            serde_json::json!({"user_id": "42", "city": "berlin"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscribing_to_unknown_city_is_404() {
    let (app, _ctx, _dir) = scripted_app(ScriptedProvider::new()).await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/api/v1/subscriptions",
            serde_json::json!({"user_id": "42", "city": "Atlantis"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = body_json(res).await;
    assert!(body["error"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn current_weather_query() {
    let provider = ScriptedProvider::new();
    provider
        .set_current(
            "berlin",
            CurrentConditions {
                description: "Partly cloudy".to_string(),
                temperature: 12.5,
                wind_speed: 9.0,
                observed_at: Utc::now().fixed_offset(),
                is_day: true,
            },
        )
        .await;
    let (app, _ctx, _dir) = scripted_app(provider).await;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/weather/current?city=berlin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["description"], "Partly cloudy");
    assert_eq!(body["temperature"], 12.5);
    assert!(body["text"].as_str().unwrap().contains("Partly cloudy"));
}

#[tokio::test]
async fn hourly_outlook_query() {
    let provider = ScriptedProvider::new();
    let base = Utc::now().fixed_offset() + Duration::hours(1);
    let slots: Vec<ForecastSlot> = (0..12)
        .map(|h| ForecastSlot {
            date_time: (base + Duration::hours(h)).with_timezone(
                &FixedOffset::east_opt(0).unwrap(),
            ),
            description: Some("clear sky".to_string()),
            wind_speed: Some(5.0),
            temperature: Some(10.0),
        })
        .collect();
    provider.set_forecast("berlin", slots).await;
    let (app, _ctx, _dir) = scripted_app(provider).await;

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/weather/hourly?city=berlin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    // every third slot of the 12-hour outlook
    assert_eq!(body["entries"].as_array().unwrap().len(), 4);
}
