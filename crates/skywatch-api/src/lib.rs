//! HTTP command frontend
//!
//! Thin request/response shell over the subscription store and the
//! weather provider: weather queries, subscription management, health
//! and metrics. The monitoring engine is untouched by this surface —
//! it picks up store changes on its next cycle.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use skywatch_core::normalize;
use skywatch_notify::report;
use skywatch_provider::{ProviderError, WeatherProvider};
use skywatch_store::SubscriptionStore;

pub struct ApiContext {
    store: Arc<RwLock<SubscriptionStore>>,
    provider: Arc<dyn WeatherProvider>,
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    meter_provider: SdkMeterProvider,
    requests_total: Counter<u64>,
}

pub fn build_app(
    store: Arc<RwLock<SubscriptionStore>>,
    provider: Arc<dyn WeatherProvider>,
) -> (Router, Arc<ApiContext>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let meter_provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = meter_provider.meter("skywatch-api");

    let requests_total = meter
        .u64_counter("skywatch_requests_total")
        .with_description("Total HTTP requests served")
        .init();

    let ctx = Arc::new(ApiContext {
        store,
        provider,
        ready: AtomicBool::new(false),
        registry,
        meter_provider,
        requests_total,
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/weather/current", get(weather_current))
        .route("/api/v1/weather/hourly", get(weather_hourly))
        .route("/api/v1/weather/daily", get(weather_daily))
        .route("/api/v1/subscriptions/:user_id", get(list_subscriptions))
        .route("/api/v1/subscriptions", post(subscribe).delete(unsubscribe))
        .with_state(Arc::clone(&ctx));

    (router, ctx)
}

pub fn set_ready(ctx: &Arc<ApiContext>, is_ready: bool) {
    ctx.ready.store(is_ready, Ordering::Relaxed);
}

async fn healthz(State(ctx): State<Arc<ApiContext>>) -> StatusCode {
    ctx.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(ctx): State<Arc<ApiContext>>) -> StatusCode {
    if ctx.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(ctx): State<Arc<ApiContext>>,
) -> ([(axum::http::header::HeaderName, axum::http::HeaderValue); 1], String) {
    let encoder = TextEncoder::new();
    let metric_families = ctx.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error = ?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

fn provider_error_response(e: ProviderError) -> Response {
    match e {
        ProviderError::NotFound(place) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("location not found: {place}")})),
        )
            .into_response(),
        other => {
            tracing::warn!(error = %other, "upstream provider error");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": other.to_string()})),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
struct CityQuery {
    city: String,
}

async fn weather_current(
    State(ctx): State<Arc<ApiContext>>,
    Query(q): Query<CityQuery>,
) -> Response {
    ctx.requests_total.add(1, &[]);
    let location = match ctx.provider.resolve_location(&q.city).await {
        Ok(l) => l,
        Err(e) => return provider_error_response(e),
    };
    match ctx.provider.fetch_current(&location).await {
        Ok(current) => {
            let text = report::format_current(&location.name, &current);
            (
                StatusCode::OK,
                Json(json!({
                    "city": location.name,
                    "description": current.description,
                    "temperature": current.temperature,
                    "wind_speed": current.wind_speed,
                    "local_time": current.observed_at.format("%H:%M").to_string(),
                    "is_day": current.is_day,
                    "text": text,
                })),
            )
                .into_response()
        }
        Err(e) => provider_error_response(e),
    }
}

async fn weather_hourly(
    State(ctx): State<Arc<ApiContext>>,
    Query(q): Query<CityQuery>,
) -> Response {
    ctx.requests_total.add(1, &[]);
    let location = match ctx.provider.resolve_location(&q.city).await {
        Ok(l) => l,
        Err(e) => return provider_error_response(e),
    };
    match ctx.provider.fetch_forecast(&location).await {
        Ok(slots) => {
            let samples = normalize(&slots, chrono::Utc::now(), 24);
            let entries: Vec<_> = samples
                .iter()
                .step_by(3)
                .map(|s| {
                    json!({
                        "time": s.timestamp.format("%Y-%m-%dT%H:%M").to_string(),
                        "description": s.description,
                        "temperature": s.temperature,
                        "wind_speed": s.wind_speed,
                    })
                })
                .collect();
            let text = report::format_hourly(&location.name, &samples);
            (
                StatusCode::OK,
                Json(json!({"city": location.name, "entries": entries, "text": text})),
            )
                .into_response()
        }
        Err(e) => provider_error_response(e),
    }
}

async fn weather_daily(
    State(ctx): State<Arc<ApiContext>>,
    Query(q): Query<CityQuery>,
) -> Response {
    ctx.requests_total.add(1, &[]);
    let location = match ctx.provider.resolve_location(&q.city).await {
        Ok(l) => l,
        Err(e) => return provider_error_response(e),
    };
    match ctx.provider.fetch_daily(&location).await {
        Ok(daily) => {
            let text = report::format_daily(&location.name, &daily);
            (
                StatusCode::OK,
                Json(json!({
                    "city": location.name,
                    "date": daily.date.to_string(),
                    "min_temp": daily.min_temp,
                    "max_temp": daily.max_temp,
                    "day": daily.day_description,
                    "night": daily.night_description,
                    "text": text,
                })),
            )
                .into_response()
        }
        Err(e) => provider_error_response(e),
    }
}

async fn list_subscriptions(
    State(ctx): State<Arc<ApiContext>>,
    Path(user_id): Path<String>,
) -> Response {
    ctx.requests_total.add(1, &[]);
    let cities = ctx.store.read().await.cities(&user_id);
    (
        StatusCode::OK,
        Json(json!({"user_id": user_id, "cities": cities})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct SubscriptionRequest {
    user_id: String,
    city: String,
}

async fn subscribe(
    State(ctx): State<Arc<ApiContext>>,
    Json(req): Json<SubscriptionRequest>,
) -> Response {
    ctx.requests_total.add(1, &[]);

    // Validate the city before storing it, as the conversational flow did
    let location = match ctx.provider.resolve_location(&req.city).await {
        Ok(l) => l,
        Err(e) => return provider_error_response(e),
    };

    let mut store = ctx.store.write().await;
    let added = store.subscribe(&req.user_id, &req.city);
    if added {
        if let Err(e) = store.save() {
            tracing::error!(error = %e, "failed to persist subscriptions");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to persist subscription"})),
            )
                .into_response();
        }
    }

    let status = if added { "subscribed" } else { "already subscribed" };
    (
        StatusCode::OK,
        Json(json!({"status": status, "city": location.name})),
    )
        .into_response()
}

async fn unsubscribe(
    State(ctx): State<Arc<ApiContext>>,
    Json(req): Json<SubscriptionRequest>,
) -> Response {
    ctx.requests_total.add(1, &[]);

    let mut store = ctx.store.write().await;
    if !store.unsubscribe(&req.user_id, &req.city) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("not subscribed to {}", req.city)})),
        )
            .into_response();
    }
    if let Err(e) = store.save() {
        tracing::error!(error = %e, "failed to persist subscriptions");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "failed to persist subscription"})),
        )
            .into_response();
    }

    (StatusCode::OK, Json(json!({"status": "unsubscribed"}))).into_response()
}
