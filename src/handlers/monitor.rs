use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{DailySummary, DayDetail, LiveStatus, Sample};
use crate::services::MonitorService;

#[derive(Deserialize)]
pub struct SummaryParams {
    days: Option<usize>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: Vec<DailySummary>,
}

#[derive(Serialize)]
pub struct RateResponse {
    pub cost_per_kwh: f64,
}

#[derive(Deserialize)]
pub struct SetRateRequest {
    pub rate: f64,
}

#[derive(Serialize)]
pub struct SetRateResponse {
    pub success: bool,
    pub cost_per_kwh: f64,
}

pub async fn get_latest(State(service): State<MonitorService>) -> Result<Json<Sample>> {
    Ok(Json(service.latest()?))
}

pub async fn get_live(State(service): State<MonitorService>) -> Result<Json<LiveStatus>> {
    Ok(Json(service.live_status()?))
}

pub async fn get_dates(State(service): State<MonitorService>) -> Json<Vec<String>> {
    Json(service.available_dates())
}

pub async fn get_day_detail(
    State(service): State<MonitorService>,
    Path(date): Path<String>,
) -> Result<Json<DayDetail>> {
    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("Invalid date format: {}", date)))?;

    let detail = service.day_detail(&date)?;
    Ok(Json(detail))
}

pub async fn get_daily_summary(
    State(service): State<MonitorService>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>> {
    let days = params.days.unwrap_or(30);
    if days < 1 {
        return Err(AppError::InvalidInput(
            "days must be at least 1".to_string(),
        ));
    }

    Ok(Json(SummaryResponse {
        summary: service.daily_summary(days),
    }))
}

pub async fn get_rate(State(service): State<MonitorService>) -> Json<RateResponse> {
    Json(RateResponse {
        cost_per_kwh: service.rate(),
    })
}

pub async fn set_rate(
    State(service): State<MonitorService>,
    Json(payload): Json<SetRateRequest>,
) -> Result<Json<SetRateResponse>> {
    let cost_per_kwh = service.set_rate(payload.rate)?;
    Ok(Json(SetRateResponse {
        success: true,
        cost_per_kwh,
    }))
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}
