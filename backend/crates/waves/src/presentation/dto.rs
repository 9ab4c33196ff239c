//! API DTOs (Data Transfer Objects)

use serde::Serialize;

use crate::domain::observation::{ObservationRecord, format_timestamp};

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

/// One observation as served by `GET /waves`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveResponse {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub average_top_third_wave_height: f64,
    pub max_height: f64,
    pub average_top_third_wave_period: f64,
    pub peak_direction: i32,
    pub peak_directional_spread: i32,
    pub temperature: f64,
}

impl From<&ObservationRecord> for WaveResponse {
    fn from(record: &ObservationRecord) -> Self {
        Self {
            timestamp: format_timestamp(record.timestamp()),
            average_top_third_wave_height: record.significant_wave_height(),
            max_height: record.max_wave_height(),
            average_top_third_wave_period: record.significant_period(),
            peak_direction: record.peak_direction(),
            peak_directional_spread: record.peak_directional_spread(),
            temperature: record.water_temperature(),
        }
    }
}

