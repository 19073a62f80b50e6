/*
 * @file forecast.rs
 * @brief Best-effort weather forecast enrichment
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Best-effort daily forecast enrichment for `weather.*` entities.

use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::hub::HubClient;

/// Number of daily records rendered per weather entity.
const FORECAST_DAYS: usize = 3;

/// Forecast enrichment result. Never an error: failures degrade to
/// [`Forecast::Unavailable`] and the turn continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Forecast {
    Available(String),
    /// Carries the reason for logging; renders as a fixed sentinel.
    Unavailable(String),
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Forecast::Available(text) => f.write_str(text),
            Forecast::Unavailable(_) => f.write_str("forecast unavailable"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastRecord {
    #[serde(default)]
    datetime: String,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    temperature: Option<Value>,
    #[serde(default)]
    templow: Option<Value>,
}

/// Fetches forecasts through the hub's `weather.get_forecasts` service.
#[derive(Clone)]
pub struct ForecastFetcher {
    hub: HubClient,
}

impl ForecastFetcher {
    pub fn new(hub: HubClient) -> Self {
        Self { hub }
    }

    /// Retrieves and renders the next few days for one weather entity.
    pub async fn fetch(&self, entity_id: &str) -> Forecast {
        let body = json!({ "entity_id": entity_id, "type": "daily" });
        let payload = match self
            .hub
            .post_service("weather/get_forecasts?return_response", &body)
            .await
        {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(entity = entity_id, "forecast request failed: {}", err);
                return Forecast::Unavailable(err.to_string());
            }
        };
        match format_forecast(entity_id, &payload) {
            Ok(text) => Forecast::Available(text),
            Err(reason) => {
                tracing::warn!(entity = entity_id, "forecast payload rejected: {}", reason);
                Forecast::Unavailable(reason)
            }
        }
    }
}

/// Renders the first three chronological records of a forecast response.
///
/// # Details
/// Accepts both the bare `{<entity_id>: {"forecast": [...]}}` shape and the
/// same object wrapped in `{"service_response": ...}`.
///
/// # Errors
/// Returns a reason string when the entity or its records are missing.
pub fn format_forecast(entity_id: &str, payload: &Value) -> Result<String, String> {
    let root = payload.get("service_response").unwrap_or(payload);
    let raw = root
        .get(entity_id)
        .and_then(|entry| entry.get("forecast"))
        .ok_or_else(|| format!("no forecast for {}", entity_id))?;
    let mut records: Vec<ForecastRecord> =
        serde_json::from_value(raw.clone()).map_err(|err| err.to_string())?;
    if records.is_empty() {
        return Err("forecast list is empty".to_string());
    }
    records.sort_by(|a, b| a.datetime.cmp(&b.datetime));
    let days: Vec<String> = records.iter().take(FORECAST_DAYS).map(render_day).collect();
    Ok(days.join(" | "))
}

fn render_day(record: &ForecastRecord) -> String {
    let date = record.datetime.get(..10).unwrap_or(&record.datetime);
    format!(
        "[{}: {}, Max: {}°C, Min: {}°C]",
        date,
        record.condition.as_deref().unwrap_or("?"),
        number(&record.temperature),
        number(&record.templow)
    )
}

fn number(value: &Option<Value>) -> String {
    match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        json!({
            "weather.home": {
                "forecast": [
                    {"datetime": "2025-06-03T10:00:00+00:00", "condition": "rainy", "temperature": 18, "templow": 11},
                    {"datetime": "2025-06-01T10:00:00+00:00", "condition": "sunny", "temperature": 24.5, "templow": 13},
                    {"datetime": "2025-06-04T10:00:00+00:00", "condition": "cloudy", "temperature": 20, "templow": 12},
                    {"datetime": "2025-06-02T10:00:00+00:00", "condition": "partlycloudy", "temperature": 22, "templow": 14}
                ]
            }
        })
    }

    #[test]
    fn renders_first_three_days_in_order() {
        let text = format_forecast("weather.home", &sample()).unwrap();
        assert_eq!(
            text,
            "[2025-06-01: sunny, Max: 24.5°C, Min: 13°C] | \
             [2025-06-02: partlycloudy, Max: 22°C, Min: 14°C] | \
             [2025-06-03: rainy, Max: 18°C, Min: 11°C]"
        );
    }

    #[test]
    fn accepts_service_response_wrapper() {
        let wrapped = json!({ "changed_states": [], "service_response": sample() });
        assert!(format_forecast("weather.home", &wrapped).is_ok());
    }

    #[test]
    fn missing_entity_is_rejected() {
        assert!(format_forecast("weather.away", &sample()).is_err());
    }

    #[test]
    fn malformed_records_are_rejected() {
        let bad = json!({ "weather.home": { "forecast": "soon" } });
        assert!(format_forecast("weather.home", &bad).is_err());
        let empty = json!({ "weather.home": { "forecast": [] } });
        assert!(format_forecast("weather.home", &empty).is_err());
    }

    #[test]
    fn missing_values_render_placeholder() {
        let partial = json!({ "weather.home": { "forecast": [{"datetime": "2025-06-01"}] } });
        assert_eq!(
            format_forecast("weather.home", &partial).unwrap(),
            "[2025-06-01: ?, Max: ?°C, Min: ?°C]"
        );
    }

    #[test]
    fn unavailable_renders_sentinel() {
        let forecast = Forecast::Unavailable("timeout".to_string());
        assert_eq!(forecast.to_string(), "forecast unavailable");
    }
}
