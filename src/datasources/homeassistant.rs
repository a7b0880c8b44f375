use crate::config::HomeAssistantConfig;
use crate::error::{BikeDayError, Result};
use crate::models::{ForecastEntry, SensorAttributes};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

pub struct HomeAssistantClient {
    client: reqwest::Client,
    config: HomeAssistantConfig,
}

/// State object returned by `GET /api/states/<entity_id>`. For weather
/// entities the state itself is the current condition code.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityState {
    #[allow(dead_code)]
    pub entity_id: String,
    pub state: String,
}

impl EntityState {
    /// The live condition as reported by the weather entity, None when the
    /// entity itself is unknown/unavailable.
    pub fn current_condition(&self) -> Option<String> {
        match self.state.as_str() {
            "unknown" | "unavailable" => None,
            _ => Some(self.state.clone()),
        }
    }
}

// Envelope of POST /api/services/weather/get_forecasts?return_response
#[derive(Debug, Deserialize)]
struct ServiceResponseEnvelope {
    service_response: HashMap<String, EntityForecasts>,
}

#[derive(Debug, Deserialize)]
struct EntityForecasts {
    #[serde(default)]
    forecast: Option<Vec<ForecastEntry>>,
}

/// Pulls the hourly forecast list for one entity out of the service
/// response envelope. A missing entity key, a null forecast or an empty
/// list all signal that the source produced nothing usable.
fn extract_forecast(envelope: ServiceResponseEnvelope, weather_entity: &str) -> Result<Vec<ForecastEntry>> {
    let forecast = envelope
        .service_response
        .get(weather_entity)
        .and_then(|e| e.forecast.clone())
        .unwrap_or_default();

    if forecast.is_empty() {
        return Err(BikeDayError::ForecastUnavailable(weather_entity.to_string()));
    }
    Ok(forecast)
}

impl HomeAssistantClient {
    pub fn new(config: HomeAssistantConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the current state of an entity. A 404 means the configured
    /// weather entity does not exist at all.
    pub async fn get_entity(&self, entity_id: &str) -> Result<EntityState> {
        let url = format!("{}/api/states/{}", self.config.url, entity_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| BikeDayError::DataSourceUnavailable(format!("Home Assistant: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BikeDayError::EntityNotFound(entity_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(BikeDayError::DataSourceUnavailable(format!(
                "Home Assistant returned {}",
                response.status()
            )));
        }

        let entity: EntityState = response.json().await.map_err(|e| {
            BikeDayError::DataSourceUnavailable(format!(
                "Failed to parse Home Assistant response: {}",
                e
            ))
        })?;

        Ok(entity)
    }

    /// Fetch the hourly forecast for a weather entity through the
    /// `weather.get_forecasts` service.
    pub async fn get_hourly_forecast(&self, weather_entity: &str) -> Result<Vec<ForecastEntry>> {
        let url = format!(
            "{}/api/services/weather/get_forecasts?return_response",
            self.config.url
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .json(&json!({
                "entity_id": weather_entity,
                "type": "hourly",
            }))
            .send()
            .await
            .map_err(|e| BikeDayError::DataSourceUnavailable(format!("Home Assistant: {}", e)))?;

        if !response.status().is_success() {
            return Err(BikeDayError::DataSourceUnavailable(format!(
                "Home Assistant returned {}",
                response.status()
            )));
        }

        // A record missing a required numeric field fails here, loudly,
        // instead of being compared against thresholds as a default value.
        let envelope: ServiceResponseEnvelope = response.json().await.map_err(|e| {
            BikeDayError::InvalidData(format!("malformed forecast response: {}", e))
        })?;

        extract_forecast(envelope, weather_entity)
    }

    /// Publish the binary sensor verdict. `state` is `on`, `off` or
    /// `unavailable`.
    pub async fn publish_state(
        &self,
        entity_id: &str,
        state: &str,
        attributes: Option<&SensorAttributes>,
    ) -> Result<()> {
        let url = format!("{}/api/states/{}", self.config.url, entity_id);

        let body = match attributes {
            Some(attrs) => json!({ "state": state, "attributes": attrs }),
            None => json!({ "state": state }),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| BikeDayError::DataSourceUnavailable(format!("Home Assistant: {}", e)))?;

        if !response.status().is_success() {
            return Err(BikeDayError::DataSourceUnavailable(format!(
                "Home Assistant rejected state for {}: {}",
                entity_id,
                response.status()
            )));
        }

        tracing::debug!(entity_id, state, "published sensor state");
        Ok(())
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/", self.config.url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .send()
            .await
            .map_err(|e| BikeDayError::DataSourceUnavailable(format!("Home Assistant: {}", e)))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ServiceResponseEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extract_forecast_returns_entries() {
        let envelope = envelope(
            r#"{
                "changed_states": [],
                "service_response": {
                    "weather.home": {
                        "forecast": [
                            {
                                "datetime": "2026-08-29T14:00:00+00:00",
                                "condition": "sunny",
                                "precipitation": 0.0,
                                "wind_speed": 8.0,
                                "temperature": 22.0
                            },
                            {
                                "datetime": "2026-08-29T15:00:00+00:00",
                                "condition": "rainy",
                                "precipitation": 1.2,
                                "wind_speed": 14.0,
                                "temperature": 18.0
                            }
                        ]
                    }
                }
            }"#,
        );

        let forecast = extract_forecast(envelope, "weather.home").unwrap();
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].condition, "sunny");
        assert_eq!(forecast[1].condition, "rainy");
    }

    #[test]
    fn extract_forecast_missing_entity_is_unavailable() {
        let envelope = envelope(r#"{"service_response": {}}"#);
        let err = extract_forecast(envelope, "weather.home").unwrap_err();
        assert!(matches!(err, BikeDayError::ForecastUnavailable(_)));
    }

    #[test]
    fn extract_forecast_null_forecast_is_unavailable() {
        let envelope =
            envelope(r#"{"service_response": {"weather.home": {"forecast": null}}}"#);
        let err = extract_forecast(envelope, "weather.home").unwrap_err();
        assert!(matches!(err, BikeDayError::ForecastUnavailable(_)));
    }

    #[test]
    fn extract_forecast_empty_list_is_unavailable() {
        let envelope =
            envelope(r#"{"service_response": {"weather.home": {"forecast": []}}}"#);
        let err = extract_forecast(envelope, "weather.home").unwrap_err();
        assert!(matches!(err, BikeDayError::ForecastUnavailable(_)));
    }

    #[test]
    fn entity_state_current_condition() {
        let entity: EntityState = serde_json::from_str(
            r#"{"entity_id": "weather.home", "state": "partlycloudy", "attributes": {}}"#,
        )
        .unwrap();
        assert_eq!(entity.current_condition().as_deref(), Some("partlycloudy"));

        let entity: EntityState = serde_json::from_str(
            r#"{"entity_id": "weather.home", "state": "unavailable"}"#,
        )
        .unwrap();
        assert_eq!(entity.current_condition(), None);
    }
}
