use crate::config::{Config, SensorConfig};
use crate::datasources::HomeAssistantClient;
use crate::error::Result;
use crate::logic::evaluator::evaluate_window;
use crate::models::{SensorAttributes, WindowVerdict};
use chrono::Utc;
use std::time::Duration;

/// One refreshed sensor, ready to publish.
#[derive(Debug)]
pub struct SensorUpdate {
    pub verdict: WindowVerdict,
    pub attributes: SensorAttributes,
}

/// Drives the poll cycle: fetch forecast, evaluate the window, publish the
/// verdict, once per interval for every configured sensor.
pub struct PollService {
    config: Config,
    client: HomeAssistantClient,
}

impl PollService {
    pub fn new(config: Config) -> Self {
        let client = HomeAssistantClient::new(config.homeassistant.clone());
        Self { config, client }
    }

    pub fn client(&self) -> &HomeAssistantClient {
        &self.client
    }

    pub fn sensors(&self) -> &[SensorConfig] {
        &self.config.sensors
    }

    /// Runs forever, one refresh cycle per configured interval. Cycles are
    /// strictly sequential; a failed sensor surfaces as `unavailable` and
    /// the next cycle is the only retry.
    pub async fn run(&self) -> Result<()> {
        let period = Duration::from_secs(self.config.poll_interval_minutes * 60);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(
            interval_minutes = self.config.poll_interval_minutes,
            sensors = self.config.sensors.len(),
            "poll service started"
        );

        loop {
            interval.tick().await;
            self.refresh_all().await;
        }
    }

    /// One full cycle over all sensors. Each sensor is independent: a
    /// failure is logged, published as `unavailable`, and never stops the
    /// others.
    pub async fn refresh_all(&self) {
        for sensor in &self.config.sensors {
            match self.refresh_sensor(sensor).await {
                Ok(update) => {
                    if let Err(e) = self
                        .client
                        .publish_state(
                            &sensor.entity_id,
                            update.verdict.state_str(),
                            Some(&update.attributes),
                        )
                        .await
                    {
                        tracing::warn!(sensor = %sensor.name, "failed to publish state: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!(sensor = %sensor.name, "refresh failed: {}", e);
                    if let Err(e) = self
                        .client
                        .publish_state(&sensor.entity_id, "unavailable", None)
                        .await
                    {
                        tracing::warn!(sensor = %sensor.name, "failed to publish unavailable: {}", e);
                    }
                }
            }
        }
    }

    /// Fetches fresh data for one sensor and evaluates it. Pure with respect
    /// to sensor state: nothing is published here and nothing is cached.
    ///
    /// Unavailability of the source short-circuits before evaluation: the
    /// evaluator is never called with no data.
    pub async fn refresh_sensor(&self, sensor: &SensorConfig) -> Result<SensorUpdate> {
        let entity = self.client.get_entity(&sensor.weather_entity).await?;
        // get_hourly_forecast signals ForecastUnavailable for a missing or
        // empty forecast, so the evaluator always sees at least one record
        let forecast = self
            .client
            .get_hourly_forecast(&sensor.weather_entity)
            .await?;

        let thresholds = self.config.resolved_thresholds(sensor);
        let verdict = evaluate_window(&forecast, Utc::now(), &thresholds);

        tracing::debug!(
            sensor = %sensor.name,
            favorable = verdict.is_favorable,
            "window evaluated"
        );

        let attributes = SensorAttributes::new(
            &sensor.name,
            &verdict,
            forecast.first().map(|e| e.condition.clone()),
            entity.current_condition(),
        );

        Ok(SensorUpdate {
            verdict,
            attributes,
        })
    }
}
