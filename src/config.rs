use crate::error::{BikeDayError, Result};
use crate::models::{Thresholds, ThresholdOverlay};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 30;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub homeassistant: HomeAssistantConfig,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: u64,
    /// Global threshold overrides, applied to every sensor that does not
    /// override the field itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdOverlay>,
    pub sensors: Vec<SensorConfig>,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MINUTES
}

#[derive(Clone, Deserialize, Serialize)]
pub struct HomeAssistantConfig {
    pub url: String,
    pub token: String,
}

impl std::fmt::Debug for HomeAssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    /// Friendly name published with the sensor.
    pub name: String,
    /// Entity id the verdict is published under.
    pub entity_id: String,
    /// Weather entity the hourly forecast is fetched for.
    pub weather_entity: String,
    /// Per-sensor threshold overrides; wins over the global overlay field
    /// by field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdOverlay>,
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(BikeDayError::Config(format!(
                "Config file not found at {:?}. Run `bikeday init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| BikeDayError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let mut config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| BikeDayError::Config(format!("Failed to parse config: {}", e)))?;

        config.thresholds = config.thresholds.map(ThresholdOverlay::migrate_deprecated);
        for sensor in &mut config.sensors {
            sensor.thresholds = sensor
                .thresholds
                .take()
                .map(ThresholdOverlay::migrate_deprecated);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.homeassistant.url.is_empty() {
            return Err(BikeDayError::Config("homeassistant.url is empty".into()));
        }
        if self.homeassistant.token.is_empty() {
            return Err(BikeDayError::Config(
                "homeassistant.token is empty - set HA_TOKEN or edit the config".into(),
            ));
        }
        if self.sensors.is_empty() {
            return Err(BikeDayError::Config("no sensors configured".into()));
        }
        if self.poll_interval_minutes == 0 {
            return Err(BikeDayError::Config(
                "poll_interval_minutes must be at least 1".into(),
            ));
        }
        for sensor in &self.sensors {
            if sensor.entity_id.is_empty() || sensor.weather_entity.is_empty() {
                return Err(BikeDayError::Config(format!(
                    "sensor '{}' is missing entity_id or weather_entity",
                    sensor.name
                )));
            }
            let resolved = self.resolved_thresholds(sensor);
            if resolved.hours == 0 {
                return Err(BikeDayError::Config(format!(
                    "sensor '{}': hours must be a positive number",
                    sensor.name
                )));
            }
        }
        Ok(())
    }

    /// Resolves the thresholds for one sensor: per-sensor overrides, then
    /// global overrides, then hard defaults, independently per field.
    pub fn resolved_thresholds(&self, sensor: &SensorConfig) -> Thresholds {
        let layers: Vec<&ThresholdOverlay> = sensor
            .thresholds
            .iter()
            .chain(self.thresholds.iter())
            .collect();
        Thresholds::resolve(&layers)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("bikeday").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| BikeDayError::Config("Cannot determine config directory".into()))?
            .join("bikeday")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/bikeday/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BikeDayError::Config("Cannot determine config directory".into()))?
            .join("bikeday");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up bikeday!");
        println!();

        // --- Home Assistant ---
        println!("Home Assistant");
        let ha_url: String = Input::new()
            .with_prompt("  URL")
            .default("http://homeassistant.local:8123".into())
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let ha_token: String = Password::new()
            .with_prompt("  Long-lived access token")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Sensor ---
        println!("Sensor");
        let name: String = Input::new()
            .with_prompt("  Name")
            .default("Bike Day".into())
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let entity_id: String = Input::new()
            .with_prompt("  Published entity id")
            .default("binary_sensor.bike_day".into())
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let weather_entity: String = Input::new()
            .with_prompt("  Weather entity to watch")
            .default("weather.home".into())
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Thresholds ---
        println!("Thresholds (enter to accept the default)");
        let hours: u32 = Input::new()
            .with_prompt("  Look-ahead hours")
            .default(8)
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let min_temperature: f64 = Input::new()
            .with_prompt("  Minimum temperature")
            .default(10.0)
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let max_temperature: f64 = Input::new()
            .with_prompt("  Maximum temperature")
            .default(30.0)
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let precipitation_threshold: f64 = Input::new()
            .with_prompt("  Precipitation threshold")
            .default(0.1)
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        let wind_threshold: f64 = Input::new()
            .with_prompt("  Wind threshold")
            .default(20.0)
            .interact_text()
            .map_err(|e| BikeDayError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            homeassistant: HomeAssistantConfig {
                url: ha_url,
                token: ha_token,
            },
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
            thresholds: Some(ThresholdOverlay {
                hours: Some(hours),
                min_temperature: Some(min_temperature),
                max_temperature: Some(max_temperature),
                precipitation_threshold: Some(precipitation_threshold),
                wind_threshold: Some(wind_threshold),
                temperature_threshold: None,
            }),
            sensors: vec![SensorConfig {
                name,
                entity_id,
                weather_entity,
                thresholds: None,
            }],
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| BikeDayError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# bikeday Configuration\n# Generated by `bikeday init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            homeassistant: HomeAssistantConfig {
                url: "http://localhost:8123".into(),
                token: "".into(),
            },
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
            thresholds: None,
            sensors: vec![SensorConfig {
                name: "Bike Day".into(),
                entity_id: "binary_sensor.bike_day".into(),
                weather_entity: "weather.home".into(),
                thresholds: None,
            }],
        }
    }
}
