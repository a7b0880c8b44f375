pub mod homeassistant;

pub use homeassistant::HomeAssistantClient;
