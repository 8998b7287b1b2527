use search_core::engine::config::{ConfigError, EngineConfig, NavigatorConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelSettings {
    pub enabled: bool,
    pub width: usize,
    pub height: usize,
    pub move_time_ms: u64,
    pub player_one: EngineConfig,
    pub player_two: EngineConfig,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 7,
            height: 7,
            move_time_ms: 150,
            player_one: EngineConfig::default(),
            player_two: EngineConfig::default(),
        }
    }
}

/// Everything the `navigator` binary reads from its JSON config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub navigator: NavigatorConfig,
    /// Size of the generated maze used when no maze file is given.
    pub maze_dim: usize,
    pub max_time: usize,
    pub duel: DuelSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            navigator: NavigatorConfig::default(),
            maze_dim: 12,
            max_time: crate::tester::MAX_TIME,
            duel: DuelSettings::default(),
        }
    }
}

impl Settings {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json_str)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maze_dim < 2 || self.maze_dim % 2 != 0 {
            return Err(invalid("maze_dim", "must be an even number of at least 2"));
        }
        if self.max_time == 0 {
            return Err(invalid("max_time", "must be at least 1"));
        }
        if self.duel.width == 0 || self.duel.height == 0 {
            return Err(invalid("duel", "board dimensions must be positive"));
        }
        self.navigator.validate()?;
        self.duel.player_one.validate()?;
        self.duel.player_two.validate()
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
