use crate::engine::eval::Heuristic;
use crate::engine::SearchLimit;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "could not parse config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Minimax,
    #[default]
    AlphaBeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub method: SearchMethod,
    pub iterative: bool,
    pub search_depth: u32,   // Fixed depth when `iterative` is off
    pub max_depth: u32,      // Cap for iterative deepening
    pub timer_threshold_ms: f64, // Abort once less than this is left on the clock
    pub heuristic: Heuristic,
    pub random_opening_plies: usize,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            method: SearchMethod::AlphaBeta,
            iterative: true,
            search_depth: 3,
            max_depth: 64,
            timer_threshold_ms: 10.0,
            heuristic: Heuristic::CenterBias,
            random_opening_plies: 2,
            seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_depth == 0 {
            return Err(invalid("search_depth", "must be at least 1"));
        }
        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be at least 1"));
        }
        if !self.timer_threshold_ms.is_finite() || self.timer_threshold_ms < 0.0 {
            return Err(invalid("timer_threshold_ms", "must be a non-negative number"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn search_limit(&self) -> SearchLimit {
        if self.iterative {
            SearchLimit::Iterative(Some(self.max_depth))
        } else {
            SearchLimit::Depth(self.search_depth)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    // Value iteration
    pub discount: f64,
    pub iterations: usize,
    pub tolerance: Option<f64>,

    // Q-learning
    pub alpha: f64,
    pub gamma: f64,
    pub epsilon: f64,
    pub alpha_decay: f64, // Multiplied into alpha after every episode
    pub min_alpha: f64,
    pub episodes: usize,
    pub max_steps_per_episode: usize,

    pub living_reward: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            iterations: 100,
            tolerance: None,

            alpha: 0.5,
            gamma: 0.9,
            epsilon: 0.3,
            alpha_decay: 1.0,
            min_alpha: 0.0,
            episodes: 100,
            max_steps_per_episode: 10_000,

            living_reward: 0.0,
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("discount", self.discount),
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("epsilon", self.epsilon),
            ("alpha_decay", self.alpha_decay),
            ("min_alpha", self.min_alpha),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must lie in [0, 1]"));
            }
        }
        if let Some(tolerance) = self.tolerance {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(invalid("tolerance", "must be a positive number"));
            }
        }
        if !self.living_reward.is_finite() {
            return Err(invalid("living_reward", "must be finite"));
        }
        Ok(())
    }
}

/// Which maze navigation algorithm drives the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RandomTurn,
    FollowWall,
    BlockDeadend,
    GraphSearchDfs,
    GraphSearchBfs,
    GraphSearchUcs,
    GraphSearchAstar,
    RlValueIteration,
    RlQLearning,
    #[default]
    FloodFill,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub strategy: StrategyKind,
    pub seed: u64,
    pub explore_threshold_pct: f64, // Share of the maze to see before planning
    pub learning: LearningConfig,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::FloodFill,
            seed: 0,
            explore_threshold_pct: 80.0,
            learning: LearningConfig::default(),
        }
    }
}

impl NavigatorConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.explore_threshold_pct) {
            return Err(invalid("explore_threshold_pct", "must lie in [0, 100]"));
        }
        self.learning.validate()
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
