use serde::{Deserialize, Serialize};

use crate::mapgen::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::progression::MAX_LEVELS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    pub run_seed: u64,
    pub max_levels: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { width: DEFAULT_WIDTH, height: DEFAULT_HEIGHT, run_seed: 0, max_levels: MAX_LEVELS }
    }
}

impl EngineConfig {
    pub fn with_seed(run_seed: u64) -> Self {
        Self { run_seed, ..Self::default() }
    }

    /// Level cap clamped into `1..=MAX_LEVELS`.
    pub fn level_cap(&self) -> u8 {
        self.max_levels.clamp(1, MAX_LEVELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "run_seed": 9 }"#).unwrap();
        assert_eq!(config, EngineConfig::with_seed(9));
        assert_eq!(config.level_cap(), 30);
    }

    #[test]
    fn level_cap_never_exceeds_the_hard_limit() {
        let config = EngineConfig { max_levels: 99, ..EngineConfig::default() };
        assert_eq!(config.level_cap(), MAX_LEVELS);
        let config = EngineConfig { max_levels: 0, ..EngineConfig::default() };
        assert_eq!(config.level_cap(), 1);
    }
}
