//! Top-level configuration: game, agent and RNG seed
//!
//! Loaded from a JSON file when one is given; every field is optional and
//! falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::game::GameConfig;
use crate::rl::AgentConfig;

/// Everything needed to start an [`EpisodeDriver`](crate::rl::EpisodeDriver)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxiConfig {
    pub game: GameConfig,
    pub agent: AgentConfig,
    /// Seed for every random choice; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl TaxiConfig {
    /// Read a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {}", path.display()),
            source,
        })?;
        let config: TaxiConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| Error::Io {
            operation: format!("write config {}", path.display()),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate()?;
        self.game.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Position, RewardModel, TaxiSpawn};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_is_valid() {
        let config = TaxiConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "seed": 7,
                "agent": {{ "learning_rate": 0.5, "sweep": {{ "num_episodes": 50 }} }},
                "game": {{ "taxi_spawn": "random", "rewards": {{ "kind": "arrival" }} }}
            }}"#
        )
        .unwrap();

        let config = TaxiConfig::load(file.path()).unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.agent.learning_rate, 0.5);
        assert_eq!(config.agent.discount_factor, 0.99);
        assert_eq!(config.agent.sweep.num_episodes, 50);
        assert_eq!(config.agent.sweep.max_steps, 140);
        assert_eq!(config.game.taxi_spawn, TaxiSpawn::Random);
        assert_eq!(config.game.rewards, RewardModel::arrival());
        assert_eq!(config.game.taxi_start, Position::new(3, 4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taxi.json");
        let mut config = TaxiConfig::default();
        config.game = GameConfig::open(5, 5);
        config.seed = Some(99);

        config.save(&path).unwrap();
        let loaded = TaxiConfig::load(&path).unwrap();

        assert_eq!(loaded.game.layout, config.game.layout);
        assert_eq!(loaded.game.depots, config.game.depots);
        assert_eq!(loaded.seed, Some(99));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = TaxiConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = TaxiConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut config = TaxiConfig::default();
        config.agent.discount_factor = 2.0;
        assert!(config.validate().is_err());

        let mut config = TaxiConfig::default();
        config.game.layout[3] = "V........".to_string();
        assert!(config.validate().is_err());
    }
}
