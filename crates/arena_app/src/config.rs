//! Session configuration.
//!
//! Everything is optional in the JSON file; missing sections fall back to
//! their defaults. Durations are written in milliseconds.

use std::path::{Path, PathBuf};
use std::time::Duration;

use arena_afk::{AfkError, InactivityConfig};
use arena_fsm::{Button, FsmError, StateTag, StateTimings};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::script::{InputScript, Keyframe};
use crate::tick::TickConfig;

/// Errors raised while loading a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Timings(#[from] FsmError),

    #[error(transparent)]
    Inactivity(#[from] AfkError),

    #[error("invalid session setting: {0}")]
    Invalid(String),
}

/// One fighter in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSpec {
    pub name: String,
    /// Index of the peer that owns this fighter.
    #[serde(default)]
    pub peer: u32,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub script: InputScript,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick: TickConfig,
    pub timings: StateTimings,
    pub inactivity: InactivityConfig,
    pub fighters: Vec<FighterSpec>,
}

impl Default for GameConfig {
    /// Two fighters on two peers. Ayla walks, then idles long enough to be
    /// flagged and penalised, then walks again. Bruno cycles through his
    /// moves, takes a hit, and releases a charge into a throw before his
    /// ultimate.
    fn default() -> Self {
        let ms = Duration::from_millis;
        let ayla = InputScript::new(vec![
            Keyframe::at(ms(500)).axis(1.0),
            Keyframe::at(ms(1500)).axis(0.0),
            Keyframe::at(ms(14000)).axis(-0.6),
            Keyframe::at(ms(15000)).axis(0.0).press(Button::Jump),
        ]);
        let bruno = InputScript::new(vec![
            Keyframe::at(ms(1000)).axis(-1.0),
            Keyframe::at(ms(2000)).press(Button::Dodge),
            Keyframe::at(ms(3000)).press(Button::Throw),
            Keyframe::at(ms(4000)).hit(20),
            Keyframe::at(ms(5000)).press(Button::Charge),
            Keyframe::at(ms(5500)).release(StateTag::Throwing),
            Keyframe::at(ms(6500)).press(Button::Ultimate),
            Keyframe::at(ms(8000)).axis(0.0),
        ]);
        Self {
            tick: TickConfig::default(),
            timings: StateTimings::default(),
            inactivity: InactivityConfig::default(),
            fighters: vec![
                FighterSpec {
                    name: "Ayla".to_string(),
                    peer: 0,
                    position: Vec3::new(-4.0, 0.0, 0.0),
                    script: ayla,
                },
                FighterSpec {
                    name: "Bruno".to_string(),
                    peer: 1,
                    position: Vec3::new(4.0, 0.0, 0.0),
                    script: bruno,
                },
            ],
        }
    }
}

impl GameConfig {
    /// Read and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if a
    /// value is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings.validate()?;
        self.inactivity.validate()?;
        if self.tick.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be non-zero".to_string()));
        }
        if let Some(nameless) = self.fighters.iter().position(|f| f.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("fighter {nameless} has no name")));
        }
        Ok(())
    }

    /// Number of peers the fighters are spread over.
    #[must_use]
    pub fn peer_count(&self) -> u32 {
        self.fighters.iter().map(|f| f.peer + 1).max().unwrap_or(1)
    }

    /// Fighters owned by one peer.
    pub fn fighters_for(&self, peer: u32) -> impl Iterator<Item = &FighterSpec> {
        self.fighters.iter().filter(move |f| f.peer == peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.peer_count(), 2);
        assert_eq!(config.fighters_for(1).count(), 1);
    }

    #[test]
    fn test_partial_json() {
        let config: GameConfig = serde_json::from_str(
            r#"{
                "inactivity": { "timeout": 5000 },
                "fighters": [ { "name": "Cato", "position": [1.0, 0.0, 2.0] } ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.inactivity.timeout, Duration::from_secs(5));
        assert_eq!(config.fighters[0].position, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(config.fighters[0].peer, 0);
        assert!(config.fighters[0].script.is_empty());
        assert_eq!(config.tick, TickConfig::default());
    }

    #[test]
    fn test_invalid_sections_rejected() {
        let mut config = GameConfig::default();
        config.inactivity.timeout = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::Inactivity(_))));

        let mut config = GameConfig::default();
        config.fighters[1].name = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = GameConfig::load(Path::new("/nonexistent/arena.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
