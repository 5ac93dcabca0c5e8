//! Bot configuration, loaded from YAML.

use std::path::{Path, PathBuf};

use ai_bt::BtConfig;
use ai_nav::NavConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read bot config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse bot config")]
    Parse(#[from] serde_yaml::Error),
}

/// Tunables for every bot driven by one `BotSystem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub nav: NavConfig,
    pub bt: BtConfig,

    /// How long a fight keeps chasing an enemy it cannot see.
    #[serde(default = "default_chase_time_ms")]
    pub chase_time_ms: u64,

    /// Aliens sense enemies within this range without seeing them.
    #[serde(default = "default_alien_sense_range")]
    pub alien_sense_range: f32,

    /// Skilled humans circle targets closer than this instead of backing off.
    #[serde(default = "default_human_dance_min")]
    pub human_dance_min: f32,

    /// Humans back off from targets closer than this.
    #[serde(default = "default_human_dance_max")]
    pub human_dance_max: f32,

    /// Skill level from which humans keep their distance while fighting.
    #[serde(default = "default_dance_skill")]
    pub dance_skill: i32,

    /// Skill level from which humans circle targets that got too close.
    #[serde(default = "default_circle_skill")]
    pub circle_skill: i32,

    /// Distance at which a fleeing bot considers itself safe.
    #[serde(default = "default_flee_reach")]
    pub flee_reach: f32,

    /// Distance from which a damaged building can be repaired.
    #[serde(default = "default_repair_range")]
    pub repair_range: f32,

    /// Distance from which a building can be used (armoury).
    #[serde(default = "default_use_range")]
    pub use_range: f32,

    /// A busy heal station is only waited for when closer than this.
    #[serde(default = "default_heal_wait_range")]
    pub heal_wait_range: f32,

    /// Radius of the random destinations picked by `roam`.
    #[serde(default = "default_roam_radius")]
    pub roam_radius: f32,

    /// Whether bots may use the armoury.
    #[serde(default = "default_buying")]
    pub buying: bool,
}

fn default_chase_time_ms() -> u64 {
    5000
}
fn default_alien_sense_range() -> f32 {
    1000.0
}
fn default_human_dance_min() -> f32 {
    100.0
}
fn default_human_dance_max() -> f32 {
    300.0
}
fn default_dance_skill() -> i32 {
    3
}
fn default_circle_skill() -> i32 {
    5
}
fn default_flee_reach() -> f32 {
    70.0
}
fn default_repair_range() -> f32 {
    100.0
}
fn default_use_range() -> f32 {
    64.0
}
fn default_heal_wait_range() -> f32 {
    200.0
}
fn default_roam_radius() -> f32 {
    2000.0
}
fn default_buying() -> bool {
    true
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            nav: NavConfig::default(),
            bt: BtConfig::default(),
            chase_time_ms: default_chase_time_ms(),
            alien_sense_range: default_alien_sense_range(),
            human_dance_min: default_human_dance_min(),
            human_dance_max: default_human_dance_max(),
            dance_skill: default_dance_skill(),
            circle_skill: default_circle_skill(),
            flee_reach: default_flee_reach(),
            repair_range: default_repair_range(),
            use_range: default_use_range(),
            heal_wait_range: default_heal_wait_range(),
            roam_radius: default_roam_radius(),
            buying: default_buying(),
        }
    }
}

impl BotConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}
