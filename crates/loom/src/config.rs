//! Configuration loading for the Loom.
//!
//! All tunable constants are loaded from a TOML configuration file. Every
//! section is optional; missing keys fall back to the defaults below. A
//! config value is immutable for the duration of one evaluation pass.

use serde::{Deserialize, Serialize};
use std::path::Path;

use loom_events::ThreadCategory;

/// Complete Loom configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoomConfig {
    /// Defaults applied when admitting raw records
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Physics coefficients
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Health bands and payoff thresholds
    #[serde(default)]
    pub health: HealthConfig,
    /// Lifecycle thresholds
    #[serde(default)]
    pub transitions: TransitionConfig,
    /// Selection caps
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl LoomConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }
}

/// One value per thread category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub sovereign: f32,
    pub major: f32,
    pub minor: f32,
    pub seed: f32,
}

impl CategoryWeights {
    /// Gets the value for a category.
    pub fn get(&self, category: ThreadCategory) -> f32 {
        match category {
            ThreadCategory::Sovereign => self.sovereign,
            ThreadCategory::Major => self.major,
            ThreadCategory::Minor => self.minor,
            ThreadCategory::Seed => self.seed,
        }
    }
}

/// Ingestion defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Karma given to records that carry none
    pub default_karma: CategoryWeights,
    /// Added to a supplied karma weight
    pub karma_bias: CategoryWeights,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            default_karma: CategoryWeights {
                sovereign: 90.0,
                major: 70.0,
                minor: 35.0,
                seed: 15.0,
            },
            karma_bias: CategoryWeights {
                sovereign: 20.0,
                major: 10.0,
                minor: 0.0,
                seed: 0.0,
            },
        }
    }
}

/// Physics coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Chapters looked back when measuring velocity
    pub velocity_window_chapters: u32,
    /// Entropy gained per chapter of silence
    pub entropy_per_silent_chapter: f32,
    /// Entropy per unit of mention-to-progress excess
    pub entropy_noise_weight: f32,
    /// Chapters of silence for gravity to reach ~63% of mass
    pub gravity_distance_scale: f32,
    /// Multiplier on payoff debt inside urgency
    pub debt_weight: f32,
    /// Debt accrued per silent chapter, before the category multiplier
    pub debt_growth_per_silent_chapter: f32,
    /// Debt removed by one progression event
    pub progress_debt_relief: f32,
    /// Urgency added while forced attention is in effect
    pub force_attention_boost: f32,
    /// Urgency and debt-growth multipliers by category
    pub category_weights: CategoryWeights,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            velocity_window_chapters: 10,
            entropy_per_silent_chapter: 2.0,
            entropy_noise_weight: 8.0,
            gravity_distance_scale: 12.0,
            debt_weight: 1.0,
            debt_growth_per_silent_chapter: 0.5,
            progress_debt_relief: 15.0,
            force_attention_boost: 500.0,
            category_weights: CategoryWeights {
                sovereign: 3.0,
                major: 2.0,
                minor: 1.0,
                seed: 0.5,
            },
        }
    }
}

/// Health and payoff-horizon settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Health lost per point of entropy
    pub entropy_penalty: f32,
    /// Health lost per chapter of silence
    pub distance_penalty: f32,
    /// Health gained per unit of positive velocity
    pub velocity_bonus: f32,
    /// Entropy at which the crack effect shows
    pub critical_entropy: f32,
    /// Debt at which payoff is due
    pub window_debt: f32,
    /// Gravity at which payoff is due
    pub window_gravity: f32,
    /// Debt past which payoff is overdue
    pub overdue_debt: f32,
    /// Chapters a thread may bloom before it is overdue
    pub perfect_window_chapters: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            entropy_penalty: 0.5,
            distance_penalty: 1.5,
            velocity_bonus: 50.0,
            critical_entropy: 80.0,
            window_debt: 25.0,
            window_gravity: 60.0,
            overdue_debt: 60.0,
            perfect_window_chapters: 8,
        }
    }
}

/// Lifecycle thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Chapters of silence after which a thread stalls
    pub stall_distance_chapters: u32,
    /// Progress events needed for Open -> Active
    pub min_progress_for_active: u32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            stall_distance_chapters: 10,
            min_progress_for_active: 2,
        }
    }
}

/// Selection caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Primary slots per chapter; sovereign threads may exceed it
    pub max_primary_threads: usize,
    /// Optional slots per chapter
    pub max_secondary_threads: usize,
    /// Urgency a ranked thread needs for a primary slot
    pub primary_urgency_threshold: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_primary_threads: 3,
            max_secondary_threads: 5,
            primary_urgency_threshold: 60.0,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
}

/// Error that can occur during TOML serialization.
#[derive(Debug)]
pub struct TomlSerializeError(pub toml::ser::Error);

impl std::fmt::Display for TomlSerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TOML serialize error: {}", self.0)
    }
}

impl std::error::Error for TomlSerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Loom Configuration

[ingest.default_karma]
sovereign = 90.0
major = 70.0
minor = 35.0
seed = 15.0

[ingest.karma_bias]
sovereign = 20.0
major = 10.0
minor = 0.0
seed = 0.0

[physics]
velocity_window_chapters = 10
entropy_per_silent_chapter = 2.0
entropy_noise_weight = 8.0
gravity_distance_scale = 12.0
debt_weight = 1.0
debt_growth_per_silent_chapter = 0.5
progress_debt_relief = 15.0
force_attention_boost = 500.0

[physics.category_weights]
sovereign = 3.0
major = 2.0
minor = 1.0
seed = 0.5

[health]
entropy_penalty = 0.5
distance_penalty = 1.5
velocity_bonus = 50.0
critical_entropy = 80.0
window_debt = 25.0
window_gravity = 60.0
overdue_debt = 60.0
perfect_window_chapters = 8

[transitions]
stall_distance_chapters = 10
min_progress_for_active = 2

[selection]
max_primary_threads = 3
max_secondary_threads = 5
primary_urgency_threshold = 60.0
"#
    .to_string()
}
