//! Numeric tuning of a [`Board`](crate::Board).
//!
//! Every field has a default, so a partial JSON document is a valid config:
//!
//! ```
//! use stackfall_engine::config::BoardConfig;
//!
//! let config: BoardConfig = serde_json::from_str(r#"{ "drop_interval_ms": 400 }"#).unwrap();
//! assert_eq!(config.drop_interval_ms, 400);
//! assert_eq!(config.queue_length, 3);
//! config.validate().unwrap();
//! ```

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bot::BotWeights;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("drop interval must be positive")]
    ZeroDropInterval,
    #[display("cell width and height must be positive")]
    ZeroCellSize,
    #[display("queue length must be positive")]
    ZeroQueueLength,
    #[display("bag must hold each piece kind at least once")]
    ZeroBagCopies,
    #[display("bias chance {value} is outside [0, 1]")]
    BiasChanceOutOfRange { value: f64 },
    #[display("label vocabulary is empty")]
    EmptyVocabulary,
    #[display("{name}: min delay {min_ms}ms exceeds max delay {max_ms}ms")]
    InvertedDelay {
        name: &'static str,
        min_ms: u64,
        max_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Gravity period while playing.
    pub drop_interval_ms: u64,
    /// One-cell move tween.
    pub move_ms: u64,
    /// Hard-drop slide.
    pub hard_drop_ms: u64,
    pub row_fade_ms: u64,
    pub row_shift_ms: u64,
    pub landing_ms: u64,
    pub queue_length: usize,
    pub bag: BagConfig,
    pub trail: TrailConfig,
    pub labels: LabelConfig,
    pub surface: SurfaceMetrics,
    pub bot: BotConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            drop_interval_ms: 800,
            move_ms: 80,
            hard_drop_ms: 120,
            row_fade_ms: 250,
            row_shift_ms: 200,
            landing_ms: 150,
            queue_length: 3,
            bag: BagConfig::default(),
            trail: TrailConfig::default(),
            labels: LabelConfig::default(),
            surface: SurfaceMetrics::default(),
            bot: BotConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drop_interval_ms == 0 {
            return Err(ConfigError::ZeroDropInterval);
        }
        if self.surface.cell_width == 0 || self.surface.cell_height == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.queue_length == 0 {
            return Err(ConfigError::ZeroQueueLength);
        }
        if self.bag.copies == 0 {
            return Err(ConfigError::ZeroBagCopies);
        }
        if !(0.0..=1.0).contains(&self.bag.bias_chance) {
            return Err(ConfigError::BiasChanceOutOfRange {
                value: self.bag.bias_chance,
            });
        }
        if self.labels.vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        self.labels.typing.validate("labels.typing")?;
        self.bot.cadence.validate("bot.cadence")?;
        Ok(())
    }

    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        Duration::from_millis(self.drop_interval_ms)
    }

    #[must_use]
    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_ms)
    }

    #[must_use]
    pub fn hard_drop_duration(&self) -> Duration {
        Duration::from_millis(self.hard_drop_ms)
    }
}

/// Bag randomizer composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BagConfig {
    /// Copies of each kind per bag.
    pub copies: usize,
    /// Probability that a bag receives one extra copy of a random kind.
    pub bias_chance: f64,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            copies: 2,
            bias_chance: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// A hard drop must cover more rows than this to leave a trail.
    pub min_distance: i32,
    pub particles: usize,
    pub fade_ms: u64,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            min_distance: 2,
            particles: 10,
            fade_ms: 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub vocabulary: Vec<String>,
    /// Delay before each typed character.
    pub typing: DelayRange,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let vocabulary = [
            "fn", "impl", "trait", "struct", "enum", "match", "async", "await", "unsafe", "mod",
            "crate", "where", "dyn", "move", "loop",
        ];
        Self {
            vocabulary: vocabulary.into_iter().map(String::from).collect(),
            typing: DelayRange {
                min_ms: 40,
                max_ms: 110,
            },
        }
    }
}

/// Inclusive range of randomized delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    fn validate(self, name: &'static str) -> Result<(), ConfigError> {
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvertedDelay {
                name,
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Duration {
        if self.min_ms >= self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.random_range(self.min_ms..=self.max_ms))
    }
}

/// How host measurements map to grid cells.
///
/// Sizes are in host units (terminal columns and rows for the CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMetrics {
    pub cell_width: u16,
    pub cell_height: u16,
    /// Spacing between adjacent cells.
    pub gap: u16,
    pub max_columns: Option<usize>,
    pub max_rows: Option<usize>,
}

impl Default for SurfaceMetrics {
    fn default() -> Self {
        Self {
            cell_width: 2,
            cell_height: 1,
            gap: 0,
            max_columns: Some(12),
            max_rows: Some(20),
        }
    }
}

impl SurfaceMetrics {
    /// Number of `(columns, rows)` that fit a `width × height` surface.
    #[must_use]
    pub fn fit(&self, width: u16, height: u16) -> (usize, usize) {
        let count = |extent: u16, cell: u16, max: Option<usize>| {
            let gap = usize::from(self.gap);
            let n = (usize::from(extent) + gap) / (usize::from(cell) + gap).max(1);
            max.map_or(n, |max| n.min(max))
        };
        (
            count(width, self.cell_width, self.max_columns),
            count(height, self.cell_height, self.max_rows),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub weights: BotWeights,
    /// Pause between consecutive bot actions.
    pub cadence: DelayRange,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            weights: BotWeights::default(),
            cadence: DelayRange {
                min_ms: 60,
                max_ms: 160,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        BoardConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "bot": { "weights": { "holes": -10.0 } }, "surface": { "max_rows": null } }"#;
        let config: BoardConfig = serde_json::from_str(json).unwrap();
        assert!((config.bot.weights.holes - -10.0).abs() < f64::EPSILON);
        assert!((config.bot.weights.lines - BotWeights::default().lines).abs() < f64::EPSILON);
        assert_eq!(config.surface.max_rows, None);
        assert_eq!(config.surface.max_columns, Some(12));
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = BoardConfig::default();
        config.queue_length = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueueLength));

        let mut config = BoardConfig::default();
        config.bag.bias_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BiasChanceOutOfRange { .. })
        ));

        let mut config = BoardConfig::default();
        config.bot.cadence = DelayRange {
            min_ms: 10,
            max_ms: 5,
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "bot.cadence: min delay 10ms exceeds max delay 5ms");

        let mut config = BoardConfig::default();
        config.labels.vocabulary.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyVocabulary));
    }

    #[test]
    fn test_surface_fit() {
        let metrics = SurfaceMetrics {
            cell_width: 2,
            cell_height: 1,
            gap: 1,
            max_columns: None,
            max_rows: Some(5),
        };
        // (width + gap) / (cell + gap)
        assert_eq!(metrics.fit(11, 40), (4, 5));
        assert_eq!(metrics.fit(0, 0), (0, 0));

        let huge = SurfaceMetrics {
            cell_width: u16::MAX,
            cell_height: u16::MAX,
            gap: u16::MAX,
            max_columns: None,
            max_rows: None,
        };
        assert_eq!(huge.fit(u16::MAX, 10), (1, 0));
    }

    #[test]
    fn test_delay_sample_within_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        let range = DelayRange {
            min_ms: 5,
            max_ms: 9,
        };
        for _ in 0..100 {
            let d = range.sample(&mut rng);
            assert!((5..=9).contains(&d.as_millis()));
        }
    }
}
