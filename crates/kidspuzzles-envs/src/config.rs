//! Digits puzzle configuration.

use kidspuzzles::{PuzzleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest supported number of digits
pub const MAX_DIGITS: usize = 10;

/// How step rewards are computed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardScheme {
    /// Negative normalized distance plus area-transition bonuses and penalties
    #[default]
    Shaped,
    /// Terminate bonus on success, zero otherwise
    Sparse,
}

/// Reward constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Paid once every digit sits on its target
    pub terminate: f32,
    /// Added when a move would have left the grid
    pub clipped: f32,
    /// Added when a digit moves from the border into the target area
    pub enter_target_area: f32,
    /// Added when a digit moves from the target area onto the border
    pub exit_target_area: f32,
    /// Added when a digit lands on its own target cell
    pub reach_target_pos: f32,
    /// Added when a digit moves off its own target cell
    pub leave_target_pos: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            terminate: 10.0,
            clipped: -1.0,
            enter_target_area: 0.1,
            exit_target_area: -1.0,
            reach_target_pos: 0.2,
            leave_target_pos: -1.0,
        }
    }
}

impl RewardConfig {
    fn values(&self) -> [(&'static str, f32); 6] {
        [
            ("terminate", self.terminate),
            ("clipped", self.clipped),
            ("enter_target_area", self.enter_target_area),
            ("exit_target_area", self.exit_target_area),
            ("reach_target_pos", self.reach_target_pos),
            ("leave_target_pos", self.leave_target_pos),
        ]
    }
}

/// Configuration for `DigitsPuzzle`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitsConfig {
    /// Number of digits to place, in [1, 10]
    pub n_digits: usize,
    /// Reward constants
    pub rewards: RewardConfig,
    /// Reward computation scheme; unset means the registration's scheme
    /// (or `Shaped` when built directly)
    pub reward_scheme: Option<RewardScheme>,
    /// Width in pixels of rendered frames
    pub window_width: usize,
    /// Height in pixels of rendered frames
    pub window_height: usize,
}

impl Default for DigitsConfig {
    fn default() -> Self {
        Self {
            n_digits: MAX_DIGITS,
            rewards: RewardConfig::default(),
            reward_scheme: None,
            window_width: 512,
            window_height: 256,
        }
    }
}

impl DigitsConfig {
    /// Default configuration with `n_digits` digits
    pub fn with_digits(n_digits: usize) -> Self {
        Self {
            n_digits,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DIGITS).contains(&self.n_digits) {
            return Err(PuzzleError::InvalidConfiguration(format!(
                "n_digits must be in [1, {MAX_DIGITS}], got {}",
                self.n_digits
            )));
        }
        if let Some((name, value)) = self.rewards.values().into_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(PuzzleError::InvalidConfiguration(format!(
                "reward '{name}' must be finite, got {value}"
            )));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(PuzzleError::InvalidConfiguration(
                "window dimensions must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Scheme in effect for this configuration
    pub fn reward_scheme(&self) -> RewardScheme {
        self.reward_scheme.unwrap_or_default()
    }

    /// Grid (width, height) in cells for this many digits
    pub fn grid_size(&self) -> (i32, i32) {
        if self.n_digits > 5 {
            (7, 4)
        } else {
            (self.n_digits as i32 + 2, 3)
        }
    }
}
