//! Core environment trait definitions.

use crate::spaces::DynSpace;
use crate::{PuzzleError, Result};
use ndarray::ArrayD;

/// Information returned from environment resets and steps
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvInfo {
    /// Episode return (if done)
    pub episode_return: Option<f32>,
    /// Episode length (if done)
    pub episode_length: Option<f32>,
    /// Custom metrics (kept minimal for performance)
    pub extra: smallvec::SmallVec<[(&'static str, f32); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f32, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len as f32);
        self
    }

    /// Add a custom metric
    pub fn with_extra(mut self, key: &'static str, value: f32) -> Self {
        self.extra.push((key, value));
        self
    }

    /// Get a value by key (including episode stats)
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length,
            _ => self.extra.iter().find(|(k, _)| k == &key).map(|(_, v)| *v),
        }
    }
}

/// Result from a single environment step
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Observation after the step
    pub observation: ArrayD<f32>,
    /// Reward received
    pub reward: f32,
    /// Whether episode terminated (puzzle solved)
    pub terminated: bool,
    /// Whether episode truncated (time limit)
    pub truncated: bool,
    /// Additional info
    pub info: EnvInfo,
}

impl StepResult {
    /// Check if episode is done (terminated or truncated)
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Core trait for puzzle environments.
///
/// Observations and actions cross the trait boundary as flat `f32` arrays so
/// that generic wrappers and runners can drive any environment. Environments
/// usually also offer typed methods for direct use.
///
/// # Example
///
/// ```rust,ignore
/// use kidspuzzles::env::{EnvInfo, PuzzleEnv, StepResult};
/// use kidspuzzles::spaces::{Box as BoxSpace, Discrete, DynSpace};
///
/// struct Coin {
///     heads: bool,
/// }
///
/// impl PuzzleEnv for Coin {
///     fn observation_space(&self) -> DynSpace {
///         DynSpace::Box(BoxSpace::uniform(&[1], 0.0, 1.0))
///     }
///
///     fn action_space(&self) -> DynSpace {
///         DynSpace::Discrete(Discrete::new(2))
///     }
///
///     fn reset(&mut self, seed: Option<u64>) -> (ArrayD<f32>, EnvInfo) {
///         // ...
///     }
///
///     fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
///         let guess = discrete_action(action, 2)?;
///         // ...
///     }
/// }
/// ```
pub trait PuzzleEnv: Send {
    /// Get the observation space
    fn observation_space(&self) -> DynSpace;

    /// Get the action space
    fn action_space(&self) -> DynSpace;

    /// Reset the environment to a fresh episode
    ///
    /// # Arguments
    /// * `seed` - Reseeds the environment's random source when given;
    ///   otherwise the current stream continues
    ///
    /// # Returns
    /// Tuple of (initial observation, info)
    fn reset(&mut self, seed: Option<u64>) -> (ArrayD<f32>, EnvInfo);

    /// Take a single step in the environment
    ///
    /// Fails without mutating state if the action is not part of the
    /// action space or the episode needs a reset.
    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult>;

    /// Optional: Render the environment as text
    fn render(&self) -> Option<String> {
        None
    }

    /// Optional: Close the environment and free resources
    fn close(&mut self) {}

    /// Check if environment is done and needs reset
    fn is_done(&self) -> bool {
        false
    }
}

/// Decode a discrete action array into an index below `n`.
///
/// The array must hold exactly one finite, non-negative, integral value.
pub fn discrete_action(action: &ArrayD<f32>, n: usize) -> Result<usize> {
    let mut values = action.iter();
    let value = match (values.next(), values.next()) {
        (Some(&v), None) => v,
        _ => {
            return Err(PuzzleError::InvalidAction(format!(
                "expected a single discrete value, got {} elements",
                action.len()
            )))
        }
    };

    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(PuzzleError::InvalidAction(format!(
            "{value} is not a valid discrete action"
        )));
    }

    let idx = value as usize;
    if idx >= n {
        return Err(PuzzleError::InvalidAction(format!(
            "action {idx} out of range [0, {n})"
        )));
    }
    Ok(idx)
}
