//! Environment traits and wrappers.
//!
//! Provides the core `PuzzleEnv` trait that all environments must implement,
//! plus wrappers for episode statistics and time limits.

mod traits;
mod wrappers;

pub use traits::{discrete_action, EnvInfo, PuzzleEnv, StepResult};
pub use wrappers::{EpisodeStats, TimeLimit};
