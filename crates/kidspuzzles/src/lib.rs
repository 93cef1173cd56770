//! # kidspuzzles
//!
//! Environment framework for small grid puzzles used as reinforcement
//! learning benchmarks.
//!
//! ## Overview
//!
//! The crate provides:
//! - The `PuzzleEnv` trait every environment implements
//! - Gymnasium-compatible observation and action spaces
//! - Wrappers for episode statistics and time limits
//! - Metric loggers for evaluation runs
//!
//! Concrete environments live in `kidspuzzles-envs`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kidspuzzles::prelude::*;
//! use kidspuzzles_envs::DigitsPuzzle;
//!
//! let mut env = DigitsPuzzle::with_digits(3)?;
//! let (obs, _) = env.reset(Some(42));
//!
//! // Move digit 0 to the right
//! let action = ArrayD::from_elem(IxDyn(&[1]), 0.0);
//! let result = env.step(&action)?;
//! ```

pub mod env;
pub mod log;
pub mod spaces;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::env::{EnvInfo, EpisodeStats, PuzzleEnv, StepResult, TimeLimit};
    pub use crate::log::{CompositeLogger, ConsoleLogger, JsonLinesLogger, MetricLogger};
    pub use crate::spaces::*;
    pub use crate::{PuzzleError, Result};
    pub use ndarray::{ArrayD, IxDyn};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Episode is over or was never started; call reset() first")]
    ResetNeeded,

    #[error("Unknown environment id: {0}")]
    UnknownEnv(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, PuzzleError>;
