//! Digits puzzle environment for kidspuzzles.
//!
//! - `DigitsPuzzle` - move up to ten digits from the border onto their
//!   targets in the middle of a small grid
//! - `DigitAction` - action codes and names (`RIGHT0`, `UP3`, ...)
//! - `render` - text and RGB rendering plus a terminal render context
//! - `registry` - named registrations with a 300 step time limit

pub mod actions;
pub mod config;
mod digits;
pub mod registry;
pub mod render;

pub use actions::{DigitAction, Direction};
pub use config::{DigitsConfig, RewardConfig, RewardScheme, MAX_DIGITS};
pub use digits::{
    DigitsInfo, DigitsObservation, DigitsPuzzle, DigitsStep, Position, TARGET_POSITIONS,
};
pub use registry::{make, EnvSpec, DEFAULT_ENV_ID, MAX_EPISODE_STEPS};
pub use render::{RenderContext, RENDER_FPS};
