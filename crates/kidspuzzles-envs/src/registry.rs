//! Named environment registrations.
//!
//! Every registered id builds a `DigitsPuzzle` wrapped in a `TimeLimit`.

use crate::config::{DigitsConfig, RewardScheme};
use crate::digits::DigitsPuzzle;
use kidspuzzles::env::TimeLimit;
use kidspuzzles::{PuzzleError, Result};

/// Step limit applied to every registered environment
pub const MAX_EPISODE_STEPS: u32 = 300;

/// Id used when none is given
pub const DEFAULT_ENV_ID: &str = "kidspuzzles/DigitsPuzzleEnv-v0";

/// A registered environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvSpec {
    pub id: &'static str,
    pub max_episode_steps: u32,
    pub reward_scheme: RewardScheme,
    pub description: &'static str,
}

static SPECS: [EnvSpec; 2] = [
    EnvSpec {
        id: DEFAULT_ENV_ID,
        max_episode_steps: MAX_EPISODE_STEPS,
        reward_scheme: RewardScheme::Shaped,
        description: "Digits puzzle with shaped rewards",
    },
    EnvSpec {
        id: "kidpuzzles/DigitsPuzzleEnv-v0",
        max_episode_steps: MAX_EPISODE_STEPS,
        reward_scheme: RewardScheme::Sparse,
        description: "Digits puzzle with sparse rewards (legacy id)",
    },
];

/// All registrations
pub fn specs() -> &'static [EnvSpec] {
    &SPECS
}

/// Look up a registration by id
pub fn spec(id: &str) -> Result<&'static EnvSpec> {
    SPECS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| PuzzleError::UnknownEnv(id.to_string()))
}

/// Build the environment registered under `id`.
///
/// The registration's reward scheme applies only when `config` leaves it
/// unset; an explicit scheme in `config` wins.
pub fn make(id: &str, mut config: DigitsConfig) -> Result<TimeLimit<DigitsPuzzle>> {
    let spec = spec(id)?;
    match config.reward_scheme {
        Some(requested) if requested != spec.reward_scheme => {
            tracing::info!(
                id,
                requested = ?requested,
                registered = ?spec.reward_scheme,
                "Using configured reward scheme"
            );
        }
        Some(_) => {}
        None => config.reward_scheme = Some(spec.reward_scheme),
    }

    let env = DigitsPuzzle::new(config)?;
    Ok(TimeLimit::new(env, spec.max_episode_steps))
}
