//! Environment wrappers for common functionality.

use super::{EnvInfo, PuzzleEnv, StepResult};
use crate::spaces::DynSpace;
use crate::Result;
use ndarray::ArrayD;

/// Wrapper that tracks episode statistics (return and length).
///
/// Adds `episode_return` and `episode_length` to info on episode completion.
pub struct EpisodeStats<E: PuzzleEnv> {
    env: E,
    episode_return: f32,
    episode_length: u32,
}

impl<E: PuzzleEnv> EpisodeStats<E> {
    /// Wrap an environment with episode statistics tracking
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode_return: 0.0,
            episode_length: 0,
        }
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Get a mutable reference to the inner environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: PuzzleEnv> PuzzleEnv for EpisodeStats<E> {
    fn observation_space(&self) -> DynSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> (ArrayD<f32>, EnvInfo) {
        self.episode_return = 0.0;
        self.episode_length = 0;
        self.env.reset(seed)
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
        let mut result = self.env.step(action)?;

        self.episode_return += result.reward;
        self.episode_length += 1;

        if result.done() {
            result.info = result
                .info
                .with_episode_stats(self.episode_return, self.episode_length);

            // Reset internal counters (env will be reset externally)
            self.episode_return = 0.0;
            self.episode_length = 0;
        }

        Ok(result)
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.env.is_done()
    }
}

/// Wrapper that truncates episodes after a fixed number of steps.
///
/// The wrapped environment never truncates on its own; this wrapper sets
/// `truncated` on the step that reaches the limit unless that step also
/// terminated the episode.
pub struct TimeLimit<E: PuzzleEnv> {
    env: E,
    max_episode_steps: u32,
    elapsed_steps: u32,
}

impl<E: PuzzleEnv> TimeLimit<E> {
    /// Wrap an environment with a step limit
    pub fn new(env: E, max_episode_steps: u32) -> Self {
        Self {
            env,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }

    /// Step limit per episode
    pub fn max_episode_steps(&self) -> u32 {
        self.max_episode_steps
    }

    /// Steps taken since the last reset
    pub fn elapsed_steps(&self) -> u32 {
        self.elapsed_steps
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Get a mutable reference to the inner environment
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Unwrap into the inner environment
    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: PuzzleEnv> PuzzleEnv for TimeLimit<E> {
    fn observation_space(&self) -> DynSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> (ArrayD<f32>, EnvInfo) {
        self.elapsed_steps = 0;
        self.env.reset(seed)
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
        let mut result = self.env.step(action)?;
        self.elapsed_steps += 1;

        if self.elapsed_steps >= self.max_episode_steps && !result.terminated {
            result.truncated = true;
        }

        Ok(result)
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.env.is_done() || self.elapsed_steps >= self.max_episode_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::discrete_action;
    use crate::spaces::{Box as BoxSpace, Discrete};
    use ndarray::IxDyn;

    // Terminates after `goal` steps
    struct CounterEnv {
        step_count: u32,
        goal: u32,
    }

    impl PuzzleEnv for CounterEnv {
        fn observation_space(&self) -> DynSpace {
            DynSpace::Box(BoxSpace::uniform(&[2], 0.0, 1.0))
        }

        fn action_space(&self) -> DynSpace {
            DynSpace::Discrete(Discrete::new(2))
        }

        fn reset(&mut self, _seed: Option<u64>) -> (ArrayD<f32>, EnvInfo) {
            self.step_count = 0;
            (ArrayD::zeros(IxDyn(&[2])), EnvInfo::new())
        }

        fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
            discrete_action(action, 2)?;
            self.step_count += 1;
            Ok(StepResult {
                observation: ArrayD::zeros(IxDyn(&[2])),
                reward: 1.0,
                terminated: self.step_count >= self.goal,
                truncated: false,
                info: EnvInfo::new(),
            })
        }
    }

    fn noop() -> ArrayD<f32> {
        ArrayD::zeros(IxDyn(&[1]))
    }

    #[test]
    fn test_episode_stats() {
        let env = CounterEnv {
            step_count: 0,
            goal: 5,
        };
        let mut wrapped = EpisodeStats::new(env);

        wrapped.reset(None);

        for _ in 0..4 {
            let result = wrapped.step(&noop()).unwrap();
            assert!(!result.done());
            assert!(result.info.get("episode_return").is_none());
        }

        // 5th step should terminate
        let result = wrapped.step(&noop()).unwrap();
        assert!(result.done());
        assert_eq!(result.info.get("episode_return"), Some(5.0));
        assert_eq!(result.info.get("episode_length"), Some(5.0));
    }

    #[test]
    fn test_episode_stats_ignores_rejected_steps() {
        let env = CounterEnv {
            step_count: 0,
            goal: 2,
        };
        let mut wrapped = EpisodeStats::new(env);
        wrapped.reset(None);

        let bad = ArrayD::from_elem(IxDyn(&[1]), 9.0);
        assert!(wrapped.step(&bad).is_err());

        wrapped.step(&noop()).unwrap();
        let result = wrapped.step(&noop()).unwrap();
        assert_eq!(result.info.get("episode_length"), Some(2.0));
    }

    #[test]
    fn test_time_limit_truncates() {
        let env = CounterEnv {
            step_count: 0,
            goal: 100,
        };
        let mut wrapped = TimeLimit::new(env, 3);
        wrapped.reset(None);

        assert!(!wrapped.step(&noop()).unwrap().truncated);
        assert!(!wrapped.step(&noop()).unwrap().truncated);
        let last = wrapped.step(&noop()).unwrap();
        assert!(last.truncated);
        assert!(!last.terminated);
        assert!(wrapped.is_done());

        wrapped.reset(None);
        assert_eq!(wrapped.elapsed_steps(), 0);
        assert!(!wrapped.is_done());
    }

    #[test]
    fn test_time_limit_prefers_termination() {
        let env = CounterEnv {
            step_count: 0,
            goal: 2,
        };
        let mut wrapped = TimeLimit::new(env, 2);
        wrapped.reset(None);

        wrapped.step(&noop()).unwrap();
        let last = wrapped.step(&noop()).unwrap();
        assert!(last.terminated);
        assert!(!last.truncated);
    }
}
