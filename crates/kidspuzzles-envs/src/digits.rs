//! Digits grid puzzle environment.
//!
//! Up to ten digits start on random border cells of a small grid and must
//! each be moved onto a fixed target cell inside the grid. Every step moves
//! exactly one digit by one cell; moves that would leave the grid are
//! clamped back onto it.

use crate::actions::{DigitAction, NUM_DIRECTIONS};
use crate::config::{DigitsConfig, RewardScheme};
use crate::render::{self, GridView};
use kidspuzzles::env::{discrete_action, EnvInfo, PuzzleEnv, StepResult};
use kidspuzzles::spaces::{Box as BoxSpace, Dict, Discrete, DynSpace};
use kidspuzzles::{PuzzleError, Result};
use ndarray::{Array3, ArrayD, IxDyn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A grid cell as (x, y), x to the right and y downwards
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Target cell of each digit, in digit order
pub const TARGET_POSITIONS: [Position; 10] = [
    Position::new(1, 1),
    Position::new(2, 1),
    Position::new(3, 1),
    Position::new(4, 1),
    Position::new(5, 1),
    Position::new(1, 2),
    Position::new(2, 2),
    Position::new(3, 2),
    Position::new(4, 2),
    Position::new(5, 2),
];

/// Typed observation: where every digit is and where it must go
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigitsObservation {
    pub digits_positions: Vec<Position>,
    pub target_digits_positions: Vec<Position>,
}

impl DigitsObservation {
    /// Flatten to `[x0, y0, x1, y1, ..., tx0, ty0, ...]`.
    ///
    /// Matches the key order of the dict observation space.
    pub fn to_array(&self) -> ArrayD<f32> {
        let flat: Vec<f32> = self
            .digits_positions
            .iter()
            .chain(self.target_digits_positions.iter())
            .flat_map(|p| [p.x as f32, p.y as f32])
            .collect();
        ArrayD::from_shape_vec(IxDyn(&[flat.len()]), flat)
            .expect("flat vector always matches its own length")
    }
}

/// Per-step diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigitsInfo {
    /// Unnormalized Manhattan distance between all digits and their targets
    pub distance: u32,
}

impl From<DigitsInfo> for EnvInfo {
    fn from(info: DigitsInfo) -> Self {
        EnvInfo::new().with_extra("distance", info.distance as f32)
    }
}

/// Outcome of a typed step
#[derive(Clone, Debug)]
pub struct DigitsStep {
    pub observation: DigitsObservation,
    pub reward: f32,
    pub terminated: bool,
    /// Always false: time limits are applied by `TimeLimit`
    pub truncated: bool,
    pub info: DigitsInfo,
    /// Whether the move tried to leave the grid
    pub clipped: bool,
}

impl From<DigitsStep> for StepResult {
    fn from(step: DigitsStep) -> Self {
        StepResult {
            observation: step.observation.to_array(),
            reward: step.reward,
            terminated: step.terminated,
            truncated: step.truncated,
            info: step.info.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EpisodeState {
    NotStarted,
    Running,
    Terminated,
}

/// Digits puzzle environment
///
/// Grid is 7x4 for more than five digits, otherwise `(n + 2) x 3`.
/// Observation: digit positions followed by target positions.
/// Action: `4 * digit + direction` (RIGHT, UP, LEFT, DOWN).
pub struct DigitsPuzzle {
    config: DigitsConfig,
    width: i32,
    height: i32,
    digits_positions: Vec<Position>,
    target_positions: Vec<Position>,
    state: EpisodeState,
    rng: StdRng,
}

impl DigitsPuzzle {
    /// Create a puzzle, validating the configuration
    pub fn new(config: DigitsConfig) -> Result<Self> {
        config.validate()?;
        let (width, height) = config.grid_size();
        let target_positions = TARGET_POSITIONS[..config.n_digits].to_vec();

        Ok(Self {
            width,
            height,
            digits_positions: Vec::new(),
            target_positions,
            state: EpisodeState::NotStarted,
            rng: StdRng::from_entropy(),
            config,
        })
    }

    /// Create a puzzle with default rewards and `n_digits` digits
    pub fn with_digits(n_digits: usize) -> Result<Self> {
        Self::new(DigitsConfig::with_digits(n_digits))
    }

    pub fn config(&self) -> &DigitsConfig {
        &self.config
    }

    pub fn n_digits(&self) -> usize {
        self.config.n_digits
    }

    /// Grid width in cells
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Current digit positions (empty before the first reset)
    pub fn digits_positions(&self) -> &[Position] {
        &self.digits_positions
    }

    pub fn target_positions(&self) -> &[Position] {
        &self.target_positions
    }

    pub fn is_terminated(&self) -> bool {
        self.state == EpisodeState::Terminated
    }

    /// Number of discrete actions
    pub fn num_actions(&self) -> usize {
        NUM_DIRECTIONS * self.config.n_digits
    }

    /// Whether `p` lies on the outer ring of the grid
    pub fn is_on_border(&self, p: Position) -> bool {
        p.x == 0 || p.x == self.width - 1 || p.y == 0 || p.y == self.height - 1
    }

    fn in_bounds(&self, p: Position) -> bool {
        (0..self.width).contains(&p.x) && (0..self.height).contains(&p.y)
    }

    fn clamp(&self, p: Position) -> Position {
        Position::new(p.x.clamp(0, self.width - 1), p.y.clamp(0, self.height - 1))
    }

    /// All border cells, column by column
    pub fn border_cells(&self) -> Vec<Position> {
        (0..self.width)
            .flat_map(|x| (0..self.height).map(move |y| Position::new(x, y)))
            .filter(|&p| self.is_on_border(p))
            .collect()
    }

    /// Unnormalized Manhattan distance between positions and targets
    pub fn distance(&self) -> u32 {
        self.digits_positions
            .iter()
            .zip(&self.target_positions)
            .map(|(&p, &t)| p.manhattan(t))
            .sum()
    }

    /// Distance scaled by the grid's half-perimeter and the digit count
    pub fn normalized_distance(&self) -> f32 {
        self.distance() as f32
            / (self.width + self.height - 2) as f32
            / self.config.n_digits as f32
    }

    pub fn observation(&self) -> DigitsObservation {
        DigitsObservation {
            digits_positions: self.digits_positions.clone(),
            target_digits_positions: self.target_positions.clone(),
        }
    }

    pub fn info(&self) -> DigitsInfo {
        DigitsInfo {
            distance: self.distance(),
        }
    }

    /// Borrowed snapshot for renderers
    pub fn view(&self) -> GridView<'_> {
        GridView {
            width: self.width,
            height: self.height,
            digits: &self.digits_positions,
            targets: &self.target_positions,
        }
    }

    /// Rasterize the current state at the configured window size
    pub fn render_rgb(&self) -> Array3<u8> {
        render::rasterize(
            &self.view(),
            self.config.window_width,
            self.config.window_height,
        )
    }

    /// Start a new episode, drawing start cells from `rng`.
    ///
    /// Digits are placed on distinct border cells sampled without
    /// replacement.
    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (DigitsObservation, DigitsInfo) {
        let mut border = self.border_cells();
        border.shuffle(rng);
        self.place_digits(border)
    }

    /// Start a new episode, reseeding the internal random source if `seed`
    /// is given.
    pub fn reset_seeded(&mut self, seed: Option<u64>) -> (DigitsObservation, DigitsInfo) {
        if let Some(s) = seed {
            self.rng = StdRng::seed_from_u64(s);
        }
        let mut border = self.border_cells();
        border.shuffle(&mut self.rng);
        self.place_digits(border)
    }

    fn place_digits(&mut self, mut cells: Vec<Position>) -> (DigitsObservation, DigitsInfo) {
        cells.truncate(self.config.n_digits);
        self.digits_positions = cells;
        self.state = self.settled_state();

        tracing::debug!(
            n_digits = self.config.n_digits,
            positions = ?self.digits_positions,
            "Reset digits puzzle"
        );

        (self.observation(), self.info())
    }

    /// Start a new episode from explicit digit positions.
    ///
    /// Positions must be in bounds and pairwise distinct; the puzzle is left
    /// untouched otherwise.
    pub fn reset_to(&mut self, positions: &[Position]) -> Result<(DigitsObservation, DigitsInfo)> {
        if positions.len() != self.config.n_digits {
            return Err(PuzzleError::InvalidConfiguration(format!(
                "expected {} positions, got {}",
                self.config.n_digits,
                positions.len()
            )));
        }
        if let Some(p) = positions.iter().find(|&&p| !self.in_bounds(p)) {
            return Err(PuzzleError::InvalidConfiguration(format!(
                "position {p} outside {}x{} grid",
                self.width, self.height
            )));
        }
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != positions.len() {
            return Err(PuzzleError::InvalidConfiguration(
                "digit positions must be distinct".to_string(),
            ));
        }

        self.digits_positions = positions.to_vec();
        self.state = self.settled_state();
        Ok((self.observation(), self.info()))
    }

    fn settled_state(&self) -> EpisodeState {
        if self.digits_positions == self.target_positions {
            EpisodeState::Terminated
        } else {
            EpisodeState::Running
        }
    }

    /// Apply an integer action code
    pub fn try_step(&mut self, code: usize) -> Result<DigitsStep> {
        let action = DigitAction::decode(code, self.config.n_digits)?;
        self.apply(action)
    }

    /// Apply a decoded action.
    ///
    /// Fails without touching state if the digit does not exist or the
    /// episode is not running.
    pub fn apply(&mut self, action: DigitAction) -> Result<DigitsStep> {
        if action.digit >= self.config.n_digits {
            return Err(PuzzleError::InvalidAction(format!(
                "{action} moves digit {} but the puzzle has {}",
                action.digit, self.config.n_digits
            )));
        }
        if self.state != EpisodeState::Running {
            return Err(PuzzleError::ResetNeeded);
        }

        let (dx, dy) = action.direction.delta();
        let current = self.digits_positions[action.digit];
        let candidate = Position::new(current.x + dx, current.y + dy);
        let next = self.clamp(candidate);
        let clipped = candidate != next;

        self.digits_positions[action.digit] = next;

        let target = self.target_positions[action.digit];
        let (reward, terminated) = self.reward(current, next, target, clipped);
        if terminated {
            self.state = EpisodeState::Terminated;
            tracing::info!("Digits puzzle solved");
        }

        tracing::trace!(%action, from = %current, to = %next, clipped, reward, "Step");

        Ok(DigitsStep {
            observation: self.observation(),
            reward,
            terminated,
            truncated: false,
            info: self.info(),
            clipped,
        })
    }

    /// Reward for moving one digit from `current` to `next`.
    ///
    /// Must be called after the move has been applied.
    fn reward(&self, current: Position, next: Position, target: Position, clipped: bool) -> (f32, bool) {
        let rewards = &self.config.rewards;
        let terminated = self.digits_positions == self.target_positions;

        if terminated {
            return (rewards.terminate, true);
        }
        if self.config.reward_scheme() == RewardScheme::Sparse {
            return (0.0, false);
        }

        let mut reward = -self.normalized_distance();
        if clipped {
            reward += rewards.clipped;
        } else {
            let next_on_border = self.is_on_border(next);
            let current_on_border = self.is_on_border(current);

            if next_on_border && !current_on_border {
                reward += rewards.exit_target_area;
            } else if current_on_border && !next_on_border {
                reward += rewards.enter_target_area;
            } else if next == target {
                reward += rewards.reach_target_pos;
            } else if current == target {
                reward += rewards.leave_target_pos;
            }
        }

        (reward, false)
    }

    fn observation_box(&self) -> DynSpace {
        DynSpace::Box(BoxSpace::columns(
            self.config.n_digits,
            &[(self.width - 1) as f32, (self.height - 1) as f32],
        ))
    }
}

impl PuzzleEnv for DigitsPuzzle {
    fn observation_space(&self) -> DynSpace {
        DynSpace::Dict(Dict::from_pairs(vec![
            ("digits_positions", self.observation_box()),
            ("target_digits_positions", self.observation_box()),
        ]))
    }

    fn action_space(&self) -> DynSpace {
        DynSpace::Discrete(Discrete::new(self.num_actions()))
    }

    fn reset(&mut self, seed: Option<u64>) -> (ArrayD<f32>, EnvInfo) {
        let (obs, info) = self.reset_seeded(seed);
        (obs.to_array(), info.into())
    }

    fn step(&mut self, action: &ArrayD<f32>) -> Result<StepResult> {
        let code = discrete_action(action, self.num_actions())?;
        self.try_step(code).map(StepResult::from)
    }

    fn render(&self) -> Option<String> {
        Some(render::ansi(&self.view()))
    }

    fn is_done(&self) -> bool {
        self.is_terminated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Direction;
    use crate::config::RewardConfig;

    fn code(digit: usize, direction: Direction) -> usize {
        DigitAction::new(digit, direction).code()
    }

    #[test]
    fn test_digits_creation() {
        let env = DigitsPuzzle::with_digits(3).unwrap();
        assert_eq!((env.width(), env.height()), (5, 3));
        assert_eq!(env.num_actions(), 12);
        assert_eq!(
            env.target_positions(),
            &[Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)]
        );
    }

    #[test]
    fn test_invalid_digit_count() {
        assert!(matches!(
            DigitsPuzzle::with_digits(0),
            Err(PuzzleError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DigitsPuzzle::with_digits(11),
            Err(PuzzleError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_border_cells() {
        let env = DigitsPuzzle::with_digits(10).unwrap();
        let border = env.border_cells();
        // 7x4 grid: 28 cells, 10 interior
        assert_eq!(border.len(), 18);
        assert_eq!(border[0], Position::new(0, 0));
        assert!(border.iter().all(|&p| env.is_on_border(p)));
    }

    #[test]
    fn test_reset_places_on_border() {
        let mut env = DigitsPuzzle::with_digits(4).unwrap();
        let (obs, info) = env.reset_seeded(Some(42));

        assert_eq!(obs.digits_positions.len(), 4);
        assert!(obs.digits_positions.iter().all(|&p| env.is_on_border(p)));
        assert_eq!(info.distance, env.distance());
    }

    #[test]
    fn test_reset_is_deterministic_for_seed() {
        let mut a = DigitsPuzzle::with_digits(10).unwrap();
        let mut b = DigitsPuzzle::with_digits(10).unwrap();
        assert_eq!(a.reset_seeded(Some(7)).0, b.reset_seeded(Some(7)).0);
    }

    #[test]
    fn test_step_before_reset() {
        let mut env = DigitsPuzzle::with_digits(2).unwrap();
        assert!(matches!(env.try_step(0), Err(PuzzleError::ResetNeeded)));
    }

    #[test]
    fn test_invalid_action_leaves_state() {
        let mut env = DigitsPuzzle::with_digits(2).unwrap();
        env.reset_seeded(Some(1));
        let before = env.digits_positions().to_vec();

        assert!(matches!(env.try_step(8), Err(PuzzleError::InvalidAction(_))));
        assert!(matches!(
            env.apply(DigitAction::new(2, Direction::Up)),
            Err(PuzzleError::InvalidAction(_))
        ));
        assert_eq!(env.digits_positions(), before.as_slice());
    }

    #[test]
    fn test_enter_target_area_beats_reach_target() {
        let mut env = DigitsPuzzle::with_digits(10).unwrap();
        let mut start = TARGET_POSITIONS.to_vec();
        start[0] = Position::new(0, 1);
        // digit 9 off target so the move does not terminate
        start[9] = Position::new(6, 2);
        env.reset_to(&start).unwrap();

        let step = env.try_step(code(0, Direction::Right)).unwrap();

        assert_eq!(env.digits_positions()[0], Position::new(1, 1));
        assert!(!step.terminated);
        // remaining distance 1, normalized by (7 + 4 - 2) * 10
        let expected = -1.0 / 9.0 / 10.0 + 0.1;
        assert!((step.reward - expected).abs() < 1e-6);
    }

    #[test]
    fn test_exit_target_area_beats_leave_target() {
        let config = DigitsConfig {
            rewards: RewardConfig {
                leave_target_pos: -5.0,
                ..RewardConfig::default()
            },
            ..DigitsConfig::with_digits(2)
        };
        let mut env = DigitsPuzzle::new(config).unwrap();
        // digit 0 sits on its target (1, 1)
        env.reset_to(&[Position::new(1, 1), Position::new(3, 0)]).unwrap();

        let step = env.try_step(code(0, Direction::Up)).unwrap();
        assert_eq!(env.digits_positions()[0], Position::new(1, 0));
        // distances 1 + 2 over (4 + 3 - 2) * 2
        let expected = -3.0 / 5.0 / 2.0 - 1.0;
        assert!((step.reward - expected).abs() < 1e-6);
    }

    #[test]
    fn test_solved_episode_needs_reset() {
        let mut env = DigitsPuzzle::with_digits(1).unwrap();
        env.reset_to(&[Position::new(1, 0)]).unwrap();
        let step = env.try_step(code(0, Direction::Down)).unwrap();
        assert!(step.terminated);

        assert!(matches!(
            env.try_step(code(0, Direction::Up)),
            Err(PuzzleError::ResetNeeded)
        ));
        assert_eq!(env.digits_positions(), &[Position::new(1, 1)]);

        env.reset_seeded(Some(5));
        assert!(!env.is_terminated());
        assert!(env.try_step(code(0, Direction::Up)).is_ok());
    }

    #[test]
    fn test_terminate_reward() {
        let mut env = DigitsPuzzle::with_digits(2).unwrap();
        env.reset_to(&[Position::new(1, 1), Position::new(3, 1)]).unwrap();

        let step = env.try_step(code(1, Direction::Left)).unwrap();
        assert!(step.terminated);
        assert!(!step.truncated);
        assert_eq!(step.reward, 10.0);
        assert_eq!(step.info.distance, 0);
        assert!(env.is_done());
    }

    #[test]
    fn test_clipped_penalty() {
        let mut env = DigitsPuzzle::with_digits(2).unwrap();
        env.reset_to(&[Position::new(0, 0), Position::new(3, 2)]).unwrap();

        let step = env.try_step(code(0, Direction::Up)).unwrap();
        assert!(step.clipped);
        assert_eq!(env.digits_positions()[0], Position::new(0, 0));

        // distance: digit0 (0,0)->(1,1) = 2, digit1 (3,2)->(2,1) = 2
        let expected = -4.0 / 5.0 / 2.0 - 1.0;
        assert!((step.reward - expected).abs() < 1e-6);
    }

    #[test]
    fn test_reach_and_leave_target_inside_area() {
        let mut env = DigitsPuzzle::with_digits(3).unwrap();
        // 5x3 grid, interior row y=1 from x=1..=3
        env.reset_to(&[Position::new(2, 1), Position::new(0, 1), Position::new(4, 0)])
            .unwrap();

        // digit 0 at (2,1) moves left onto (1,1): its target
        let step = env.try_step(code(0, Direction::Left)).unwrap();
        let distance_term = -(env.distance() as f32) / 6.0 / 3.0;
        assert!((step.reward - (distance_term + 0.2)).abs() < 1e-6);

        // and back off it
        let step = env.try_step(code(0, Direction::Right)).unwrap();
        let distance_term = -(env.distance() as f32) / 6.0 / 3.0;
        assert!((step.reward - (distance_term - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_border_to_border_no_bonus() {
        let mut env = DigitsPuzzle::with_digits(1).unwrap();
        env.reset_to(&[Position::new(0, 0)]).unwrap();

        let step = env.try_step(code(0, Direction::Right)).unwrap();
        assert!(!step.clipped);
        // (1,0) -> (1,1) distance 1, normalized by 4 * 1
        assert!((step.reward - (-0.25)).abs() < 1e-6);
    }

    #[test]
    fn test_sparse_scheme() {
        let config = DigitsConfig {
            reward_scheme: Some(RewardScheme::Sparse),
            ..DigitsConfig::with_digits(1)
        };
        let mut env = DigitsPuzzle::new(config).unwrap();
        env.reset_to(&[Position::new(0, 0)]).unwrap();

        assert_eq!(env.try_step(code(0, Direction::Up)).unwrap().reward, 0.0);
        assert_eq!(env.try_step(code(0, Direction::Right)).unwrap().reward, 0.0);
        let last = env.try_step(code(0, Direction::Down)).unwrap();
        assert!(last.terminated);
        assert_eq!(last.reward, 10.0);
    }

    #[test]
    fn test_reset_to_validation() {
        let mut env = DigitsPuzzle::with_digits(2).unwrap();
        assert!(env.reset_to(&[Position::new(0, 0)]).is_err());
        assert!(env
            .reset_to(&[Position::new(0, 0), Position::new(0, 0)])
            .is_err());
        assert!(env
            .reset_to(&[Position::new(0, 0), Position::new(4, 3)])
            .is_err());
        assert!(env.digits_positions().is_empty());
    }

    #[test]
    fn test_trait_roundtrip() {
        let mut env = DigitsPuzzle::with_digits(3).unwrap();
        let (obs, info) = PuzzleEnv::reset(&mut env, Some(3));

        assert_eq!(obs.len(), 12);
        assert!(env.observation_space().contains(&obs));
        assert_eq!(info.get("distance"), Some(env.distance() as f32));

        let action = ArrayD::from_elem(IxDyn(&[1]), 4.0);
        let result = PuzzleEnv::step(&mut env, &action).unwrap();
        assert!(env.observation_space().contains(&result.observation));
        assert!(!result.truncated);

        let bad = ArrayD::from_elem(IxDyn(&[1]), 12.0);
        assert!(PuzzleEnv::step(&mut env, &bad).is_err());
    }

    #[test]
    fn test_render_text() {
        let mut env = DigitsPuzzle::with_digits(1).unwrap();
        env.reset_to(&[Position::new(0, 0)]).unwrap();
        let text = env.render().unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with('0'));
    }
}
