//! Action codec for the digits puzzle.
//!
//! Action codes pack a digit index and a direction as
//! `4 * digit + direction`, with directions ordered RIGHT, UP, LEFT, DOWN.
//! Names such as `RIGHT0` or `DOWN9` round-trip through `Display`/`FromStr`.

use kidspuzzles::{PuzzleError, Result};
use std::fmt;
use std::str::FromStr;

/// Number of directions each digit can move in
pub const NUM_DIRECTIONS: usize = 4;

/// Movement direction on the grid (y grows downwards)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    /// All directions in action-code order
    pub const ALL: [Direction; NUM_DIRECTIONS] =
        [Direction::Right, Direction::Up, Direction::Left, Direction::Down];

    /// Unit step as (dx, dy)
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Up => 1,
            Direction::Left => 2,
            Direction::Down => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Right => "RIGHT",
            Direction::Up => "UP",
            Direction::Left => "LEFT",
            Direction::Down => "DOWN",
        }
    }
}

/// A decoded action: move one digit one cell in one direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DigitAction {
    pub digit: usize,
    pub direction: Direction,
}

impl DigitAction {
    pub fn new(digit: usize, direction: Direction) -> Self {
        Self { digit, direction }
    }

    /// Decode an action code for a puzzle with `n_digits` digits
    pub fn decode(code: usize, n_digits: usize) -> Result<Self> {
        if code >= NUM_DIRECTIONS * n_digits {
            return Err(PuzzleError::InvalidAction(format!(
                "action {code} out of range [0, {})",
                NUM_DIRECTIONS * n_digits
            )));
        }
        Ok(Self {
            digit: code / NUM_DIRECTIONS,
            direction: Direction::ALL[code % NUM_DIRECTIONS],
        })
    }

    /// Integer code of this action
    pub fn code(self) -> usize {
        self.digit * NUM_DIRECTIONS + self.direction.index()
    }

    /// Every action of a puzzle with `n_digits` digits, in code order
    pub fn all(n_digits: usize) -> impl Iterator<Item = DigitAction> {
        (0..n_digits).flat_map(|digit| {
            Direction::ALL
                .into_iter()
                .map(move |direction| DigitAction::new(digit, direction))
        })
    }
}

impl fmt::Display for DigitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.name(), self.digit)
    }
}

impl FromStr for DigitAction {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let split = upper
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| PuzzleError::InvalidAction(format!("missing digit in '{s}'")))?;
        let (name, digit) = upper.split_at(split);

        let direction = Direction::ALL
            .into_iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| PuzzleError::InvalidAction(format!("unknown direction in '{s}'")))?;
        let digit = digit
            .parse::<usize>()
            .map_err(|_| PuzzleError::InvalidAction(format!("bad digit in '{s}'")))?;

        Ok(Self { digit, direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_layout() {
        let a = DigitAction::decode(0, 10).unwrap();
        assert_eq!(a, DigitAction::new(0, Direction::Right));

        let a = DigitAction::decode(5, 10).unwrap();
        assert_eq!(a, DigitAction::new(1, Direction::Up));

        let a = DigitAction::decode(39, 10).unwrap();
        assert_eq!(a, DigitAction::new(9, Direction::Down));
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        assert!(DigitAction::decode(4, 1).is_err());
        assert!(DigitAction::decode(40, 10).is_err());
    }

    #[test]
    fn test_all_matches_codes() {
        let actions: Vec<_> = DigitAction::all(3).collect();
        assert_eq!(actions.len(), 12);
        for (code, action) in actions.iter().enumerate() {
            assert_eq!(action.code(), code);
        }
    }

    #[test]
    fn test_direction_deltas() {
        assert_eq!(Direction::Right.delta(), (1, 0));
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Down.delta(), (0, 1));
    }

    #[test]
    fn test_names() {
        assert_eq!(DigitAction::new(0, Direction::Right).to_string(), "RIGHT0");
        assert_eq!(DigitAction::new(7, Direction::Left).to_string(), "LEFT7");

        assert_eq!(
            "up3".parse::<DigitAction>().unwrap(),
            DigitAction::new(3, Direction::Up)
        );
        assert_eq!(
            " DOWN12 ".parse::<DigitAction>().unwrap(),
            DigitAction::new(12, Direction::Down)
        );
        assert!("JUMP1".parse::<DigitAction>().is_err());
        assert!("LEFT".parse::<DigitAction>().is_err());
        assert!("LEFT1x".parse::<DigitAction>().is_err());
    }
}
