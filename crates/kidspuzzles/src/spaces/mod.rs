//! Observation and action space types.
//!
//! Provides Gymnasium-compatible space definitions for reinforcement learning.

mod r#box;
mod dict;
mod discrete;

pub use dict::Dict;
pub use discrete::Discrete;
pub use r#box::Box;

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}

/// Enum for dynamic space types
#[derive(Clone, Debug)]
pub enum DynSpace {
    Discrete(Discrete),
    Box(Box),
    Dict(Dict),
}

impl DynSpace {
    /// Get the shape of this space
    pub fn shape(&self) -> Vec<usize> {
        match self {
            DynSpace::Discrete(s) => s.shape().to_vec(),
            DynSpace::Box(s) => s.shape().to_vec(),
            DynSpace::Dict(s) => s.shape().to_vec(),
        }
    }

    /// Number of `f32` elements in a flattened sample
    pub fn flat_size(&self) -> usize {
        match self {
            DynSpace::Discrete(s) => s.num_elements(),
            DynSpace::Box(s) => s.num_elements(),
            DynSpace::Dict(s) => s.num_elements(),
        }
    }

    /// Sample from this space, flattened for dict spaces
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ArrayD<f32> {
        match self {
            DynSpace::Discrete(s) => {
                let v = s.sample(rng);
                ArrayD::from_elem(IxDyn(&[1]), v as f32)
            }
            DynSpace::Box(s) => s.sample(rng),
            DynSpace::Dict(s) => {
                let flattened: Vec<f32> = s
                    .sample(rng)
                    .into_values()
                    .flat_map(|v| v.into_iter())
                    .collect();
                ArrayD::from_shape_vec(IxDyn(&[flattened.len()]), flattened)
                    .expect("flat vector always matches its own length")
            }
        }
    }

    /// Check if this space contains the value.
    ///
    /// Dict spaces expect the flattened layout produced by `sample`.
    pub fn contains(&self, value: &ArrayD<f32>) -> bool {
        match self {
            DynSpace::Box(s) => s.contains(value),
            _ => {
                let flat: Vec<f32> = value.iter().copied().collect();
                flat.len() == self.flat_size() && self.contains_flat(&flat)
            }
        }
    }

    fn contains_flat(&self, values: &[f32]) -> bool {
        match self {
            DynSpace::Discrete(s) => {
                let v = values[0];
                v >= 0.0 && v.fract() == 0.0 && s.contains(&(v as usize))
            }
            DynSpace::Box(s) => s.contains_flat(values),
            DynSpace::Dict(s) => {
                let mut offset = 0;
                s.iter().all(|(_, sub)| {
                    let len = sub.flat_size();
                    let ok = sub.contains_flat(&values[offset..offset + len]);
                    offset += len;
                    ok
                })
            }
        }
    }
}
