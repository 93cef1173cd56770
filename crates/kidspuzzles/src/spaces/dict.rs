//! Dict (dictionary) observation/action space

use super::{DynSpace, Space};
use ndarray::ArrayD;
use rand::Rng;
use std::collections::BTreeMap;

/// Dictionary space containing named sub-spaces.
///
/// Sub-spaces are kept sorted by name; flattened samples concatenate the
/// sub-spaces in that order.
#[derive(Clone, Debug)]
pub struct Dict {
    /// Named sub-spaces
    pub spaces: BTreeMap<String, DynSpace>,
    /// Total flattened shape (sum of all sub-space sizes)
    shape: Vec<usize>,
}

impl Dict {
    /// Create a new dict space
    pub fn new(spaces: BTreeMap<String, DynSpace>) -> Self {
        let total: usize = spaces.values().map(DynSpace::flat_size).sum();
        Self {
            spaces,
            shape: vec![total],
        }
    }

    /// Create from a list of (name, space) pairs
    pub fn from_pairs(pairs: Vec<(&str, DynSpace)>) -> Self {
        let spaces = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::new(spaces)
    }

    /// Get a sub-space by name
    pub fn get(&self, name: &str) -> Option<&DynSpace> {
        self.spaces.get(name)
    }

    /// Sub-space names in flattening order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.spaces.keys()
    }

    /// (name, sub-space) pairs in flattening order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DynSpace)> {
        self.spaces.iter()
    }
}

impl Space for Dict {
    type Sample = BTreeMap<String, ArrayD<f32>>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.spaces
            .iter()
            .map(|(k, v)| (k.clone(), v.sample(rng)))
            .collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.len() == self.spaces.len()
            && self.spaces.iter().all(|(k, space)| {
                value
                    .get(k)
                    .map(|v| space.contains(v))
                    .unwrap_or(false)
            })
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
