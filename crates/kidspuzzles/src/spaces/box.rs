//! Box observation/action space

use super::Space;
use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Box space of values with inclusive per-element bounds
#[derive(Clone, Debug)]
pub struct Box {
    /// Lower bound for each element
    pub low: ArrayD<f32>,
    /// Upper bound for each element
    pub high: ArrayD<f32>,
    shape: Vec<usize>,
}

impl Box {
    /// Create a new box space with given bounds
    pub fn new(low: ArrayD<f32>, high: ArrayD<f32>) -> Self {
        assert_eq!(low.shape(), high.shape(), "Low and high must have same shape");
        assert!(
            low.iter().zip(high.iter()).all(|(l, h)| l <= h),
            "Low must not exceed high"
        );
        let shape = low.shape().to_vec();
        Self { low, high, shape }
    }

    /// Create a box space with uniform bounds
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        let low_arr = ArrayD::from_elem(IxDyn(shape), low);
        let high_arr = ArrayD::from_elem(IxDyn(shape), high);
        Self::new(low_arr, high_arr)
    }

    /// Create a `[rows, highs.len()]` box starting at zero where column `j`
    /// is bounded above by `highs[j]`.
    ///
    /// Used for lists of grid coordinates, e.g. `highs = [W - 1, H - 1]`.
    pub fn columns(rows: usize, highs: &[f32]) -> Self {
        let cols = highs.len();
        let low = ArrayD::zeros(IxDyn(&[rows, cols]));
        let high = ArrayD::from_shape_fn(IxDyn(&[rows, cols]), |idx| highs[idx[1]]);
        Self::new(low, high)
    }

    pub(crate) fn contains_flat(&self, values: &[f32]) -> bool {
        values.len() == self.low.len()
            && values
                .iter()
                .zip(self.low.iter())
                .zip(self.high.iter())
                .all(|((&v, &l), &h)| v >= l && v <= h)
    }
}

impl Space for Box {
    type Sample = ArrayD<f32>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        let mut result = ArrayD::zeros(IxDyn(&self.shape));
        for ((&l, &h), r) in self
            .low
            .iter()
            .zip(self.high.iter())
            .zip(result.iter_mut())
        {
            *r = Uniform::new_inclusive(l, h).sample(rng);
        }
        result
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.shape() == self.low.shape()
            && value
                .iter()
                .zip(self.low.iter())
                .zip(self.high.iter())
                .all(|((&v, &l), &h)| v >= l && v <= h)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_box_sample() {
        let space = Box::uniform(&[3, 4], -1.0, 1.0);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng);
            assert!(space.contains(&sample));
            assert_eq!(sample.shape(), &[3, 4]);
        }
    }

    #[test]
    fn test_box_columns() {
        // 7 x 4 grid, three coordinates
        let space = Box::columns(3, &[6.0, 3.0]);
        assert_eq!(space.shape(), &[3, 2]);

        let inside = ArrayD::from_shape_vec(IxDyn(&[3, 2]), vec![6.0, 3.0, 0.0, 0.0, 1.0, 2.0])
            .unwrap();
        let outside = ArrayD::from_shape_vec(IxDyn(&[3, 2]), vec![6.0, 4.0, 0.0, 0.0, 1.0, 2.0])
            .unwrap();
        assert!(space.contains(&inside));
        assert!(!space.contains(&outside));
    }

    #[test]
    fn test_box_degenerate_bounds_sample() {
        let space = Box::uniform(&[2], 1.0, 1.0);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let sample = space.sample(&mut rng);
        assert!(sample.iter().all(|&v| v == 1.0));
    }
}
