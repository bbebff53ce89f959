use rand::seq::SliceRandom;
use rand::Rng;

/// Indices of the training and validation subsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

impl Split {
    /// Shuffle `0..len` and hold out `ceil(len * (1 - train_fraction))` for validation
    pub fn new<R: Rng + ?Sized>(len: usize, train_fraction: f64, rng: &mut R) -> Self {
        let train_fraction = train_fraction.clamp(0.0, 1.0);

        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);

        // Tolerance absorbs float error in `1 - train_fraction`
        let validation_len =
            ((len as f64) * (1.0 - train_fraction) - 1e-9).ceil().max(0.0) as usize;
        let validation_len = validation_len.min(len);

        let train = indices.split_off(validation_len);
        Self {
            train,
            validation: indices,
        }
    }
}
