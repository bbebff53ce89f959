//! Paired low/high resolution dataset construction
//!
//! The high-resolution member of each pair is the enhanced source image; the
//! low-resolution member is the same image pushed through a fixed
//! downscale/upscale round trip.

pub mod builder;
pub mod split;
pub mod tensor;

pub use builder::{build_dataset, degrade, make_pair, normalize};
pub use split::Split;

use crate::error::EnhanceError;
use image::Rgb32FImage;
use std::path::PathBuf;

/// Sizes used when building pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Final (width, height) of both pair members
    pub target_size: (u32, u32),
    /// Intermediate (width, height) of the degradation round trip
    pub low_res_size: (u32, u32),
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            target_size: (128, 128),
            low_res_size: (64, 64),
        }
    }
}

/// One training example; both images share dimensions and lie in `[0, 1]`
#[derive(Debug, Clone)]
pub struct SamplePair {
    pub source: PathBuf,
    pub low: Rgb32FImage,
    pub high: Rgb32FImage,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: EnhanceError,
}

/// What happened to every file in the source folder
#[derive(Debug, Default)]
pub struct BuildReport {
    pub loaded: usize,
    /// Files that could not be decoded
    pub skipped: Vec<SkippedFile>,
    /// Files that decoded but were rejected by the enhancement pipeline
    pub failed: Vec<FailedFile>,
}

#[derive(Debug, Default)]
pub struct Dataset {
    pub pairs: Vec<SamplePair>,
    pub report: BuildReport,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SamplePair> {
        self.pairs.get(index)
    }

    /// Partition pair indices into training and validation subsets
    pub fn split<R: rand::Rng + ?Sized>(&self, train_fraction: f64, rng: &mut R) -> Split {
        Split::new(self.len(), train_fraction, rng)
    }
}
