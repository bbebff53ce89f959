//! Convolutional regression model, its training loop and inference
//!
//! Tensor math, autodiff and the optimizer come from `burn`; this module only
//! fixes the topology, feeds it batches and persists the weights.

pub mod infer;
pub mod network;
pub mod train;

pub use infer::{predict, Enhancer};
pub use network::EnhanceNet;
pub use train::{train, EpochStats, TrainingConfig, TrainingHistory};

use crate::error::EnhanceError;
use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::Backend;
use std::path::{Path, PathBuf};

/// CPU backend used for inference
pub type InferBackend = NdArray<f32>;
/// CPU backend with gradient tracking used for training
pub type TrainBackend = Autodiff<InferBackend>;

/// Extension the recorder forces onto model files
pub const MODEL_EXTENSION: &str = "mpk";

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// Path the model is actually stored at (the recorder replaces the extension)
pub fn model_file(path: &Path) -> PathBuf {
    path.with_extension(MODEL_EXTENSION)
}

/// Persist weights and return the file written
pub fn save_model<B: Backend>(model: EnhanceNet<B>, path: &Path) -> Result<PathBuf, EnhanceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    model
        .save_file(path.to_path_buf(), &recorder())
        .map_err(|e| EnhanceError::Model(format!("Failed to save {}: {:?}", path.display(), e)))?;
    Ok(model_file(path))
}

pub fn load_model<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<EnhanceNet<B>, EnhanceError> {
    let file = model_file(path);
    if !file.is_file() {
        return Err(EnhanceError::Model(format!(
            "Model file not found: {}",
            file.display()
        )));
    }
    EnhanceNet::<B>::new(device)
        .load_file(file, &recorder(), device)
        .map_err(|e| EnhanceError::Model(format!("Failed to load {}: {:?}", path.display(), e)))
}
