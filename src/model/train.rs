use crate::dataset::tensor::batch_to_nchw;
use crate::dataset::{Dataset, Split};
use crate::error::EnhanceError;
use burn::module::{AutodiffModule, Module};
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor, TensorData};
use image::Rgb32FImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use super::network::EnhanceNet;

/// Hyper-parameters for one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Share of pairs used for training; the rest is held out for validation
    pub train_fraction: f64,
    /// Seed for the split and for per-epoch batch shuffling
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 16,
            learning_rate: 1e-4,
            train_fraction: 0.8,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub train_loss: f64,
    /// Absent when the validation subset is empty
    pub validation_loss: Option<f64>,
    pub time_ms: u64,
}

/// Per-epoch losses of a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub config: Option<TrainingConfig>,
    pub epochs: Vec<EpochStats>,
}

impl TrainingHistory {
    pub fn final_train_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.train_loss)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), EnhanceError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EnhanceError::Internal(format!("Failed to serialize history: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Build a `[n, 3, h, w]` tensor from images of identical size
pub fn batch_tensor<B: Backend>(images: &[&Rgb32FImage], device: &B::Device) -> Tensor<B, 4> {
    let (width, height) = images
        .first()
        .map(|img| img.dimensions())
        .unwrap_or((0, 0));
    let data = TensorData::new(
        batch_to_nchw(images.iter().copied()),
        [images.len(), 3, height as usize, width as usize],
    );
    Tensor::from_data(data, device)
}

/// Fit a fresh network on the training subset, scoring the validation subset each epoch
pub fn train<B: AutodiffBackend>(
    dataset: &Dataset,
    split: &Split,
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<(EnhanceNet<B>, TrainingHistory), EnhanceError> {
    if split.train.is_empty() {
        return Err(EnhanceError::Training("training subset is empty".to_string()));
    }
    if config.batch_size == 0 {
        return Err(EnhanceError::Training("batch size must be at least 1".to_string()));
    }

    let mut model = EnhanceNet::<B>::new(device);
    let mut optim = AdamConfig::new().init::<B, EnhanceNet<B>>();
    let loss_fn = MseLoss::new();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut order = split.train.clone();
    let mut history = TrainingHistory {
        config: Some(*config),
        epochs: Vec::with_capacity(config.epochs),
    };

    tracing::info!(
        "Training {} params on {} pairs ({} validation) for {} epochs",
        model.num_params(),
        split.train.len(),
        split.validation.len(),
        config.epochs
    );

    for epoch in 1..=config.epochs {
        let epoch_start = Instant::now();
        order.shuffle(&mut rng);

        let mut loss_sum = 0.0f64;
        for chunk in order.chunks(config.batch_size) {
            let (lows, highs) = gather(dataset, chunk)?;
            let inputs = batch_tensor::<B>(&lows, device);
            let targets = batch_tensor::<B>(&highs, device);

            let output = model.forward(inputs);
            let loss = loss_fn.forward(output, targets, Reduction::Mean);
            loss_sum += loss.clone().into_scalar().elem::<f64>() * chunk.len() as f64;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }
        let train_loss = loss_sum / order.len() as f64;

        let validation_loss = if split.validation.is_empty() {
            None
        } else {
            Some(evaluate(
                &model.valid(),
                dataset,
                &split.validation,
                config.batch_size,
                device,
            )?)
        };

        let stats = EpochStats {
            epoch,
            train_loss,
            validation_loss,
            time_ms: epoch_start.elapsed().as_millis() as u64,
        };
        match stats.validation_loss {
            Some(val) => tracing::info!(
                "Epoch {}/{}: loss {:.6}, val_loss {:.6} ({}ms)",
                epoch,
                config.epochs,
                train_loss,
                val,
                stats.time_ms
            ),
            None => tracing::info!(
                "Epoch {}/{}: loss {:.6} ({}ms)",
                epoch,
                config.epochs,
                train_loss,
                stats.time_ms
            ),
        }
        history.epochs.push(stats);
    }

    Ok((model, history))
}

/// Mean squared error of `model` over the given pair indices
pub fn evaluate<B: Backend>(
    model: &EnhanceNet<B>,
    dataset: &Dataset,
    indices: &[usize],
    batch_size: usize,
    device: &B::Device,
) -> Result<f64, EnhanceError> {
    if indices.is_empty() {
        return Err(EnhanceError::Training("nothing to evaluate".to_string()));
    }

    let loss_fn = MseLoss::new();
    let mut loss_sum = 0.0f64;
    for chunk in indices.chunks(batch_size.max(1)) {
        let (lows, highs) = gather(dataset, chunk)?;
        let output = model.forward(batch_tensor::<B>(&lows, device));
        let loss = loss_fn.forward(output, batch_tensor::<B>(&highs, device), Reduction::Mean);
        loss_sum += loss.into_scalar().elem::<f64>() * chunk.len() as f64;
    }
    Ok(loss_sum / indices.len() as f64)
}

fn gather<'a>(
    dataset: &'a Dataset,
    indices: &[usize],
) -> Result<(Vec<&'a Rgb32FImage>, Vec<&'a Rgb32FImage>), EnhanceError> {
    let mut lows = Vec::with_capacity(indices.len());
    let mut highs = Vec::with_capacity(indices.len());
    for &i in indices {
        let pair = dataset.get(i).ok_or_else(|| {
            EnhanceError::Training(format!(
                "split index {} outside dataset of {}",
                i,
                dataset.len()
            ))
        })?;
        lows.push(&pair.low);
        highs.push(&pair.high);
    }
    Ok((lows, highs))
}
