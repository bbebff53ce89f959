//! Fixed parameters for every enhancement stage
//!
//! One immutable record is built per run and handed to the pipeline.
//! Defaults reproduce the constants the model was designed around.

use crate::error::{EnhanceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Non-local-means denoising strengths and window sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseParams {
    /// Filter strength for the luminance channel
    pub h: f32,
    /// Filter strength for the chrominance channels
    pub h_color: f32,
    /// Side of the square patch compared between pixels (odd)
    pub template_window: u32,
    /// Side of the square region searched for similar patches (odd)
    pub search_window: u32,
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            h: 10.0,
            h_color: 10.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

/// Luminance histogram equalization
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizeParams {
    /// Skip the stage entirely
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GammaParams {
    pub gamma: f32,
}

impl Default for GammaParams {
    fn default() -> Self {
        Self { gamma: 1.2 }
    }
}

/// Unsharp mask: `image_weight * image + blur_weight * gaussian(image, sigma)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenParams {
    pub sigma: f32,
    pub image_weight: f32,
    pub blur_weight: f32,
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self {
            sigma: 3.0,
            image_weight: 1.5,
            blur_weight: -0.5,
        }
    }
}

/// Canny thresholds and the weights used to overlay the edge map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub low_threshold: f32,
    pub high_threshold: f32,
    pub image_weight: f32,
    pub edge_weight: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 100.0,
            high_threshold: 200.0,
            image_weight: 0.8,
            edge_weight: 0.2,
        }
    }
}

/// Parameters for the whole five-stage pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    pub denoise: DenoiseParams,
    pub equalize: EqualizeParams,
    pub gamma: GammaParams,
    pub sharpen: SharpenParams,
    pub edges: EdgeParams,
}

impl EnhanceParams {
    /// Load overrides from a JSON file; omitted fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&raw).map_err(|e| {
            EnhanceError::InvalidParams(format!("{}: {}", path.display(), e))
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.denoise;
        if d.h <= 0.0 || d.h_color <= 0.0 {
            return Err(EnhanceError::InvalidParams(
                "denoise strengths must be positive".to_string(),
            ));
        }
        if d.template_window == 0 || d.template_window % 2 == 0 {
            return Err(EnhanceError::InvalidParams(format!(
                "template window must be odd, got {}",
                d.template_window
            )));
        }
        if d.search_window == 0 || d.search_window % 2 == 0 {
            return Err(EnhanceError::InvalidParams(format!(
                "search window must be odd, got {}",
                d.search_window
            )));
        }
        if d.search_window < d.template_window {
            return Err(EnhanceError::InvalidParams(format!(
                "search window {} is smaller than template window {}",
                d.search_window, d.template_window
            )));
        }
        if !(self.gamma.gamma > 0.0) {
            return Err(EnhanceError::InvalidParams(format!(
                "gamma must be positive, got {}",
                self.gamma.gamma
            )));
        }
        if !(self.sharpen.sigma > 0.0) {
            return Err(EnhanceError::InvalidParams(format!(
                "sharpen sigma must be positive, got {}",
                self.sharpen.sigma
            )));
        }
        if self.edges.low_threshold > self.edges.high_threshold {
            return Err(EnhanceError::InvalidParams(format!(
                "canny low threshold {} exceeds high threshold {}",
                self.edges.low_threshold, self.edges.high_threshold
            )));
        }
        Ok(())
    }
}
