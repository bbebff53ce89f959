use crate::dataset::tensor::{from_chw, to_rgb8, CHANNELS};
use crate::dataset::{degrade, normalize, DatasetConfig};
use crate::dataset::builder::RESIZE_FILTER;
use crate::error::EnhanceError;
use burn::tensor::backend::Backend;
use image::{imageops, DynamicImage, Rgb32FImage, RgbImage};
use std::path::{Path, PathBuf};

use super::network::EnhanceNet;
use super::train::batch_tensor;
use super::{load_model, model_file, InferBackend};

/// Run the model on images of identical size; outputs are clipped to `[0, 1]`
pub fn predict<B: Backend>(
    model: &EnhanceNet<B>,
    images: &[&Rgb32FImage],
    device: &B::Device,
) -> Result<Vec<Rgb32FImage>, EnhanceError> {
    let Some(first) = images.first() else {
        return Ok(Vec::new());
    };
    let (width, height) = first.dimensions();
    if images.iter().any(|img| img.dimensions() != (width, height)) {
        return Err(EnhanceError::InvalidImage(
            "all images in a batch must share dimensions".to_string(),
        ));
    }

    let output = model
        .forward(batch_tensor::<B>(images, device))
        .clamp(0.0, 1.0);
    let values = output
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| EnhanceError::Model(format!("Failed to read model output: {:?}", e)))?;

    let per_image = CHANNELS * width as usize * height as usize;
    values
        .chunks(per_image)
        .map(|chunk| {
            from_chw(chunk, width, height)
                .ok_or_else(|| EnhanceError::Model("model output has wrong shape".to_string()))
        })
        .collect()
}

/// A loaded model plus the preprocessing it was trained with
pub struct Enhancer {
    model: EnhanceNet<InferBackend>,
    device: <InferBackend as Backend>::Device,
    config: DatasetConfig,
    model_path: PathBuf,
}

impl Enhancer {
    pub fn load(path: &Path, config: DatasetConfig) -> Result<Self, EnhanceError> {
        let device = Default::default();
        let model = load_model::<InferBackend>(path, &device)?;
        tracing::info!("Loaded model from {}", model_file(path).display());
        Ok(Self::from_model(model, config, model_file(path)))
    }

    pub fn from_model(
        model: EnhanceNet<InferBackend>,
        config: DatasetConfig,
        model_path: PathBuf,
    ) -> Self {
        Self {
            model,
            device: Default::default(),
            config,
            model_path,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Resize, normalize and degrade `image` the way training inputs were
    pub fn prepare(&self, image: &DynamicImage) -> Result<Rgb32FImage, EnhanceError> {
        let rgb = image.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(EnhanceError::InvalidImage("image is empty".to_string()));
        }
        let (tw, th) = self.config.target_size;
        let resized = imageops::resize(&rgb, tw, th, RESIZE_FILTER);
        Ok(degrade(
            &normalize(&resized),
            self.config.low_res_size,
            self.config.target_size,
        ))
    }

    /// Full single-image inference: prepare, predict, clip, back to 8-bit
    pub fn enhance(&self, image: &DynamicImage) -> Result<RgbImage, EnhanceError> {
        let input = self.prepare(image)?;
        let mut outputs = predict(&self.model, &[&input], &self.device)?;
        let output = outputs
            .pop()
            .ok_or_else(|| EnhanceError::Model("model returned no output".to_string()))?;
        Ok(to_rgb8(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbaImage};

    fn enhancer() -> Enhancer {
        let device = Default::default();
        Enhancer::from_model(
            EnhanceNet::<InferBackend>::new(&device),
            DatasetConfig {
                target_size: (16, 16),
                low_res_size: (8, 8),
            },
            PathBuf::from("untrained.mpk"),
        )
    }

    #[test]
    fn test_enhance_outputs_target_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(40, 30, |x, y| {
            Rgb([x as u8 * 6, y as u8 * 8, 100])
        }));
        let out = enhancer().enhance(&img).unwrap();
        assert_eq!(out.dimensions(), (16, 16));
    }

    #[test]
    fn test_enhance_accepts_rgba_input() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(20, 20));
        assert!(enhancer().enhance(&img).is_ok());
    }

    #[test]
    fn test_enhance_rejects_empty_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            enhancer().enhance(&img),
            Err(EnhanceError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_predict_clips_and_checks_shapes() {
        let e = enhancer();
        let a = Rgb32FImage::from_pixel(8, 8, Rgb([0.3, 0.6, 0.9]));
        let b = Rgb32FImage::from_pixel(8, 8, Rgb([0.1, 0.2, 0.3]));
        let out = predict(&e.model, &[&a, &b], &e.device).unwrap();
        assert_eq!(out.len(), 2);
        for img in &out {
            assert_eq!(img.dimensions(), (8, 8));
            assert!(img.as_raw().iter().all(|v| (0.0..=1.0).contains(v)));
        }

        let c = Rgb32FImage::new(4, 4);
        assert!(predict(&e.model, &[&a, &c], &e.device).is_err());
        assert!(predict(&e.model, &[], &e.device).unwrap().is_empty());
    }
}
