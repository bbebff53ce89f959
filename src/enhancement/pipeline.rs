use crate::error::EnhanceError;
use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::time::Instant;

use super::params::EnhanceParams;
use super::steps;

/// Timing information for a single enhancement stage
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of enhancement including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementResult {
    /// Enhanced image (not serialized)
    #[serde(skip)]
    pub image: RgbImage,
    /// Total enhancement time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings, in execution order
    pub steps: Vec<StepTiming>,
}

/// Enhancement pipeline applying all five stages in fixed order
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    params: EnhanceParams,
}

impl Pipeline {
    pub fn new(params: EnhanceParams) -> Result<Self, EnhanceError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EnhanceParams {
        &self.params
    }

    /// Enhance an 8-bit RGB image
    pub fn process(&self, image: RgbImage) -> Result<EnhancementResult, EnhanceError> {
        validate(&image)?;

        let start = Instant::now();
        let mut steps_timing = Vec::with_capacity(5);
        let p = &self.params;

        let mut img = image;
        img = self.run_step("denoise", img, &mut steps_timing, |i| {
            steps::denoise::apply(i, &p.denoise)
        })?;
        img = self.run_step("equalize", img, &mut steps_timing, |i| {
            steps::equalize::apply(i, &p.equalize)
        })?;
        img = self.run_step("gamma", img, &mut steps_timing, |i| {
            steps::gamma::apply(i, &p.gamma)
        })?;
        img = self.run_step("sharpen", img, &mut steps_timing, |i| {
            steps::sharpen::apply(i, &p.sharpen)
        })?;
        img = self.run_step("edges", img, &mut steps_timing, |i| {
            steps::edges::apply(i, &p.edges)
        })?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(total_time_ms, steps = ?steps_timing, "enhancement finished");

        Ok(EnhancementResult {
            image: img,
            total_time_ms,
            steps: steps_timing,
        })
    }

    /// Enhance a decoded image, which must already be 8-bit RGB
    pub fn process_dynamic(&self, image: DynamicImage) -> Result<EnhancementResult, EnhanceError> {
        match image {
            DynamicImage::ImageRgb8(rgb) => self.process(rgb),
            other => Err(EnhanceError::InvalidImage(format!(
                "expected 8-bit 3-channel RGB, got {:?}",
                other.color()
            ))),
        }
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: RgbImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<RgbImage, EnhanceError>
    where
        F: FnOnce(RgbImage) -> Result<RgbImage, EnhanceError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms: step_start.elapsed().as_millis() as u64,
        });
        Ok(result)
    }
}

/// Run the default pipeline with the given parameters and keep only the image
pub fn enhance(image: &RgbImage, params: &EnhanceParams) -> Result<RgbImage, EnhanceError> {
    Ok(Pipeline::new(*params)?.process(image.clone())?.image)
}

fn validate(image: &RgbImage) -> Result<(), EnhanceError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EnhanceError::InvalidImage(format!(
            "image is empty ({}x{})",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgb, RgbaImage};

    fn textured(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 7 + y * 3) % 256) as u8,
                ((x * 2 + y * 11) % 256) as u8,
                if (x / 4 + y / 4) % 2 == 0 { 40 } else { 210 },
            ])
        })
    }

    #[test]
    fn test_pipeline_preserves_dimensions() {
        let pipeline = Pipeline::default();
        for (w, h) in [(32, 32), (40, 17), (5, 3)] {
            let result = pipeline.process(textured(w, h)).unwrap();
            assert_eq!(result.image.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_pipeline_records_steps_in_order() {
        let result = Pipeline::default().process(textured(16, 16)).unwrap();
        let names: Vec<&str> = result.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["denoise", "equalize", "gamma", "sharpen", "edges"]);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let pipeline = Pipeline::default();
        let a = pipeline.process(textured(24, 24)).unwrap().image;
        let b = pipeline.process(textured(24, 24)).unwrap().image;
        assert_eq!(a, b);
    }

    #[test]
    fn test_pipeline_rejects_empty_image() {
        let err = Pipeline::default().process(RgbImage::new(0, 10)).unwrap_err();
        assert!(matches!(err, EnhanceError::InvalidImage(_)));
    }

    #[test]
    fn test_pipeline_rejects_wrong_channel_count() {
        let pipeline = Pipeline::default();

        let gray = DynamicImage::ImageLuma8(GrayImage::new(8, 8));
        assert!(matches!(
            pipeline.process_dynamic(gray),
            Err(EnhanceError::InvalidImage(_))
        ));

        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        assert!(matches!(
            pipeline.process_dynamic(rgba),
            Err(EnhanceError::InvalidImage(_))
        ));

        let rgb = DynamicImage::ImageRgb8(textured(8, 8));
        assert!(pipeline.process_dynamic(rgb).is_ok());
    }

    #[test]
    fn test_pipeline_rejects_invalid_params() {
        let mut params = EnhanceParams::default();
        params.gamma.gamma = -1.0;
        assert!(matches!(
            Pipeline::new(params),
            Err(EnhanceError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_enhance_helper_matches_pipeline() {
        let img = textured(20, 20);
        let params = EnhanceParams::default();
        let via_helper = enhance(&img, &params).unwrap();
        let via_pipeline = Pipeline::new(params).unwrap().process(img).unwrap().image;
        assert_eq!(via_helper, via_pipeline);
    }
}
