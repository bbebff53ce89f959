//! Side-by-side previews of model output on held-out pairs

use crate::dataset::tensor::to_rgb8;
use crate::dataset::Dataset;
use crate::error::EnhanceError;
use crate::model::{predict, EnhanceNet};
use burn::tensor::backend::Backend;
use image::{imageops, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Pixels of white space between panels
const GAP: u32 = 4;

/// Write `low | predicted | high` strips for up to `count` of the given pairs
pub fn save_comparisons<B: Backend>(
    model: &EnhanceNet<B>,
    dataset: &Dataset,
    indices: &[usize],
    count: usize,
    out_dir: &Path,
    device: &B::Device,
) -> Result<Vec<PathBuf>, EnhanceError> {
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::new();
    for (n, &index) in indices.iter().take(count).enumerate() {
        let pair = dataset.get(index).ok_or_else(|| {
            EnhanceError::Internal(format!("sample index {} outside dataset", index))
        })?;

        let predicted = predict(model, &[&pair.low], device)?
            .pop()
            .ok_or_else(|| EnhanceError::Model("model returned no output".to_string()))?;

        let strip = compose_strip(&[
            to_rgb8(&pair.low),
            to_rgb8(&predicted),
            to_rgb8(&pair.high),
        ]);

        let path = out_dir.join(format!("sample_{:02}.png", n));
        strip
            .save(&path)
            .map_err(|e| EnhanceError::Encode(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Wrote comparison {}", path.display());
        written.push(path);
    }

    tracing::info!("Saved {} comparisons to {}", written.len(), out_dir.display());
    Ok(written)
}

/// Lay panels out left to right on a white background
pub fn compose_strip(panels: &[RgbImage]) -> RgbImage {
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let width = panels.iter().map(|p| p.width()).sum::<u32>()
        + GAP * panels.len().saturating_sub(1) as u32;

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut x = 0i64;
    for panel in panels {
        imageops::replace(&mut canvas, panel, x, 0);
        x += (panel.width() + GAP) as i64;
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SamplePair;
    use crate::model::InferBackend;
    use image::Rgb32FImage;

    #[test]
    fn test_compose_strip_layout() {
        let red = RgbImage::from_pixel(5, 5, Rgb([255, 0, 0]));
        let blue = RgbImage::from_pixel(5, 3, Rgb([0, 0, 255]));
        let strip = compose_strip(&[red, blue]);

        assert_eq!(strip.dimensions(), (5 + GAP + 5, 5));
        assert_eq!(strip.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(strip.get_pixel(5, 0).0, [255, 255, 255]);
        assert_eq!(strip.get_pixel(5 + GAP, 0).0, [0, 0, 255]);
        assert_eq!(strip.get_pixel(5 + GAP, 4).0, [255, 255, 255]);
    }

    #[test]
    fn test_save_comparisons_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model = EnhanceNet::<InferBackend>::new(&device);
        let dataset = Dataset {
            pairs: (0..3)
                .map(|i| SamplePair {
                    source: PathBuf::from(format!("{}.png", i)),
                    low: Rgb32FImage::from_pixel(8, 8, Rgb([0.2, 0.2, 0.2])),
                    high: Rgb32FImage::from_pixel(8, 8, Rgb([0.8, 0.8, 0.8])),
                })
                .collect(),
            report: Default::default(),
        };

        let written =
            save_comparisons(&model, &dataset, &[2, 0, 1], 2, dir.path(), &device).unwrap();
        assert_eq!(written.len(), 2);
        for path in &written {
            let img = image::open(path).unwrap();
            assert_eq!(img.width(), 8 * 3 + GAP * 2);
            assert_eq!(img.height(), 8);
        }
    }
}
