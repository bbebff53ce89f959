use crate::enhancement::Pipeline;
use crate::error::EnhanceError;
use image::{imageops, imageops::FilterType, Rgb32FImage, RgbImage};
use std::path::{Path, PathBuf};

use super::{BuildReport, Dataset, DatasetConfig, FailedFile, SamplePair, SkippedFile};

/// Interpolation used for both the target resize and the degradation round trip
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Build low/high resolution pairs from every decodable image in `folder`
///
/// Files are visited sorted by name. Undecodable files are skipped and
/// recorded in the report; a pipeline failure aborts only that file.
pub fn build_dataset(
    folder: &Path,
    config: &DatasetConfig,
    pipeline: &Pipeline,
) -> Result<Dataset, EnhanceError> {
    let files = list_files(folder)?;
    tracing::info!("Building dataset from {} files in {}", files.len(), folder.display());

    let mut pairs = Vec::with_capacity(files.len());
    let mut report = BuildReport::default();

    for path in files {
        let decoded = match load_image(&path) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!("Skipping undecodable file: {}", e);
                report.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match make_pair(decoded, config, pipeline) {
            Ok((low, high)) => pairs.push(SamplePair {
                source: path,
                low,
                high,
            }),
            Err(e) => {
                tracing::warn!("Enhancement failed for {}: {}", path.display(), e);
                report.failed.push(FailedFile { path, error: e });
            }
        }
    }

    report.loaded = pairs.len();
    tracing::info!(
        "Dataset ready: {} pairs, {} skipped, {} failed",
        report.loaded,
        report.skipped.len(),
        report.failed.len()
    );

    Ok(Dataset { pairs, report })
}

/// Decode one file, converting to 8-bit RGB
pub fn load_image(path: &Path) -> Result<RgbImage, EnhanceError> {
    image::open(path)
        .map(|img| img.into_rgb8())
        .map_err(|source| EnhanceError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Resize, enhance, normalize and degrade one decoded image
pub fn make_pair(
    image: RgbImage,
    config: &DatasetConfig,
    pipeline: &Pipeline,
) -> Result<(Rgb32FImage, Rgb32FImage), EnhanceError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EnhanceError::InvalidImage("decoded image is empty".to_string()));
    }

    let (tw, th) = config.target_size;
    let resized = imageops::resize(&image, tw, th, RESIZE_FILTER);
    let enhanced = pipeline.process(resized)?.image;

    let high = normalize(&enhanced);
    let low = degrade(&high, config.low_res_size, config.target_size);
    Ok((low, high))
}

/// Scale 8-bit pixels into `[0, 1]`
pub fn normalize(image: &RgbImage) -> Rgb32FImage {
    let data = image.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
    Rgb32FImage::from_raw(image.width(), image.height(), data)
        .unwrap_or_else(|| Rgb32FImage::new(image.width(), image.height()))
}

/// Downscale to `low_res_size` and back up to `target_size`
pub fn degrade(
    image: &Rgb32FImage,
    low_res_size: (u32, u32),
    target_size: (u32, u32),
) -> Rgb32FImage {
    let small = imageops::resize(image, low_res_size.0, low_res_size.1, RESIZE_FILTER);
    imageops::resize(&small, target_size.0, target_size.1, RESIZE_FILTER)
}

fn list_files(folder: &Path) -> Result<Vec<PathBuf>, EnhanceError> {
    if !folder.is_dir() {
        return Err(EnhanceError::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancement::EnhanceParams;
    use image::Rgb;

    fn small_config() -> DatasetConfig {
        DatasetConfig {
            target_size: (16, 16),
            low_res_size: (8, 8),
        }
    }

    fn fast_pipeline() -> Pipeline {
        let mut params = EnhanceParams::default();
        params.denoise.template_window = 3;
        params.denoise.search_window = 5;
        Pipeline::new(params).unwrap()
    }

    fn write_image(dir: &Path, name: &str, seed: u8) {
        let img = RgbImage::from_fn(24, 20, |x, y| {
            Rgb([seed.wrapping_add(x as u8 * 9), (y * 12) as u8, 128])
        });
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_missing_folder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = build_dataset(&missing, &small_config(), &fast_pipeline()).unwrap_err();
        assert!(matches!(err, EnhanceError::FolderNotFound(_)));
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 0);
        write_image(dir.path(), "b.png", 50);
        std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

        let dataset = build_dataset(dir.path(), &small_config(), &fast_pipeline()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.report.loaded, 2);
        assert_eq!(dataset.report.skipped.len(), 1);
        assert!(dataset.report.skipped[0].path.ends_with("broken.png"));
        assert!(dataset.report.failed.is_empty());
    }

    #[test]
    fn test_files_are_visited_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "c.png", 10);
        write_image(dir.path(), "a.png", 20);
        write_image(dir.path(), "b.png", 30);

        let dataset = build_dataset(dir.path(), &small_config(), &fast_pipeline()).unwrap();
        let names: Vec<String> = dataset
            .pairs
            .iter()
            .map(|p| p.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_pair_shapes_and_range() {
        let img = RgbImage::from_fn(30, 25, |x, y| Rgb([x as u8 * 8, y as u8 * 10, 60]));
        let (low, high) = make_pair(img, &small_config(), &fast_pipeline()).unwrap();

        assert_eq!(low.dimensions(), (16, 16));
        assert_eq!(high.dimensions(), (16, 16));
        for v in low.as_raw().iter().chain(high.as_raw().iter()) {
            assert!((0.0..=1.0).contains(v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_make_pair_rejects_empty_image() {
        let err = make_pair(RgbImage::new(0, 0), &small_config(), &fast_pipeline()).unwrap_err();
        assert!(matches!(err, EnhanceError::InvalidImage(_)));
    }

    #[test]
    fn test_degrade_loses_detail() {
        let checker = RgbImage::from_fn(16, 16, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let high = normalize(&checker);
        let low = degrade(&high, (8, 8), (16, 16));

        assert_eq!(low.dimensions(), high.dimensions());
        let error: f32 = low
            .as_raw()
            .iter()
            .zip(high.as_raw())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(error > 0.0);
    }

    #[test]
    fn test_normalize_scales_to_unit_range() {
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 255, 51]));
        let norm = normalize(&img);
        assert_eq!(norm.get_pixel(1, 1).0, [0.0, 1.0, 0.2]);
    }
}
