use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sr_enhance::{build_dataset, enhance, DatasetConfig, EnhanceParams, Pipeline};
use std::path::Path;

fn write_scene(dir: &Path, index: u32) {
    let img = RgbImage::from_fn(200, 200, |x, y| {
        let stripe = if (x / (10 + index)) % 2 == 0 { 60 } else { 190 };
        Rgb([
            ((x + index * 20) % 256) as u8,
            stripe,
            ((y * 3 + index * 7) % 256) as u8,
        ])
    });
    let ext = if index % 2 == 0 { "png" } else { "jpg" };
    img.save(dir.join(format!("scene_{:02}.{}", index, ext)))
        .unwrap();
}

fn populate(dir: &Path) {
    for i in 0..10 {
        write_scene(dir, i);
    }
    std::fs::write(dir.join("corrupt.jpg"), b"\xFF\xD8\xFF truncated jpeg").unwrap();
}

#[test]
fn test_ten_valid_images_and_one_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let dataset = build_dataset(
        dir.path(),
        &DatasetConfig::default(),
        &Pipeline::default(),
    )
    .expect("dataset build should not fail on a corrupt file");

    assert_eq!(dataset.len(), 10);
    assert_eq!(dataset.report.loaded, 10);
    assert_eq!(dataset.report.skipped.len(), 1);
    assert!(dataset.report.skipped[0].path.ends_with("corrupt.jpg"));
    assert!(dataset.report.failed.is_empty());

    for pair in &dataset.pairs {
        assert_eq!(pair.high.dimensions(), (128, 128));
        assert_eq!(pair.low.dimensions(), pair.high.dimensions());
        assert_eq!(pair.high.as_raw().len(), 128 * 128 * 3);
        for v in pair.low.as_raw().iter().chain(pair.high.as_raw()) {
            assert!((0.0..=1.0).contains(v), "pixel {} outside [0, 1]", v);
        }
    }

    // Two runs over the same folder and seed split identically
    let again = build_dataset(
        dir.path(),
        &DatasetConfig::default(),
        &Pipeline::default(),
    )
    .unwrap();
    let sources: Vec<_> = dataset.pairs.iter().map(|p| p.source.clone()).collect();
    let sources_again: Vec<_> = again.pairs.iter().map(|p| p.source.clone()).collect();
    assert_eq!(sources, sources_again);

    let split = dataset.split(0.8, &mut StdRng::seed_from_u64(42));
    let split_again = again.split(0.8, &mut StdRng::seed_from_u64(42));
    assert_eq!(split, split_again);
    assert_eq!(split.train.len(), 8);
    assert_eq!(split.validation.len(), 2);
}

#[test]
fn test_gamma_brightens_constant_mid_gray() {
    let mut params = EnhanceParams::default();
    params.gamma.gamma = 1.2;

    let lut = sr_enhance::enhancement::steps::gamma::build_lut(params.gamma.gamma);
    let img = RgbImage::from_pixel(32, 32, Rgb([128, 128, 128]));
    let out = sr_enhance::enhancement::steps::gamma::apply(img, &params.gamma).unwrap();

    for p in out.pixels() {
        for c in p.0 {
            assert!(c > 128);
            assert_eq!(c, lut[128]);
        }
    }
}

#[test]
fn test_enhance_keeps_shape_for_various_sizes() {
    let mut params = EnhanceParams::default();
    params.denoise.search_window = 7;

    for (w, h) in [(48, 48), (64, 20), (9, 33)] {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x * 5) as u8, (y * 7) as u8, 90]));
        let out = enhance(&img, &params).unwrap();
        assert_eq!(out.dimensions(), (w, h));
    }
}

#[test]
fn test_missing_folder_aborts_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let result = build_dataset(
        &dir.path().join("missing"),
        &DatasetConfig::default(),
        &Pipeline::default(),
    );
    assert!(matches!(
        result,
        Err(sr_enhance::EnhanceError::FolderNotFound(_))
    ));
}
