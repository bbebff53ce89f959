use crate::enhancement::color::{rgb_to_ycrcb, saturate, ycrcb_to_rgb};
use crate::enhancement::params::EqualizeParams;
use crate::error::EnhanceError;
use image::{GrayImage, Luma, RgbImage};
use imageproc::stats::cumulative_histogram;

/// Equalize the luminance histogram, leaving chrominance untouched
pub fn apply(image: RgbImage, params: &EqualizeParams) -> Result<RgbImage, EnhanceError> {
    if params.disabled {
        return Ok(image);
    }

    let [mut y, cr, cb] = rgb_to_ycrcb(&image);

    let luma = GrayImage::from_fn(y.width, y.height, |px, py| Luma([saturate(y.get(px, py))]));
    let Some(lut) = build_lut(&luma) else {
        return Ok(image);
    };

    for (dst, src) in y.data.iter_mut().zip(luma.pixels()) {
        *dst = lut[src.0[0] as usize] as f32;
    }

    Ok(ycrcb_to_rgb(&[y, cr, cb]))
}

/// Map the darkest occupied level to 0 and the brightest to 255
///
/// Returns `None` for a single-level image, which has nothing to stretch.
pub fn build_lut(luma: &GrayImage) -> Option<[u8; 256]> {
    let cdf = cumulative_histogram(luma).channels[0];
    let total = cdf[255] as u64;
    let cdf_min = cdf.iter().copied().find(|&c| c > 0)? as u64;
    if total == cdf_min {
        return None;
    }

    let span = (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    for (out, &c) in lut.iter_mut().zip(cdf.iter()) {
        let shifted = (c as u64).saturating_sub(cdf_min) as f64;
        *out = (shifted * 255.0 / span).round() as u8;
    }
    Some(lut)
}
