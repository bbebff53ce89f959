use crate::enhancement::color::saturate;
use crate::enhancement::params::EdgeParams;
use crate::error::EnhanceError;
use image::{imageops, Rgb, RgbImage};
use imageproc::edges::canny;

/// Overlay a Canny edge map onto the image
/// The binary map is replicated across all three channels before blending
pub fn apply(image: RgbImage, params: &EdgeParams) -> Result<RgbImage, EnhanceError> {
    let gray = imageops::grayscale(&image);
    let edge_map = canny(&gray, params.low_threshold, params.high_threshold);

    let blended = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y).0;
        let edge = edge_map.get_pixel(x, y).0[0] as f32;
        Rgb(std::array::from_fn(|c| {
            saturate(params.image_weight * pixel[c] as f32 + params.edge_weight * edge)
        }))
    });

    Ok(blended)
}
