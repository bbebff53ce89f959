use crate::enhancement::color::saturate;
use crate::enhancement::params::SharpenParams;
use crate::error::EnhanceError;
use image::{Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;

/// Unsharp mask: weighted difference between the image and a Gaussian blur
/// Hard edges may ring slightly; results saturate into the 8-bit range
pub fn apply(image: RgbImage, params: &SharpenParams) -> Result<RgbImage, EnhanceError> {
    let blurred = gaussian_blur_f32(&image, params.sigma);

    let sharpened = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let orig = image.get_pixel(x, y).0;
        let blur = blurred.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| {
            saturate(params.image_weight * orig[c] as f32 + params.blur_weight * blur[c] as f32)
        }))
    });

    Ok(sharpened)
}
