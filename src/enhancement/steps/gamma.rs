use crate::enhancement::params::GammaParams;
use crate::error::EnhanceError;
use image::RgbImage;

/// Brighten (gamma > 1) or darken (gamma < 1) through a lookup table
pub fn apply(mut image: RgbImage, params: &GammaParams) -> Result<RgbImage, EnhanceError> {
    let lut = build_lut(params.gamma);
    for p in image.pixels_mut() {
        for c in p.0.iter_mut() {
            *c = lut[*c as usize];
        }
    }
    Ok(image)
}

/// `out[i] = round(((i / 255) ^ (1 / gamma)) * 255)`
pub fn build_lut(gamma: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let inv_gamma = 1.0 / gamma as f64;

    for (i, entry) in lut.iter_mut().enumerate() {
        let v = (i as f64 / 255.0).powf(inv_gamma) * 255.0;
        *entry = v.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_gamma_one_is_identity() {
        let lut = build_lut(1.0);
        for (i, v) in lut.iter().enumerate() {
            assert_eq!(*v as usize, i);
        }
    }

    #[test]
    fn test_gamma_lut_is_monotonic() {
        for gamma in [0.3, 0.8, 1.0, 1.2, 2.5] {
            let lut = build_lut(gamma);
            assert!(
                lut.windows(2).all(|w| w[0] <= w[1]),
                "lut for gamma {} is not monotonic",
                gamma
            );
            assert_eq!(lut[0], 0);
            assert_eq!(lut[255], 255);
        }
    }

    #[test]
    fn test_gamma_brightens_mid_gray() {
        let img = RgbImage::from_pixel(8, 8, Rgb([128, 128, 128]));
        let result = apply(img, &GammaParams { gamma: 1.2 }).unwrap();

        let first = *result.get_pixel(0, 0);
        for p in result.pixels() {
            assert_eq!(*p, first, "output should stay constant");
            for c in p.0 {
                assert!(c > 128);
            }
        }
    }
}
