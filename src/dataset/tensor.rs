//! Conversions between interleaved images and planar (CHW) buffers

use image::{Rgb, Rgb32FImage, RgbImage};

pub const CHANNELS: usize = 3;

/// Interleaved HWC image to a planar CHW buffer
pub fn to_chw(image: &Rgb32FImage) -> Vec<f32> {
    let plane = image.width() as usize * image.height() as usize;
    let mut out = vec![0.0f32; plane * CHANNELS];
    for (i, p) in image.pixels().enumerate() {
        for c in 0..CHANNELS {
            out[c * plane + i] = p.0[c];
        }
    }
    out
}

/// Append several images of identical size into one NCHW buffer
pub fn batch_to_nchw<'a, I>(images: I) -> Vec<f32>
where
    I: IntoIterator<Item = &'a Rgb32FImage>,
{
    images.into_iter().flat_map(to_chw).collect()
}

/// Planar CHW values (clipped to `[0, 1]`) back into a float image
pub fn from_chw(data: &[f32], width: u32, height: u32) -> Option<Rgb32FImage> {
    let plane = width as usize * height as usize;
    if data.len() != plane * CHANNELS {
        return None;
    }
    Some(Rgb32FImage::from_fn(width, height, |x, y| {
        let i = y as usize * width as usize + x as usize;
        Rgb(std::array::from_fn(|c| data[c * plane + i].clamp(0.0, 1.0)))
    }))
}

/// Float `[0, 1]` image to 8-bit
pub fn to_rgb8(image: &Rgb32FImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| (p[c].clamp(0.0, 1.0) * 255.0).round() as u8))
    })
}
