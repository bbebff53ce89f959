//! Luminance/chrominance planes (full-range BT.601 YCrCb)

use image::{Rgb, RgbImage};

/// A single-channel floating point plane in row-major order
#[derive(Debug, Clone)]
pub struct Plane {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Plane {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Sample with edge replication for out-of-bounds coordinates
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(x, y)
    }
}

/// Split an RGB image into Y, Cr, Cb planes
pub fn rgb_to_ycrcb(img: &RgbImage) -> [Plane; 3] {
    let (width, height) = img.dimensions();
    let mut y_plane = Plane::new(width, height);
    let mut cr_plane = Plane::new(width, height);
    let mut cb_plane = Plane::new(width, height);

    for (i, p) in img.pixels().enumerate() {
        let (r, g, b) = (p.0[0] as f32, p.0[1] as f32, p.0[2] as f32);
        let y = 0.299 * r + 0.587 * g + 0.114 * b;
        y_plane.data[i] = y;
        cr_plane.data[i] = (r - y) * 0.713 + 128.0;
        cb_plane.data[i] = (b - y) * 0.564 + 128.0;
    }

    [y_plane, cr_plane, cb_plane]
}

/// Recombine Y, Cr, Cb planes into a saturated 8-bit RGB image
pub fn ycrcb_to_rgb(planes: &[Plane; 3]) -> RgbImage {
    let [y_plane, cr_plane, cb_plane] = planes;
    RgbImage::from_fn(y_plane.width, y_plane.height, |x, y| {
        let luma = y_plane.get(x, y);
        let cr = cr_plane.get(x, y) - 128.0;
        let cb = cb_plane.get(x, y) - 128.0;
        Rgb([
            saturate(luma + 1.403 * cr),
            saturate(luma - 0.714 * cr - 0.344 * cb),
            saturate(luma + 1.773 * cb),
        ])
    })
}

/// Round to nearest and clamp into the 8-bit range
#[inline]
pub fn saturate(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_near_lossless() {
        let img = RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
        });
        let back = ycrcb_to_rgb(&rgb_to_ycrcb(&img));
        for (a, b) in img.pixels().zip(back.pixels()) {
            for c in 0..3 {
                assert!((a.0[c] as i32 - b.0[c] as i32).abs() <= 2);
            }
        }
    }

    #[test]
    fn test_gray_has_neutral_chroma() {
        let img = RgbImage::from_pixel(4, 4, Rgb([90, 90, 90]));
        let [y, cr, cb] = rgb_to_ycrcb(&img);
        assert!((y.get(0, 0) - 90.0).abs() < 1e-3);
        assert!((cr.get(0, 0) - 128.0).abs() < 1e-3);
        assert!((cb.get(0, 0) - 128.0).abs() < 1e-3);
    }

    #[test]
    fn test_saturate_clamps() {
        assert_eq!(saturate(-4.0), 0);
        assert_eq!(saturate(300.0), 255);
        assert_eq!(saturate(127.5), 128);
    }
}
