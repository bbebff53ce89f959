use crate::enhancement::color::{rgb_to_ycrcb, ycrcb_to_rgb, Plane};
use crate::enhancement::params::DenoiseParams;
use crate::error::EnhanceError;
use image::RgbImage;

/// Apply non-local-means denoising
/// Luminance is filtered with `h`, both chrominance planes with `h_color`
pub fn apply(image: RgbImage, params: &DenoiseParams) -> Result<RgbImage, EnhanceError> {
    let [y, cr, cb] = rgb_to_ycrcb(&image);

    let template_radius = params.template_window / 2;
    let search_radius = params.search_window / 2;

    let planes = [
        nl_means(&y, params.h, template_radius, search_radius),
        nl_means(&cr, params.h_color, template_radius, search_radius),
        nl_means(&cb, params.h_color, template_radius, search_radius),
    ];

    Ok(ycrcb_to_rgb(&planes))
}

/// Non-local means over one plane
///
/// For every search offset the squared difference between the plane and its
/// shifted copy is summed into an integral image, so each patch distance is
/// four lookups regardless of the template size. Borders replicate edges.
fn nl_means(plane: &Plane, h: f32, template_radius: u32, search_radius: u32) -> Plane {
    let (width, height) = (plane.width as i64, plane.height as i64);
    let t = template_radius as i64;
    let s = search_radius as i64;

    // Integral image covers the plane plus the template margin on each side
    let padded_w = (width + 2 * t) as usize;
    let padded_h = (height + 2 * t) as usize;
    let stride = padded_w + 1;
    let mut integral = vec![0.0f64; stride * (padded_h + 1)];

    let patch_area = ((2 * t + 1) * (2 * t + 1)) as f64;
    let inv_h2 = 1.0 / (h as f64 * h as f64);

    let pixel_count = (width * height) as usize;
    let mut weight_sum = vec![0.0f64; pixel_count];
    let mut value_sum = vec![0.0f64; pixel_count];

    for dy in -s..=s {
        for dx in -s..=s {
            for py in 0..padded_h {
                let y = py as i64 - t;
                let mut row_sum = 0.0f64;
                for px in 0..padded_w {
                    let x = px as i64 - t;
                    let diff = (plane.get_clamped(x, y) - plane.get_clamped(x + dx, y + dy)) as f64;
                    row_sum += diff * diff;
                    integral[(py + 1) * stride + px + 1] = integral[py * stride + px + 1] + row_sum;
                }
            }

            for y in 0..height {
                for x in 0..width {
                    // Patch centred on (x, y) spans padded coords [x, x + 2t]
                    let (x1, y1) = (x as usize, y as usize);
                    let (x2, y2) = (x1 + 2 * t as usize + 1, y1 + 2 * t as usize + 1);
                    let sum = integral[y2 * stride + x2] - integral[y1 * stride + x2]
                        - integral[y2 * stride + x1]
                        + integral[y1 * stride + x1];

                    let distance = (sum / patch_area).max(0.0);
                    let weight = (-distance * inv_h2).exp();

                    let idx = (y * width + x) as usize;
                    weight_sum[idx] += weight;
                    value_sum[idx] += weight * plane.get_clamped(x + dx, y + dy) as f64;
                }
            }
        }
    }

    let mut out = Plane::new(plane.width, plane.height);
    for (i, value) in out.data.iter_mut().enumerate() {
        // The zero offset always contributes weight 1
        *value = (value_sum[i] / weight_sum[i]) as f32;
    }
    out
}
