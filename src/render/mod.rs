//! Software RGBA rendering for slice panels and point clouds.

pub mod cloud;
pub mod color;
mod font;
pub mod slice;

use color::{ColorMap, BAR_GAP, BAR_TOTAL, BAR_WIDTH, LABEL_GAP, TICK_LEN};
use font::FONT_HEIGHT;

/// An owned RGBA frame buffer.
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 4],
        }
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    pub fn put(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let off = (y * self.width + x) * 4;
        self.data[off..off + 4].copy_from_slice(&color);
    }

    /// Source-over blend of `color` with opacity `alpha` onto the pixel.
    pub fn blend(&mut self, x: usize, y: usize, color: [u8; 4], alpha: f64) {
        if x >= self.width || y >= self.height {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let off = (y * self.width + x) * 4;
        for c in 0..3 {
            let dst = self.data[off + c] as f64;
            let src = color[c] as f64;
            self.data[off + c] = (src * a + dst * (1.0 - a)).round() as u8;
        }
        self.data[off + 3] = 255;
    }

    /// Filled disc, used for cloud points.
    pub fn disc(&mut self, cx: i64, cy: i64, radius: i64, color: [u8; 4], alpha: f64) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 {
                    continue;
                }
                self.blend(x as usize, y as usize, color, alpha);
            }
        }
    }

    /// Bresenham line with constant opacity.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 4], alpha: f64) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            if x >= 0 && y >= 0 {
                self.blend(x as usize, y as usize, color, alpha);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn text(&mut self, x: usize, y: usize, text: &str, color: [u8; 3]) {
        font::draw_text(&mut self.data, self.width, x, y, text, color);
    }

    pub fn to_image(&self) -> image::RgbaImage {
        debug_assert_eq!(self.data.len(), self.width * self.height * 4);
        image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width as u32, self.height as u32))
    }
}

/// Min and max over finite values; `None` when the slice has no finite entry.
pub fn data_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for &v in values {
        if !v.is_finite() {
            continue;
        }
        range = Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    range
}

/// Widen a degenerate range so normalization stays defined.
pub fn pad_range(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo < 1e-12 {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Compact tick label: integers as-is, otherwise two decimals.
fn format_value(v: f64) -> String {
    if v.abs() >= 100.0 || (v.fract().abs() < 1e-9 && v.abs() >= 1.0) {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Vertical colorbar to the right of a panel occupying `x..x+BAR_TOTAL`.
/// Top of the bar maps to `hi`, bottom to `lo`.
#[allow(clippy::too_many_arguments)]
pub fn draw_colorbar(
    raster: &mut Raster,
    x: usize,
    y: usize,
    height: usize,
    lo: f64,
    hi: f64,
    map: ColorMap,
    title: &str,
) {
    if height < 2 {
        return;
    }
    let bar_x = x + BAR_GAP;
    for row in 0..height {
        let t = 1.0 - row as f64 / (height - 1) as f64;
        let c = color::map_to_rgba(t, map);
        for col in 0..BAR_WIDTH {
            raster.put(bar_x + col, y + row, c);
        }
    }

    let ticks = [1.0, 0.5, 0.0];
    for t in ticks {
        let row = y + ((1.0 - t) * (height - 1) as f64).round() as usize;
        for col in 0..TICK_LEN {
            raster.put(bar_x + BAR_WIDTH + col, row, [220, 220, 220, 255]);
        }
        let label = format_value(lo + t * (hi - lo));
        let ly = row
            .saturating_sub(FONT_HEIGHT / 2)
            .min((y + height).saturating_sub(FONT_HEIGHT));
        raster.text(
            bar_x + BAR_WIDTH + TICK_LEN + LABEL_GAP,
            ly.max(y),
            &label,
            [220, 220, 220],
        );
    }

    if !title.is_empty() {
        let tx = (x + BAR_TOTAL).saturating_sub(font::text_width(title));
        raster.text(tx, y.saturating_sub(FONT_HEIGHT + 3), title, [220, 220, 220]);
    }
}

/// Dark strip along the bottom edge carrying a single status line.
pub fn draw_status(raster: &mut Raster, text: &str) {
    let strip_h = font::STATUS_HEIGHT;
    let top = raster.height.saturating_sub(strip_h);
    for y in top..raster.height {
        for x in 0..raster.width {
            raster.blend(x, y, [10, 10, 14, 255], 0.8);
        }
    }
    raster.text(font::STATUS_PAD, top + font::STATUS_PAD, text, [235, 235, 235]);
}
