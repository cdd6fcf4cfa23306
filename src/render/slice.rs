//! Horizontal cross-section frames: temperature and phase fraction side by
//! side, sliced at the most active boiling layer.

use crate::config::RenderConfig;
use crate::grid::{Field3, Grid, Slab};
use crate::render::color::{self, ColorMap, BAR_TOTAL};
use crate::render::font::{FONT_HEIGHT, STATUS_HEIGHT};
use crate::render::{draw_colorbar, draw_status, pad_range, Raster};

const MARGIN: usize = 10;
const TITLE_H: usize = FONT_HEIGHT + 6;

/// Phase fractions strictly inside this band count as interface cells.
const INTERFACE_LO: f64 = 0.1;
const INTERFACE_HI: f64 = 0.9;

const BACKGROUND: [u8; 4] = [16, 16, 20, 255];

/// Pick the z-index whose layer holds the most interface cells. A field with
/// no interface anywhere (single phase, or a failed read) falls back to the
/// lower third of the column, where nucleation starts.
pub fn select_slice(alpha: &Field3) -> usize {
    let mut best_k = 0;
    let mut best_count = 0;
    for k in 0..alpha.nz {
        let count = alpha.band_count(k, INTERFACE_LO, INTERFACE_HI);
        if count > best_count {
            best_count = count;
            best_k = k;
        }
    }
    if best_count == 0 {
        alpha.nz / 3
    } else {
        best_k
    }
}

/// Frame dimensions for the two-panel layout.
pub fn frame_size(cfg: &RenderConfig) -> (usize, usize) {
    let panel_total = cfg.panel_size + BAR_TOTAL;
    let width = MARGIN + 2 * (panel_total + MARGIN);
    let height = MARGIN + TITLE_H + cfg.panel_size + STATUS_HEIGHT + MARGIN;
    (width, height)
}

/// Render the slice frame for one timestep. `temp_range` is the shared
/// temperature window, kept fixed across an animation so colors do not
/// flicker between frames.
pub fn render_slice(
    alpha: &Field3,
    temp: &Field3,
    grid: &Grid,
    cfg: &RenderConfig,
    time: f64,
    temp_range: (f64, f64),
) -> Raster {
    let (width, height) = frame_size(cfg);
    let mut raster = Raster::new(width, height);
    raster.fill(BACKGROUND);

    let k = select_slice(alpha);
    let a_slab = alpha.slab(k);
    let t_slab = temp.slab(k);
    let (t_lo, t_hi) = pad_range(temp_range.0, temp_range.1);

    let panel_y = MARGIN + TITLE_H;
    let left_x = MARGIN;
    let right_x = MARGIN + cfg.panel_size + BAR_TOTAL + MARGIN;

    // Left panel: temperature with interface contours on top.
    raster.text(left_x, MARGIN, "temperature (K)", [220, 220, 220]);
    fill_panel(&mut raster, left_x, panel_y, cfg.panel_size, &t_slab, |v| {
        color::map_to_rgba((v - t_lo) / (t_hi - t_lo), ColorMap::Ember)
    });
    tint_liquid(&mut raster, left_x, panel_y, cfg.panel_size, &a_slab);
    for (level, opacity) in [(INTERFACE_LO, 0.5), (0.5, 0.95), (INTERFACE_HI, 0.5)] {
        draw_contour(
            &mut raster,
            left_x,
            panel_y,
            cfg.panel_size,
            &a_slab,
            level,
            [240, 240, 240, 255],
            opacity,
        );
    }
    draw_colorbar(
        &mut raster,
        left_x + cfg.panel_size,
        panel_y,
        cfg.panel_size,
        t_lo,
        t_hi,
        ColorMap::Ember,
        "",
    );

    // Right panel: phase fraction on its natural 0..1 scale.
    raster.text(right_x, MARGIN, "water fraction", [220, 220, 220]);
    fill_panel(&mut raster, right_x, panel_y, cfg.panel_size, &a_slab, |v| {
        color::map_to_rgba(v, ColorMap::IceSteam)
    });
    draw_contour(
        &mut raster,
        right_x,
        panel_y,
        cfg.panel_size,
        &a_slab,
        0.5,
        [20, 20, 24, 255],
        0.95,
    );
    draw_colorbar(
        &mut raster,
        right_x + cfg.panel_size,
        panel_y,
        cfg.panel_size,
        0.0,
        1.0,
        ColorMap::IceSteam,
        "",
    );

    let status = format!(
        "t={:.3}s  z={:.1}cm  layer {}/{}",
        time,
        grid.z(k) * 100.0,
        k + 1,
        alpha.nz
    );
    draw_status(&mut raster, &status);
    raster
}

/// Map panel pixel coordinates into fractional field indices, y pointing up.
fn pixel_to_index(px: usize, py: usize, panel: usize, slab: &Slab<'_>) -> (f64, f64) {
    let span = panel.saturating_sub(1).max(1) as f64;
    let fi = px as f64 / span * (slab.nx() - 1) as f64;
    let fj = (1.0 - py as f64 / span) * (slab.ny() - 1) as f64;
    (fi, fj)
}

fn fill_panel<F>(raster: &mut Raster, x: usize, y: usize, panel: usize, slab: &Slab<'_>, shade: F)
where
    F: Fn(f64) -> [u8; 4],
{
    for py in 0..panel {
        for px in 0..panel {
            let (fi, fj) = pixel_to_index(px, py, panel, slab);
            raster.put(x + px, y + py, shade(slab.sample(fi, fj)));
        }
    }
}

/// Translucent blue wash over liquid-dominated cells so the temperature
/// panel reads which side of the interface is water.
fn tint_liquid(raster: &mut Raster, x: usize, y: usize, panel: usize, alpha: &Slab<'_>) {
    for py in 0..panel {
        for px in 0..panel {
            let (fi, fj) = pixel_to_index(px, py, panel, alpha);
            if alpha.sample(fi, fj) > 0.5 {
                raster.blend(x + px, y + py, [70, 120, 220, 255], 0.16);
            }
        }
    }
}

/// Band-distance contour: a pixel is on the contour when the sampled value
/// sits within one pixel-step of `level`, judged by the local gradient.
#[allow(clippy::too_many_arguments)]
fn draw_contour(
    raster: &mut Raster,
    x: usize,
    y: usize,
    panel: usize,
    slab: &Slab<'_>,
    level: f64,
    color: [u8; 4],
    opacity: f64,
) {
    let span = panel.saturating_sub(1).max(1) as f64;
    let di = (slab.nx() - 1) as f64 / span;
    let dj = (slab.ny() - 1) as f64 / span;
    for py in 0..panel {
        for px in 0..panel {
            let (fi, fj) = pixel_to_index(px, py, panel, slab);
            let v = slab.sample(fi, fj);
            let gx = (slab.sample(fi + di, fj) - slab.sample(fi - di, fj)) * 0.5;
            let gy = (slab.sample(fi, fj + dj) - slab.sample(fi, fj - dj)) * 0.5;
            let band = (gx.abs() + gy.abs()).max(0.004) * 0.75;
            if (v - level).abs() <= band {
                raster.blend(x + px, y + py, color, opacity);
            }
        }
    }
}
