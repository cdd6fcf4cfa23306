//! 3D point-cloud frames: phase-bucketed cells projected through an orbiting
//! camera, with a wireframe domain box for orientation.

use crate::config::RenderConfig;
use crate::grid::{Field3, Grid};
use crate::render::color::{self, ColorMap, BAR_TOTAL};
use crate::render::font::STATUS_HEIGHT;
use crate::render::{draw_colorbar, draw_status, pad_range, Raster};

const MARGIN: usize = 10;

/// Bucket thresholds on the water fraction.
const VAPOR_BELOW: f64 = 0.3;
const WATER_ABOVE: f64 = 0.7;

const BACKGROUND: [u8; 4] = [12, 12, 18, 255];

/// One subsampled cell carried into projection.
#[derive(Debug, Clone, Copy)]
pub struct CloudPoint {
    pub pos: [f64; 3],
    pub temp: f64,
}

/// Cells split by phase. The three buckets are disjoint and together cover
/// every sampled cell.
#[derive(Debug, Default)]
pub struct Phases {
    pub water: Vec<CloudPoint>,
    pub interface: Vec<CloudPoint>,
    pub vapor: Vec<CloudPoint>,
}

/// Subsample the grid with `stride` and split cells on the water fraction:
/// below `lo` is vapor, above `hi` is water, the band between is interface.
pub fn partition(
    alpha: &Field3,
    temp: &Field3,
    grid: &Grid,
    stride: usize,
    lo: f64,
    hi: f64,
) -> Phases {
    let stride = stride.max(1);
    let mut phases = Phases::default();
    for k in (0..grid.nz).step_by(stride) {
        for j in (0..grid.ny).step_by(stride) {
            for i in (0..grid.nx).step_by(stride) {
                let point = CloudPoint {
                    pos: [grid.x(i), grid.y(j), grid.z(k)],
                    temp: temp.at(i, j, k),
                };
                let a = alpha.at(i, j, k);
                if a < lo {
                    phases.vapor.push(point);
                } else if a > hi {
                    phases.water.push(point);
                } else {
                    phases.interface.push(point);
                }
            }
        }
    }
    phases
}

/// Orbit camera: azimuth around z, then elevation toward the viewer.
pub struct Camera {
    center: [f64; 3],
    cos_a: f64,
    sin_a: f64,
    cos_e: f64,
    sin_e: f64,
}

impl Camera {
    pub fn new(grid: &Grid, azimuth_deg: f64, elevation_deg: f64) -> Self {
        let a = azimuth_deg.to_radians();
        let e = elevation_deg.to_radians();
        Self {
            center: grid.center(),
            cos_a: a.cos(),
            sin_a: a.sin(),
            cos_e: e.cos(),
            sin_e: e.sin(),
        }
    }

    /// Project to view space: horizontal, vertical, and depth away from the
    /// viewer.
    pub fn project(&self, pos: [f64; 3]) -> (f64, f64, f64) {
        let x = pos[0] - self.center[0];
        let y = pos[1] - self.center[1];
        let z = pos[2] - self.center[2];
        let x1 = x * self.cos_a + y * self.sin_a;
        let y1 = -x * self.sin_a + y * self.cos_a;
        let u = x1;
        let v = z * self.cos_e - y1 * self.sin_e;
        let depth = y1 * self.cos_e + z * self.sin_e;
        (u, v, depth)
    }
}

struct Projected {
    sx: i64,
    sy: i64,
    depth: f64,
    color: [u8; 4],
    radius: i64,
    opacity: f64,
}

/// Render one point-cloud frame at the given camera azimuth. `temp_range`
/// fixes the color scale across an animation.
pub fn render_cloud(
    alpha: &Field3,
    temp: &Field3,
    grid: &Grid,
    cfg: &RenderConfig,
    time: f64,
    temp_range: (f64, f64),
    azimuth_deg: f64,
) -> Raster {
    let mut raster = Raster::new(cfg.cloud_width, cfg.cloud_height);
    raster.fill(BACKGROUND);

    let camera = Camera::new(grid, azimuth_deg, cfg.elevation_deg);
    let (t_lo, t_hi) = pad_range(temp_range.0, temp_range.1);
    let norm = |t: f64| (t - t_lo) / (t_hi - t_lo);

    let view_w = cfg.cloud_width.saturating_sub(2 * MARGIN + BAR_TOTAL);
    let view_h = cfg.cloud_height.saturating_sub(2 * MARGIN + STATUS_HEIGHT);
    let cx = (MARGIN + view_w / 2) as f64;
    let cy = (MARGIN + view_h / 2) as f64;
    let dx = grid.bounds.x.1 - grid.bounds.x.0;
    let dy = grid.bounds.y.1 - grid.bounds.y.0;
    let dz = grid.bounds.z.1 - grid.bounds.z.0;
    let radius = 0.5 * (dx * dx + dy * dy + dz * dz).sqrt();
    let scale = 0.5 * view_w.min(view_h) as f64 / radius.max(1e-12);
    let to_screen = |u: f64, v: f64| ((cx + u * scale).round() as i64, (cy - v * scale).round() as i64);

    draw_box(&mut raster, grid, &camera, &to_screen);

    let phases = partition(alpha, temp, grid, cfg.point_stride, VAPOR_BELOW, WATER_ABOVE);
    let mut points = Vec::with_capacity(
        phases.water.len() + phases.interface.len() + phases.vapor.len(),
    );
    let mut push = |bucket: &[CloudPoint], map: ColorMap, radius: i64, opacity: f64| {
        for p in bucket {
            let (u, v, depth) = camera.project(p.pos);
            let (sx, sy) = to_screen(u, v);
            points.push(Projected {
                sx,
                sy,
                depth,
                color: color::map_to_rgba(norm(p.temp), map),
                radius,
                opacity,
            });
        }
    };
    push(&phases.vapor, ColorMap::Vapor, 1, 0.4);
    push(&phases.water, ColorMap::Water, 1, 0.3);
    push(&phases.interface, ColorMap::Ember, 2, 0.85);

    // Painter's order, far cells first.
    points.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    for p in &points {
        raster.disc(p.sx, p.sy, p.radius, p.color, p.opacity);
    }

    draw_colorbar(
        &mut raster,
        cfg.cloud_width - MARGIN - BAR_TOTAL,
        MARGIN,
        view_h,
        t_lo,
        t_hi,
        ColorMap::Ember,
        "T (K)",
    );

    let status = format!(
        "t={:.3}s  az={:.0}  water {}  interface {}  vapor {}",
        time,
        azimuth_deg.rem_euclid(360.0),
        phases.water.len(),
        phases.interface.len(),
        phases.vapor.len()
    );
    draw_status(&mut raster, &status);
    raster
}

/// Wireframe domain box, drawn before the points so it sits behind them.
fn draw_box(
    raster: &mut Raster,
    grid: &Grid,
    camera: &Camera,
    to_screen: impl Fn(f64, f64) -> (i64, i64),
) {
    let b = &grid.bounds;
    let corners: [[f64; 3]; 8] = [
        [b.x.0, b.y.0, b.z.0],
        [b.x.1, b.y.0, b.z.0],
        [b.x.1, b.y.1, b.z.0],
        [b.x.0, b.y.1, b.z.0],
        [b.x.0, b.y.0, b.z.1],
        [b.x.1, b.y.0, b.z.1],
        [b.x.1, b.y.1, b.z.1],
        [b.x.0, b.y.1, b.z.1],
    ];
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0),
        (4, 5), (5, 6), (6, 7), (7, 4),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];
    let screen: Vec<(i64, i64)> = corners
        .iter()
        .map(|&c| {
            let (u, v, _) = camera.project(c);
            to_screen(u, v)
        })
        .collect();
    for (a, b) in EDGES {
        let (x0, y0) = screen[a];
        let (x1, y1) = screen[b];
        raster.line(x0, y0, x1, y1, [120, 120, 130, 255], 0.5);
    }
}
