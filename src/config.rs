//! `boilviz.yaml` configuration.
//!
//! Every knob that the exploratory scripts used to hard-code lives here with
//! the same default values, so a case with a non-default mesh needs a config
//! file instead of a source edit. Any key may be omitted; a malformed file
//! falls back to defaults with a warning.

use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::grid::{Bounds, Grid};

pub const CONFIG_FILE: &str = "boilviz.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub domain: DomainConfig,
    pub render: RenderConfig,
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

/// Physical bounding box in meters (matches the default blockMeshDict:
/// a 10 cm square column, 10 cm tall).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Side length of each 2D slice panel, in pixels.
    pub panel_size: usize,
    /// 3D cloud frame dimensions, in pixels.
    pub cloud_width: usize,
    pub cloud_height: usize,
    /// Cell stride when subsampling the grid for the 3D cloud.
    pub point_stride: usize,
    /// Orbit camera elevation for 3D frames, degrees above horizontal.
    pub elevation_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub fps: u32,
    /// Cap on total frames; timesteps are strided down to fit.
    pub max_frames: usize,
    /// Frame count for one full turn of the rotating 3D animation.
    pub rotate_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            domain: DomainConfig::default(),
            render: RenderConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { nx: 40, ny: 40, nz: 40 }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            x_min: -0.05,
            x_max: 0.05,
            y_min: -0.05,
            y_max: 0.05,
            z_min: 0.0,
            z_max: 0.1,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            panel_size: 320,
            cloud_width: 640,
            cloud_height: 560,
            point_stride: 2,
            elevation_deg: 20.0,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 8,
            max_frames: 30,
            rotate_frames: 36,
        }
    }
}

impl Config {
    pub fn grid(&self) -> Grid {
        Grid {
            nx: self.grid.nx,
            ny: self.grid.ny,
            nz: self.grid.nz,
            bounds: Bounds {
                x: (self.domain.x_min, self.domain.x_max),
                y: (self.domain.y_min, self.domain.y_max),
                z: (self.domain.z_min, self.domain.z_max),
            },
        }
    }
}

/// Load configuration from `path`, or from `boilviz.yaml` in the working
/// directory when `path` is `None`. Missing file means defaults; unreadable
/// or malformed file means defaults plus a warning.
pub fn load(path: Option<&Path>) -> Config {
    let default_path = Path::new(CONFIG_FILE);
    let path = path.unwrap_or(default_path);
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("failed to parse {}: {e}; using defaults", path.display());
                Config::default()
            }
        },
        Err(e) => {
            warn!("failed to read {}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.grid.nx, 40);
        assert_eq!(cfg.grid.ny, 40);
        assert_eq!(cfg.grid.nz, 40);
        assert_eq!(cfg.domain.x_min, -0.05);
        assert_eq!(cfg.domain.x_max, 0.05);
        assert_eq!(cfg.domain.y_min, -0.05);
        assert_eq!(cfg.domain.y_max, 0.05);
        assert_eq!(cfg.domain.z_min, 0.0);
        assert_eq!(cfg.domain.z_max, 0.1);
        assert_eq!(cfg.render.panel_size, 320);
        assert_eq!(cfg.render.point_stride, 2);
        assert_eq!(cfg.render.elevation_deg, 20.0);
        assert_eq!(cfg.animation.fps, 8);
        assert_eq!(cfg.animation.max_frames, 30);
        assert_eq!(cfg.animation.rotate_frames, 36);
    }

    #[test]
    fn test_grid_from_config() {
        let g = Config::default().grid();
        assert_eq!(g.cell_count(), 64000);
        assert_eq!(g.bounds.z, (0.0, 0.1));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "grid:\n  nx: 20\nanimation:\n  fps: 4\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.grid.nx, 20);
        assert_eq!(cfg.grid.ny, 40); // default
        assert_eq!(cfg.animation.fps, 4);
        assert_eq!(cfg.animation.max_frames, 30); // default
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
grid:
  nx: 8
  ny: 8
  nz: 16
domain:
  x_min: -0.1
  x_max: 0.1
  y_min: -0.1
  y_max: 0.1
  z_min: 0.0
  z_max: 0.4
render:
  panel_size: 200
  cloud_width: 400
  cloud_height: 300
  point_stride: 1
  elevation_deg: 30.0
animation:
  fps: 12
  max_frames: 60
  rotate_frames: 72
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.grid.nz, 16);
        assert_eq!(cfg.domain.z_max, 0.4);
        assert_eq!(cfg.render.point_stride, 1);
        assert_eq!(cfg.animation.rotate_frames, 72);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = load(Some(&tmp.path().join("absent.yaml")));
        assert_eq!(cfg.grid.nx, 40);
    }

    #[test]
    fn test_load_malformed_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.yaml");
        std::fs::write(&path, "grid: [this is not a map]").unwrap();
        let cfg = load(Some(&path));
        assert_eq!(cfg.grid.nx, 40);
    }
}
