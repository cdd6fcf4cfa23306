//! Visualization of two-phase boiling simulation cases.
//!
//! Reads per-timestep scalar field dumps (`alpha.water`, `T`) from an
//! OpenFOAM-style case directory and renders them as PNG stills and looping
//! GIF animations: 2D interface slices with a temperature background, and 3D
//! phase-bucketed point clouds. A separate pathway drives ParaView's
//! `pvpython` instead of rendering in-process.

pub mod anim;
pub mod case;
pub mod config;
pub mod error;
pub mod foam;
pub mod grid;
pub mod paraview;
pub mod render;

pub use error::VizError;
