use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the visualization pipeline.
///
/// Most parse-side problems are recovered from with a logged warning instead
/// of an error; these variants cover strict mode and the failures that leave
/// nothing useful to show.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("no timestep directories with both field files under {0}")]
    NoTimesteps(PathBuf),

    #[error("{path}: no 'internalField ... nonuniform' block found")]
    MissingDataBlock { path: PathBuf },

    #[error("{path}: expected {expected} values, parsed {got}")]
    FieldSize {
        path: PathBuf,
        expected: usize,
        got: usize,
    },

    #[error("no frames were rendered; nothing to assemble")]
    NoFrames,

    #[error("{tool} failed with {status}")]
    ToolFailed { tool: &'static str, status: String },

    #[error("{tool} not available: {hint}")]
    ToolMissing { tool: &'static str, hint: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
