//! Parser for OpenFOAM scalar field dumps.
//!
//! Only the "nonuniform internalField" convention is understood: a marker
//! line, an integer cell count, an opening parenthesis, one float per line,
//! and a closing parenthesis. The format is consumed read-only and recovery
//! is best-effort: size mismatches are corrected by padding or truncation,
//! and an unreadable file degrades to an all-zero field. Every recovery is
//! logged so that corrupt data cannot pass silently; `strict` turns the
//! recoveries into hard errors instead.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::VizError;
use crate::grid::{Field3, Grid};

#[derive(PartialEq)]
enum ParseState {
    /// Before the `internalField ... nonuniform` marker line.
    Seeking,
    /// Marker seen; skipping the declared count until the opening paren.
    AwaitOpen,
    /// Inside the value list.
    InData,
}

/// Extract the flat value list from a nonuniform internal field block.
///
/// Returns the values in file order, uncorrected; blank lines, comments and
/// the structural tokens inside the block are skipped. `None` when the file
/// has no marker line at all.
fn extract_values(content: &str) -> Option<Vec<f64>> {
    let mut state = ParseState::Seeking;
    let mut values = Vec::new();

    for raw in content.lines() {
        let line = raw.trim();
        match state {
            ParseState::Seeking => {
                if line.contains("internalField") && line.contains("nonuniform") {
                    state = ParseState::AwaitOpen;
                }
            }
            ParseState::AwaitOpen => {
                if line.starts_with('(') {
                    state = ParseState::InData;
                }
                // The count line and anything else before '(' is structural.
            }
            ParseState::InData => {
                if line == ")" || line == ");" {
                    break;
                }
                if let Ok(v) = line.parse::<f64>() {
                    values.push(v);
                }
                // Non-numeric lines inside the block (blanks, comments) are
                // tolerated; the closing paren is the only terminator.
            }
        }
    }

    if state == ParseState::Seeking {
        None
    } else {
        Some(values)
    }
}

/// Pad with the trailing fill value or truncate so `values.len() == expected`.
/// The fill is the last collected value, or 0.0 when nothing was collected.
fn correct_size(mut values: Vec<f64>, expected: usize) -> Vec<f64> {
    if values.len() < expected {
        let fill = values.last().copied().unwrap_or(0.0);
        values.resize(expected, fill);
    } else {
        values.truncate(expected);
    }
    values
}

/// Read one scalar field file into a flat vector of exactly `expected` values.
///
/// Lenient mode (the default) never fails on content: missing file, missing
/// marker, and size mismatch all degrade to a usable vector plus a warning.
/// Strict mode propagates each of those as an error.
pub fn read_scalar_field(
    path: &Path,
    expected: usize,
    strict: bool,
) -> Result<Vec<f64>, VizError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if strict {
                return Err(e.into());
            }
            warn!("{}: {e}; using all-zero field", path.display());
            return Ok(vec![0.0; expected]);
        }
    };

    let values = match extract_values(&content) {
        Some(v) => v,
        None => {
            if strict {
                return Err(VizError::MissingDataBlock {
                    path: path.to_path_buf(),
                });
            }
            warn!(
                "{}: no nonuniform internalField block; using all-zero field",
                path.display()
            );
            return Ok(vec![0.0; expected]);
        }
    };

    if values.len() != expected {
        if strict {
            return Err(VizError::FieldSize {
                path: path.to_path_buf(),
                expected,
                got: values.len(),
            });
        }
        warn!(
            "{}: expected {expected} values, parsed {}; {}",
            path.display(),
            values.len(),
            if values.len() < expected {
                "padding with trailing value"
            } else {
                "truncating"
            }
        );
    }

    Ok(correct_size(values, expected))
}

/// Read and reshape one field from a timestep directory onto the grid.
pub fn load_field(
    step_dir: &Path,
    field_name: &str,
    grid: &Grid,
    strict: bool,
) -> Result<Field3, VizError> {
    let values = read_scalar_field(&step_dir.join(field_name), grid.cell_count(), strict)?;
    Ok(Field3::new(grid, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Build a minimal field file body with the given data lines.
    fn field_file(count: usize, lines: &[&str]) -> String {
        let mut s = String::from(
            "FoamFile\n{\n    version     2.0;\n    format      ascii;\n    \
             class       volScalarField;\n    object      alpha.water;\n}\n\n\
             dimensions      [0 0 0 0 0 0 0];\n\n",
        );
        s.push_str(&format!("internalField   nonuniform List<scalar> \n{count}\n(\n"));
        for l in lines {
            s.push_str(l);
            s.push('\n');
        }
        s.push_str(")\n;\n\nboundaryField\n{\n    walls\n    {\n        type zeroGradient;\n    }\n}\n");
        s
    }

    fn write_tmp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("T");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_exact_count_in_file_order() {
        let body = field_file(4, &["0.1", "0.2", "0.3", "0.4"]);
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 4, false).unwrap();
        assert_eq!(v, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_short_block_pads_with_trailing_value() {
        let body = field_file(6, &["1.0", "2.0", "3.0"]);
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 6, false).unwrap();
        assert_eq!(v, vec![1.0, 2.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_empty_block_pads_with_zero() {
        let body = field_file(3, &[]);
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 3, false).unwrap();
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_long_block_truncates() {
        let body = field_file(2, &["1.0", "2.0", "3.0", "4.0"]);
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 2, false).unwrap();
        assert_eq!(v, vec![1.0, 2.0]);
    }

    #[test]
    fn test_blank_and_comment_lines_inside_block() {
        let body = field_file(3, &["1.0", "", "// interior note", "2.0", "3.0"]);
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 3, false).unwrap();
        assert_eq!(v, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_integer_valued_data_is_kept() {
        // The count line is skipped positionally (before the paren), so
        // integer-looking values inside the block still parse as data.
        let body = field_file(3, &["373", "0", "300"]);
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 3, false).unwrap();
        assert_eq!(v, vec![373.0, 0.0, 300.0]);
    }

    #[test]
    fn test_missing_file_degrades_to_zeros() {
        let dir = tempfile::tempdir().unwrap();
        let v = read_scalar_field(&dir.path().join("absent"), 5, false).unwrap();
        assert_eq!(v, vec![0.0; 5]);
    }

    #[test]
    fn test_missing_marker_degrades_to_zeros() {
        let (_d, path) = write_tmp("internalField   uniform 0;\n");
        let v = read_scalar_field(&path, 4, false).unwrap();
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn test_strict_mode_errors() {
        let body = field_file(6, &["1.0", "2.0"]);
        let (_d, path) = write_tmp(&body);
        let err = read_scalar_field(&path, 6, true).unwrap_err();
        assert!(matches!(
            err,
            VizError::FieldSize { expected: 6, got: 2, .. }
        ));

        let (_d2, path2) = write_tmp("internalField   uniform 0;\n");
        let err = read_scalar_field(&path2, 4, true).unwrap_err();
        assert!(matches!(err, VizError::MissingDataBlock { .. }));

        let dir = tempfile::tempdir().unwrap();
        let err = read_scalar_field(&dir.path().join("absent"), 4, true).unwrap_err();
        assert!(matches!(err, VizError::Io(_)));
    }

    #[test]
    fn test_stops_at_closing_paren() {
        // Values after the closing paren (boundaryField junk) are not read.
        let mut body = field_file(2, &["1.0", "2.0"]);
        body.push_str("9.0\n");
        let (_d, path) = write_tmp(&body);
        let v = read_scalar_field(&path, 2, false).unwrap();
        assert_eq!(v, vec![1.0, 2.0]);
    }
}
