//! Timestep discovery for a case directory.
//!
//! An OpenFOAM case stores one subdirectory per saved time, named by the
//! stringified time value. A timestep qualifies only when both required
//! field files are present; everything else (`constant`, `system`,
//! non-numeric names) is skipped without comment.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::VizError;

/// Volume fraction field file name (reference phase: water).
pub const ALPHA_FIELD: &str = "alpha.water";
/// Temperature field file name.
pub const TEMP_FIELD: &str = "T";

/// One discovered timestep. Keeps the directory name verbatim so that
/// `0.050`-style names round-trip, rather than reformatting the float.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestep {
    pub time: f64,
    pub name: String,
}

impl Timestep {
    pub fn dir(&self, case: &Case) -> PathBuf {
        case.root.join(&self.name)
    }
}

/// Handle on a case directory root.
#[derive(Debug, Clone)]
pub struct Case {
    root: PathBuf,
}

impl Case {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan for timestep directories containing both field files, sorted
    /// ascending by numeric time value (not lexically: "0.05" < "0.1" < "0.2").
    ///
    /// An empty result is not an error here; callers that need at least one
    /// frame use [`Case::scan_required`].
    pub fn scan(&self) -> Result<Vec<Timestep>, VizError> {
        let mut steps = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(n) => n,
                Err(_) => continue,
            };
            let Ok(time) = name.parse::<f64>() else {
                continue;
            };
            if !time.is_finite() {
                continue;
            }
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if !path.join(ALPHA_FIELD).is_file() || !path.join(TEMP_FIELD).is_file() {
                debug!("skipping {name}: missing {ALPHA_FIELD} or {TEMP_FIELD}");
                continue;
            }
            steps.push(Timestep { time, name });
        }
        steps.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(steps)
    }

    /// Like [`Case::scan`], but zero qualifying directories is an error.
    pub fn scan_required(&self) -> Result<Vec<Timestep>, VizError> {
        let steps = self.scan()?;
        if steps.is_empty() {
            return Err(VizError::NoTimesteps(self.root.clone()));
        }
        Ok(steps)
    }

    /// The timestep closest in time to `want`, or `None` for an empty slice.
    pub fn nearest<'a>(steps: &'a [Timestep], want: f64) -> Option<&'a Timestep> {
        steps.iter().min_by(|a, b| {
            let da = (a.time - want).abs();
            let db = (b.time - want).abs();
            da.total_cmp(&db)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn make_step(root: &Path, name: &str, with_alpha: bool, with_temp: bool) {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        if with_alpha {
            File::create(dir.join(ALPHA_FIELD)).unwrap();
        }
        if with_temp {
            File::create(dir.join(TEMP_FIELD)).unwrap();
        }
    }

    #[test]
    fn test_scan_sorts_numerically() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["0.2", "0.05", "0.1"] {
            make_step(tmp.path(), name, true, true);
        }
        let case = Case::new(tmp.path());
        let steps = case.scan().unwrap();
        let times: Vec<f64> = steps.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.05, 0.1, 0.2]);
        // Lexical order would have been ["0.05", "0.1", "0.2"] too, so also
        // check a case where lexical and numeric disagree.
        make_step(tmp.path(), "10", true, true);
        let steps = case.scan().unwrap();
        assert_eq!(steps.last().unwrap().name, "10");
    }

    #[test]
    fn test_scan_skips_incomplete_and_non_numeric() {
        let tmp = tempfile::tempdir().unwrap();
        make_step(tmp.path(), "0.1", true, true);
        make_step(tmp.path(), "0.2", true, false); // missing T
        make_step(tmp.path(), "0.3", false, true); // missing alpha.water
        make_step(tmp.path(), "constant", true, true); // non-numeric
        File::create(tmp.path().join("0.4")).unwrap(); // a file, not a dir
        let steps = Case::new(tmp.path()).scan().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "0.1");
    }

    #[test]
    fn test_scan_preserves_directory_name() {
        let tmp = tempfile::tempdir().unwrap();
        make_step(tmp.path(), "0.050", true, true);
        let case = Case::new(tmp.path());
        let steps = case.scan().unwrap();
        assert_eq!(steps[0].name, "0.050");
        assert!(steps[0].dir(&case).ends_with("0.050"));
    }

    #[test]
    fn test_scan_required_empty_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Case::new(tmp.path()).scan_required().unwrap_err();
        assert!(matches!(err, VizError::NoTimesteps(_)));
    }

    #[test]
    fn test_nearest() {
        let steps = vec![
            Timestep { time: 0.05, name: "0.05".into() },
            Timestep { time: 0.1, name: "0.1".into() },
            Timestep { time: 0.2, name: "0.2".into() },
        ];
        assert_eq!(Case::nearest(&steps, 0.12).unwrap().name, "0.1");
        assert_eq!(Case::nearest(&steps, 99.0).unwrap().name, "0.2");
        assert!(Case::nearest(&[], 0.0).is_none());
    }
}
