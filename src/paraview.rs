//! ParaView batch driver. Writes a pvpython script that renders the case
//! with temperature coloring, velocity glyphs, and the water isosurface,
//! runs it, then turns the saved frames into a GIF with whichever of
//! ImageMagick or ffmpeg is installed.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};

use crate::error::VizError;

/// Empty marker file the OpenFOAM reader keys off.
const CASE_STUB: &str = "case.foam";

pub struct ParaviewJob {
    pub case_root: PathBuf,
    pub frames_dir: PathBuf,
    pub view_size: (u32, u32),
    pub glyph_stride: usize,
}

impl ParaviewJob {
    /// Write the stub file the reader expects. An existing stub is left as is.
    pub fn ensure_case_stub(&self) -> io::Result<PathBuf> {
        let stub = self.case_root.join(CASE_STUB);
        if !stub.exists() {
            fs::write(&stub, b"")?;
        }
        Ok(stub)
    }

    /// The pvpython program, rendering `frame_count` frames into
    /// `frames_dir`.
    pub fn script_text(&self, frame_count: usize) -> String {
        let mut s = String::new();
        s.push_str("from paraview.simple import *\n\n");
        s.push_str("paraview.simple._DisableFirstRenderCameraReset()\n\n");
        s.push_str(&format!("reader = OpenFOAMReader(FileName='{}')\n", CASE_STUB));
        s.push_str("reader.MeshRegions = ['internalMesh']\n");
        s.push_str("reader.CellArrays = ['T', 'U', 'alpha.water', 'p_rgh']\n\n");
        s.push_str("scene = GetAnimationScene()\n");
        s.push_str("scene.UpdateAnimationUsingDataTimeSteps()\n\n");
        s.push_str("view = GetActiveViewOrCreate('RenderView')\n");
        let _ = writeln!(s, "view.ViewSize = [{}, {}]", self.view_size.0, self.view_size.1);
        s.push_str("view.Background = [1.0, 1.0, 1.0]\n\n");
        s.push_str("display = Show(reader, view, 'UnstructuredGridRepresentation')\n");
        s.push_str("display.Representation = 'Surface'\n");
        s.push_str("ColorBy(display, ('POINTS', 'T'))\n");
        s.push_str("tLUT = GetColorTransferFunction('T')\n");
        s.push_str(
            "tLUT.RGBPoints = [298.15, 0.0, 0.0, 1.0,\n\
             \x20                 350.0, 0.0, 1.0, 0.0,\n\
             \x20                 373.15, 1.0, 1.0, 0.0,\n\
             \x20                 400.0, 1.0, 0.0, 0.0]\n",
        );
        s.push_str("tLUT.ColorSpace = 'HSV'\n");
        s.push_str("bar = GetScalarBar(tLUT, view)\n");
        s.push_str("bar.Title = 'Temperature [K]'\n");
        s.push_str("display.SetScalarBarVisibility(view, True)\n\n");
        s.push_str("glyph = Glyph(Input=reader, GlyphType='Arrow')\n");
        s.push_str("glyph.OrientationArray = ['POINTS', 'U']\n");
        s.push_str("glyph.ScaleArray = ['POINTS', 'U']\n");
        s.push_str("glyph.ScaleFactor = 0.01\n");
        s.push_str("glyph.GlyphMode = 'Every Nth Point'\n");
        let _ = writeln!(s, "glyph.Stride = {}", self.glyph_stride.max(1));
        s.push_str("glyphDisplay = Show(glyph, view, 'GeometryRepresentation')\n");
        s.push_str("ColorBy(glyphDisplay, ('POINTS', 'U', 'Magnitude'))\n\n");
        s.push_str("surface = Contour(Input=reader)\n");
        s.push_str("surface.ContourBy = ['POINTS', 'alpha.water']\n");
        s.push_str("surface.Isosurfaces = [0.5]\n");
        s.push_str("surfaceDisplay = Show(surface, view, 'GeometryRepresentation')\n");
        s.push_str("surfaceDisplay.ColorArrayName = [None, '']\n");
        s.push_str("surfaceDisplay.DiffuseColor = [0.0, 0.5, 1.0]\n");
        s.push_str("surfaceDisplay.Opacity = 0.3\n\n");
        s.push_str("view.CameraPosition = [0.15, 0.15, 0.15]\n");
        s.push_str("view.CameraFocalPoint = [0.0, 0.0, 0.05]\n");
        s.push_str("view.CameraViewUp = [0.0, 0.0, 1.0]\n");
        s.push_str("view.ResetCamera()\n\n");
        s.push_str("scene.PlayMode = 'Sequence'\n");
        let _ = writeln!(s, "scene.NumberOfFrames = {}", frame_count.max(1));
        let _ = writeln!(
            s,
            "SaveAnimation('{}/frame.png', view,\n\
             \x20             ImageResolution=[{}, {}],\n\
             \x20             FrameWindow=[0, scene.NumberOfFrames - 1])",
            self.frames_dir.display(),
            self.view_size.0,
            self.view_size.1
        );
        s
    }

    pub fn write_script(&self, path: &Path, frame_count: usize) -> Result<(), VizError> {
        fs::write(path, self.script_text(frame_count))?;
        Ok(())
    }

    /// Generate the script and run it under pvpython from the case root.
    pub fn run(&self, frame_count: usize) -> Result<PathBuf, VizError> {
        self.ensure_case_stub()?;
        fs::create_dir_all(&self.frames_dir)?;
        let script = self.case_root.join("boilviz_paraview.py");
        self.write_script(&script, frame_count)?;
        info!("running pvpython on {}", script.display());
        run_tool(
            "pvpython",
            "ParaView must be installed with pvpython on PATH",
            Command::new("pvpython").arg(&script).current_dir(&self.case_root),
        )?;
        Ok(script)
    }

    fn list_frames(&self) -> Result<Vec<PathBuf>, VizError> {
        let mut frames: Vec<PathBuf> = fs::read_dir(&self.frames_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "png"))
            .collect();
        frames.sort();
        Ok(frames)
    }

    /// Assemble the saved frames into a looping GIF, preferring ImageMagick
    /// and falling back to ffmpeg. Returns the tool that succeeded. When
    /// neither works the error carries the commands to run by hand.
    pub fn assemble_frames(&self, output: &Path, fps: u32) -> Result<&'static str, VizError> {
        let frames = self.list_frames()?;
        if frames.is_empty() {
            return Err(VizError::NoFrames);
        }
        let fps = fps.max(1);
        let delay_cs = (100 / fps).max(1);

        let mut convert = Command::new("convert");
        convert.arg("-delay").arg(delay_cs.to_string());
        convert.arg("-loop").arg("0");
        convert.args(&frames);
        convert.arg(output);
        match run_tool("convert", "", &mut convert) {
            Ok(()) => return Ok("convert"),
            Err(err) => warn!("convert unavailable, trying ffmpeg: {err}"),
        }

        let glob = format!("{}/*.png", self.frames_dir.display());
        let mut ffmpeg = Command::new("ffmpeg");
        ffmpeg
            .arg("-y")
            .arg("-framerate")
            .arg(fps.to_string())
            .arg("-pattern_type")
            .arg("glob")
            .arg("-i")
            .arg(&glob)
            .arg(output);
        match run_tool("ffmpeg", "", &mut ffmpeg) {
            Ok(()) => Ok("ffmpeg"),
            Err(_) => Err(VizError::ToolMissing {
                tool: "ffmpeg",
                hint: format!(
                    "no GIF tool succeeded; run one of:\n  \
                     convert -delay {delay_cs} -loop 0 {glob} {out}\n  \
                     ffmpeg -framerate {fps} -pattern_type glob -i '{glob}' {out}",
                    out = output.display()
                ),
            }),
        }
    }
}

fn run_tool(tool: &'static str, hint: &str, command: &mut Command) -> Result<(), VizError> {
    match command.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(VizError::ToolFailed {
            tool,
            status: status.to_string(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(VizError::ToolMissing {
            tool,
            hint: hint.to_string(),
        }),
        Err(err) => Err(VizError::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(root: &Path) -> ParaviewJob {
        ParaviewJob {
            case_root: root.to_path_buf(),
            frames_dir: root.join("animation_frames"),
            view_size: (1200, 800),
            glyph_stride: 5,
        }
    }

    #[test]
    fn test_script_mentions_pipeline_stages() {
        let dir = tempfile::tempdir().unwrap();
        let script = job(dir.path()).script_text(40);
        assert!(script.contains("OpenFOAMReader(FileName='case.foam')"));
        assert!(script.contains("'alpha.water'"));
        assert!(script.contains("Isosurfaces = [0.5]"));
        assert!(script.contains("glyph.Stride = 5"));
        assert!(script.contains("scene.NumberOfFrames = 40"));
        assert!(script.contains("ViewSize = [1200, 800]"));
    }

    #[test]
    fn test_case_stub_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let j = job(dir.path());
        let stub = j.ensure_case_stub().unwrap();
        assert!(stub.exists());
        fs::write(&stub, b"marker").unwrap();
        j.ensure_case_stub().unwrap();
        assert_eq!(fs::read(&stub).unwrap(), b"marker");
    }

    #[test]
    fn test_run_tool_maps_missing_binary() {
        let err = run_tool(
            "pvpython",
            "install ParaView",
            &mut Command::new("boilviz-no-such-binary"),
        )
        .unwrap_err();
        match err {
            VizError::ToolMissing { tool, hint } => {
                assert_eq!(tool, "pvpython");
                assert_eq!(hint, "install ParaView");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_assemble_without_frames_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let j = job(dir.path());
        fs::create_dir_all(&j.frames_dir).unwrap();
        let err = j.assemble_frames(&dir.path().join("out.gif"), 5).unwrap_err();
        assert!(matches!(err, VizError::NoFrames));
    }

    #[test]
    fn test_write_script_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let j = job(dir.path());
        let path = dir.path().join("drive.py");
        j.write_script(&path, 10).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("SaveAnimation"));
    }
}
