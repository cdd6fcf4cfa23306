//! GIF assembly. Frames are rendered one at a time into a scratch directory
//! of PNGs next to the output file, then encoded into a looping GIF. The
//! scratch directory is removed when assembly finishes, successfully or not.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use log::{info, warn};

use crate::error::VizError;
use crate::render::Raster;

/// Stride that keeps at most `max_frames` out of `len` items.
pub fn select_stride(len: usize, max_frames: usize) -> usize {
    if max_frames == 0 {
        return 1;
    }
    ((len + max_frames - 1) / max_frames).max(1)
}

/// Render each item with `render` and assemble the results into a looping
/// GIF at `output`. Items whose render fails are skipped with a warning;
/// zero surviving frames is an error and no output file is written.
/// Returns the number of frames encoded.
pub fn assemble_gif<I, F>(items: I, output: &Path, fps: u32, mut render: F) -> Result<usize, VizError>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Result<Raster, VizError>,
{
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let scratch = tempfile::Builder::new()
        .prefix("boilviz-frames-")
        .tempdir_in(parent)?;

    let mut frames: Vec<PathBuf> = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        match render(item) {
            Ok(raster) => {
                let path = scratch.path().join(format!("frame_{idx:04}.png"));
                raster.to_image().save(&path)?;
                frames.push(path);
            }
            Err(err) => warn!("skipping frame {idx}: {err}"),
        }
    }
    if frames.is_empty() {
        return Err(VizError::NoFrames);
    }

    encode_gif(&frames, output, fps)?;
    info!("wrote {} ({} frames)", output.display(), frames.len());
    Ok(frames.len())
}

fn encode_gif(frames: &[PathBuf], output: &Path, fps: u32) -> Result<(), VizError> {
    let writer = BufWriter::new(File::create(output)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    let delay = Delay::from_numer_denom_ms(1000, fps.max(1));
    for path in frames {
        let rgba = image::open(path)?.into_rgba8();
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;
    use std::io::BufReader;

    fn solid_frame(level: u8) -> Raster {
        let mut raster = Raster::new(8, 8);
        raster.fill([level, 0, 0, 255]);
        raster
    }

    #[test]
    fn test_select_stride() {
        assert_eq!(select_stride(10, 30), 1);
        assert_eq!(select_stride(60, 30), 2);
        assert_eq!(select_stride(61, 30), 3);
        assert_eq!(select_stride(0, 30), 1);
        assert_eq!(select_stride(10, 0), 1);
    }

    #[test]
    fn test_assemble_gif_encodes_all_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anim.gif");
        let n = assemble_gif(0u8..3, &out, 8, |i| Ok(solid_frame(i * 80))).unwrap();
        assert_eq!(n, 3);

        let decoder = GifDecoder::new(BufReader::new(File::open(&out).unwrap())).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn test_assemble_gif_cleans_scratch_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anim.gif");
        assemble_gif(0u8..2, &out, 8, |i| Ok(solid_frame(i))).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["anim.gif"]);
    }

    #[test]
    fn test_assemble_gif_skips_failed_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anim.gif");
        let n = assemble_gif(0u8..4, &out, 8, |i| {
            if i == 2 {
                Err(VizError::NoTimesteps(PathBuf::from("nope")))
            } else {
                Ok(solid_frame(i * 60))
            }
        })
        .unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_assemble_gif_errors_without_frames() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anim.gif");
        let err = assemble_gif(0u8..3, &out, 8, |_| {
            Err(VizError::NoTimesteps(PathBuf::from("nope")))
        })
        .unwrap_err();
        assert!(matches!(err, VizError::NoFrames));
        assert!(!out.exists());
        // Scratch directory is gone even on the error path.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(entries.is_empty());
    }
}
