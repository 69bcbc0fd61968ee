//! Core image processing: the per-folder resize task body

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{PixelType, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage};
use tracing::{debug, info, warn};

use crate::error::{Result, ShrinkError};
use crate::faillog::FailureLog;

pub mod filter;

pub use filter::ResizeAlgorithm;

/// Extension written for every re-encoded output image
pub const OUTPUT_EXTENSION: &str = "png";

/// One unit of work: downsample every image in a single class folder
#[derive(Debug, Clone)]
pub struct FolderTask {
    /// Class folder to read
    pub input_dir: PathBuf,

    /// Mirror folder to write, created on demand
    pub output_dir: PathBuf,

    /// Resampling algorithm name, resolved when the task runs
    pub algorithm: String,

    /// Target edge length in pixels
    pub size: u32,
}

/// Per-task result
#[derive(Debug, Clone)]
pub struct FolderOutcome {
    /// The class folder this outcome describes
    pub input_dir: PathBuf,

    /// Files successfully decoded, resized and written
    pub resized: usize,

    /// Files that failed and were appended to the failure log
    pub failed: usize,

    /// True when the folder was skipped because the algorithm name
    /// did not resolve; nothing was created or processed
    pub skipped: bool,
}

impl FolderOutcome {
    fn skipped(input_dir: PathBuf) -> Self {
        Self {
            input_dir,
            resized: 0,
            failed: 0,
            skipped: true,
        }
    }
}

/// Decode an image, sniffing the format from file contents rather than
/// trusting the extension.
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?)
}

/// Resample an RGB image to an exact `size` x `size` square.
///
/// Aspect ratio is not preserved; this is a forced resize.
pub fn resample(source: &RgbImage, size: u32, algorithm: ResizeAlgorithm) -> Result<RgbImage> {
    let src = ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        PixelType::U8x3,
    )?;
    let mut dst = Image::new(size, size, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(algorithm.resize_alg());
    resizer.resize(&src, &mut dst, &options)?;

    RgbImage::from_raw(size, size, dst.into_vec())
        .ok_or_else(|| ShrinkError::system("Resampled buffer did not match target dimensions"))
}

/// Decode, normalize to three-channel color, resample and re-encode a
/// single file into `output_dir`.
///
/// The output filename is the input stem with the original extension
/// replaced by [`OUTPUT_EXTENSION`]; an existing file is overwritten.
pub fn resize_one(
    input: &Path,
    output_dir: &Path,
    size: u32,
    algorithm: ResizeAlgorithm,
) -> Result<()> {
    let decoded = decode_image(input)?;

    // Grayscale, palette and alpha variants all collapse to RGB8
    let rgb = decoded.into_rgb8();

    debug!(
        "Resizing {:?}: {}x{} -> {}x{} using {}",
        input,
        rgb.width(),
        rgb.height(),
        size,
        size,
        algorithm
    );

    let resized = resample(&rgb, size, algorithm)?;

    let output_path = output_dir.join(output_name(input));
    resized.save(&output_path)?;

    Ok(())
}

/// Derive the output filename: strip the extension after the final dot
/// and append the fixed output extension.
fn output_name(input: &Path) -> OsString {
    let mut name = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("image"));
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    name
}

/// Downsample every entry of a class folder into its mirror folder.
///
/// An unresolvable algorithm name skips the whole folder without creating
/// the output directory. Per-entry failures are printed, appended to the
/// failure log, and never abort the loop; only task-level filesystem
/// errors (directory creation, directory listing, log appends) escape.
pub fn resize_folder(task: &FolderTask, log: &FailureLog) -> Result<FolderOutcome> {
    info!("Processing folder {:?}", task.input_dir);

    let algorithm = match task.algorithm.parse::<ResizeAlgorithm>() {
        Ok(algorithm) => algorithm,
        Err(_) => {
            warn!(
                "Algorithm '{}' is not available (supported: lanczos, nearest, bilinear, \
                 bicubic, hamming, box); skipping folder {:?}",
                task.algorithm, task.input_dir
            );
            return Ok(FolderOutcome::skipped(task.input_dir.clone()));
        }
    };

    fs::create_dir_all(&task.output_dir)?;

    let mut outcome = FolderOutcome {
        input_dir: task.input_dir.clone(),
        resized: 0,
        failed: 0,
        skipped: false,
    };

    // Every directory entry is attempted; non-image files, corrupt files
    // and nested directories all land on the failure path
    for entry in fs::read_dir(&task.input_dir)? {
        let path = entry?.path();

        match resize_one(&path, &task.output_dir, task.size, algorithm) {
            Ok(()) => outcome.resized += 1,
            Err(err) => {
                warn!("Could not resize {}: {}", path.display(), err);
                log.append(&path)?;
                outcome.failed += 1;
            }
        }
    }

    debug!(
        "Folder {:?} done: {} resized, {} failed",
        task.input_dir, outcome.resized, outcome.failed
    );

    Ok(outcome)
}
