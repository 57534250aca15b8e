//! Environment preparation before any chain launches.

use crate::errors::PipelineError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Validates the input alignment and ensures the output directory exists.
///
/// The input must be a readable regular file. Directory creation is
/// idempotent: an already-existing directory is logged and ignored, never
/// fatal, and pre-existing contents are left untouched. Any other creation
/// failure is fatal. No other filesystem mutation happens here.
pub fn prepare_environment(bam_path: &Path, output_dir: &Path) -> Result<(), PipelineError> {
    check_readable(bam_path)?;

    match fs::create_dir(output_dir) {
        Ok(()) => {
            tracing::debug!(dir = %output_dir.display(), "created output directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::info!(dir = %output_dir.display(), "output directory already exists");
            Ok(())
        }
        Err(source) => Err(PipelineError::DirectoryCreate {
            path: output_dir.to_path_buf(),
            source,
        }),
    }
}

/// A file is readable if it is a regular file we can open for reading.
fn check_readable(path: &Path) -> Result<(), PipelineError> {
    let unreadable = || PipelineError::InputUnreadable {
        path: path.to_path_buf(),
    };

    let metadata = fs::metadata(path).map_err(|_| unreadable())?;
    if !metadata.is_file() {
        return Err(unreadable());
    }
    fs::File::open(path).map_err(|_| unreadable())?;
    Ok(())
}
