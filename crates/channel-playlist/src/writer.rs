use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::error::WriteError;

pub const DEFAULT_OUTPUT_DIR: &str = "playlists";

/// Writes finished playlists into a single output directory.
#[derive(Debug, Clone)]
pub struct PlaylistWriter {
    output_dir: PathBuf,
}

impl Default for PlaylistWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl PlaylistWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `content` to `<output_dir>/<filename>`, replacing any previous
    /// file. The directory and its missing parents are created first.
    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, WriteError> {
        if !self.output_dir.exists() {
            info!(path = %self.output_dir.display(), "Creating output directory");
            std::fs::create_dir_all(&self.output_dir).map_err(|source| {
                error!(path = %self.output_dir.display(), error = %source, "Error creating output directory");
                WriteError::CreateDir {
                    path: self.output_dir.clone(),
                    source,
                }
            })?;
        }

        let path = self.output_dir.join(filename);
        match std::fs::write(&path, content) {
            Ok(()) => {
                info!(path = %path.display(), "Successfully wrote playlist");
                Ok(path)
            }
            Err(source) => {
                error!(path = %path.display(), error = %source, "Error writing file");
                Err(WriteError::Write { path, source })
            }
        }
    }
}
