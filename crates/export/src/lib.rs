//! Export helpers for calculation artifacts and project snapshots.

use thiserror::Error;

/// Errors raised while writing or reading artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub mod output {
    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        ensure_parent_dir(path)?;
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Create the parent directory of `path` if it has one.
    pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

pub mod json {
    use std::fs::File;
    use std::io::{BufReader, Write};
    use std::path::Path;

    use serde::Serialize;
    use serde::de::DeserializeOwned;

    use super::ExportError;
    use super::output::writer_for_path;

    /// Write `value` as pretty JSON to `path` (`-` for stdout), newline-terminated.
    pub fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
        let mut writer = writer_for_path(path)?;
        serde_json::to_writer_pretty(&mut writer, value)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a JSON document written by [`write_pretty`].
    pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, ExportError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
