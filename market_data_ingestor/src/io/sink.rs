use std::path::{Path, PathBuf};

use snafu::{Backtrace, ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The destination directory could not be created.
    #[snafu(display("Failed to create directory {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The destination file could not be created or written.
    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// Building or serializing the table failed.
    #[snafu(display("Failed to serialize table to {}: {source}", path.display()))]
    Frame {
        path: PathBuf,
        source: polars::prelude::PolarsError,
        backtrace: Backtrace,
    },

    /// Encoding a rendered image failed.
    #[snafu(display("Failed to render {}: {message}", path.display()))]
    Render {
        path: PathBuf,
        message: String,
        backtrace: Backtrace,
    },
}

/// A destination for one kind of pipeline artifact.
///
/// `T` is the artifact consumed: a raw `BarSeries`, a derived series, a
/// statistics table. Writes are synchronous and overwrite the destination,
/// so writing the same data twice yields the same bytes.
pub trait DataSink<T: ?Sized> {
    /// The type of output returned after a successful write operation.
    ///
    /// File sinks return the path they wrote.
    type Output;

    fn write(&self, data: &T) -> Result<Self::Output, SinkError>;
}

/// Creates the parent directory of `path` if it has one and it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).context(CreateDirSnafu { path: dir })
        }
        _ => Ok(()),
    }
}
