use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong at the CLI's I/O boundary. The
/// analyzer core itself is infallible; every variant here names a
/// condition the filesystem or argument handling produced.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("'{0}' is neither a .wren file nor a directory")]
    NotWrenFileOrDirectory(PathBuf),

    #[error("'{path}' is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize diagnostics: {0}")]
    Serialize(String),
}
