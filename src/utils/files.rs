//! Debug file opening

use crate::config::settings::{STDERR_DEBUG_FILE, STDOUT_DEBUG_FILE};
use std::fs::OpenOptions;
use std::io::{self, Write};

/// Opens writable handles for wire traces
pub trait FileOpener: Send + Sync {
    fn open(&self, path: &str) -> io::Result<Box<dyn Write + Send>>;
}

/// Opens files on the local filesystem in append mode
///
/// `"stdout"` and `"stderr"` select the process streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileOpener;

impl FileOpener for FsFileOpener {
    fn open(&self, path: &str) -> io::Result<Box<dyn Write + Send>> {
        match path {
            STDOUT_DEBUG_FILE => Ok(Box::new(io::stdout())),
            STDERR_DEBUG_FILE => Ok(Box::new(io::stderr())),
            _ => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Ok(Box::new(file))
            }
        }
    }
}
