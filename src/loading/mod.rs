//! The document front end: reading a file, segmenting marked-up step
//! text into fragments, and outlining a whole document into a
//! bibliography plus its algorithm elements.

mod outline;
mod segment;

pub use outline::{outline, Outline};
pub use segment::{segment, segment_at};

use std::{fmt, path::Path};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingError<'i> {
    pub problem: String,
    pub details: String,
    pub filename: &'i Path,
}

impl<'i> fmt::Display for LoadingError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.problem, self.details)
    }
}

/// Read a file and return an owned String. We pass that ownership back to
/// the main function so that the Outline created by outline() below can
/// have the same lifetime.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    match std::fs::read_to_string(filename) {
        Ok(content) => Ok(content),
        Err(error) => {
            debug!(?error);
            match error.kind() {
                std::io::ErrorKind::NotFound => Err(LoadingError {
                    problem: "File not found".to_string(),
                    details: String::new(),
                    filename,
                }),
                _ => Err(LoadingError {
                    problem: "Failed reading".to_string(),
                    details: error
                        .kind()
                        .to_string(),
                    filename,
                }),
            }
        }
    }
}
