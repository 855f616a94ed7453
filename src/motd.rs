//! Message of the day source.
//!
//! The file is read once at startup. A missing file is not an error: the
//! server just answers MOTD with ERR_NOMOTD.

use std::io;
use std::path::Path;

use tracing::{info, warn};

#[derive(Clone, Debug, Default)]
pub struct Motd {
    lines: Option<Vec<String>>,
}

impl Motd {
    /// No MOTD configured.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the MOTD from disk, degrading to [`Motd::empty`] on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_text(path) {
            Ok(text) => {
                let motd = Self::from_text(&text);
                info!(path = %path.display(), lines = motd.lines().map_or(0, |l| l.len()), "MOTD loaded");
                motd
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No MOTD file");
                Self::empty()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read MOTD file");
                Self::empty()
            }
        }
    }

    /// Split text into MOTD lines. Blank text means no MOTD.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::empty();
        }
        let lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect();
        Self { lines: Some(lines) }
    }

    pub fn lines(&self) -> Option<&[String]> {
        self.lines.as_deref()
    }
}

fn read_text(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}
