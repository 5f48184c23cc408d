use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// What gets written to the state file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub index: usize,
}

/// Durable pointer to the next product to post.
///
/// The stored index is never bounded on write; `next` wraps it to 0 once it
/// runs past the current list, which also covers a list that shrank.
#[derive(Debug)]
pub struct PostingCursor {
    path: PathBuf,
    index: usize,
}

impl PostingCursor {
    /// Reads the state file at `path`. A missing or unreadable file starts at 0.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let index = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<CursorState>(&data) {
                Ok(state) => state.index,
                Err(e) => {
                    warn!("Ignoring corrupt cursor file {:?}: {}", path, e);
                    0
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                warn!("Could not read cursor file {:?}: {}", path, e);
                0
            }
        };
        PostingCursor { path, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index to post from a list of `len` items, or `None` for an empty list.
    pub fn next(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if self.index >= len {
            self.index = 0;
        }
        Some(self.index)
    }

    /// Moves past the posted item and writes the new index to disk.
    ///
    /// The in-memory index advances even when the write fails.
    pub fn advance(&mut self) -> Result<()> {
        self.index += 1;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let data = serde_json::to_string(&CursorState { index: self.index })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|source| Error::Persistence {
                path: self.path.clone(),
                source,
            })
    }
}
