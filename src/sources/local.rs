//! Directory-backed fetcher for offline fixtures.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! └── api/
//!     ├── cours.json        # source path "/api/cours"
//!     └── modules.json      # source path "/api/modules"
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::sources::SourceFetcher;

/// Reads source bodies from JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root_dir: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File path for a source path. Query strings are ignored.
    pub fn path(&self, source_path: &str) -> PathBuf {
        let without_query = source_path.split('?').next().unwrap_or(source_path);
        let relative = without_query.trim_matches('/');
        self.root_dir.join(format!("{}.json", relative))
    }
}

#[async_trait]
impl SourceFetcher for DirectoryFetcher {
    async fn request(&self, path: &str) -> Result<Value> {
        let file = self.path(path);
        let bytes = match tokio::fs::read(&file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::fetch(path, format!("{} not found", file.display())));
            }
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
