// JSON project store adapter - Loads project documents from disk

use std::path::Path;

use tracing::debug;

use crate::error::{ExportError, ExportResult};
use crate::ports::ProjectSource;
use crate::project::Project;

/// Project source reading serialized JSON documents from the filesystem
#[derive(Debug, Default)]
pub struct JsonProjectStore;

impl JsonProjectStore {
    /// Create new JSON project store
    pub fn new() -> Self {
        Self
    }
}

impl ProjectSource for JsonProjectStore {
    fn load(&self, path: &Path) -> ExportResult<Project> {
        debug!("Reading project file: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExportError::InvalidProjectFormat {
                message: format!("failed to read {}: {}", path.display(), e),
            }
        })?;

        let document = serde_json::from_str(&content).map_err(|e| {
            ExportError::InvalidProjectFormat {
                message: format!("failed to parse {}: {}", path.display(), e),
            }
        })?;

        Project::from_document(document)
    }
}
