//! Sketchbook access and board binding persistence
//!
//! A sketchbook is a folder of sketches. Each sketch is a sub-folder
//! `<name>/` containing `<name>.ino`; its metadata lives next to it in
//! `sketch.json`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::resolver::AttachResult;

/// Name of the per-sketch metadata file
pub const METADATA_FILE: &str = "sketch.json";

#[derive(Error, Debug)]
pub enum SketchError {
    #[error("Sketchbook not found at {0}")]
    SketchbookNotFound(PathBuf),
    #[error("Sketch `{0}` not found in the sketchbook")]
    SketchNotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Persistence collaborator for board bindings
pub trait MetadataStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether a sketch with this name exists
    fn has_sketch(&self, sketch: &str) -> bool;

    /// Record the board a sketch is attached to
    fn attach_board(&self, sketch: &str, result: &AttachResult) -> Result<(), Self::Error>;
}

/// Board binding stored in the sketch metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataCpu {
    pub fqbn: String,
    pub name: String,
    /// Transport the board is reached on ("serial" or "network")
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&AttachResult> for MetadataCpu {
    fn from(result: &AttachResult) -> Self {
        Self {
            fqbn: result.board.fqbn.clone(),
            name: result.board.name.clone(),
            kind: result.transport.as_str().to_string(),
        }
    }
}

/// Contents of `sketch.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SketchMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<MetadataCpu>,
    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A sketch folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    pub name: String,
    pub path: PathBuf,
}

impl Sketch {
    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }

    /// Load metadata, or an empty record if the sketch has none yet
    pub fn load_metadata(&self) -> Result<SketchMetadata, SketchError> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(SketchMetadata::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_metadata(&self, metadata: &SketchMetadata) -> Result<(), SketchError> {
        let content = serde_json::to_string_pretty(metadata)?;
        std::fs::write(self.metadata_path(), content)?;
        Ok(())
    }
}

/// A sketchbook folder on disk
#[derive(Debug, Clone)]
pub struct Sketchbook {
    root: PathBuf,
}

impl Sketchbook {
    /// Open an existing sketchbook folder
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SketchError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SketchError::SketchbookNotFound(root));
        }
        Ok(Self { root })
    }

    /// Find a sketch by name
    pub fn find(&self, name: &str) -> Option<Sketch> {
        let path = self.root.join(name);
        if path.join(format!("{}.ino", name)).is_file() {
            Some(Sketch {
                name: name.to_string(),
                path,
            })
        } else {
            debug!(root = %self.root.display(), sketch = %name, "Sketch not found");
            None
        }
    }
}

impl MetadataStore for Sketchbook {
    type Error = SketchError;

    fn has_sketch(&self, sketch: &str) -> bool {
        self.find(sketch).is_some()
    }

    fn attach_board(&self, sketch: &str, result: &AttachResult) -> Result<(), SketchError> {
        let sketch = self
            .find(sketch)
            .ok_or_else(|| SketchError::SketchNotFound(sketch.to_string()))?;

        let mut metadata = sketch.load_metadata()?;
        metadata.cpu = Some(MetadataCpu::from(result));
        sketch.save_metadata(&metadata)?;

        info!(
            sketch = %sketch.name,
            fqbn = %result.board.fqbn,
            transport = %result.transport,
            "Board attached"
        );
        Ok(())
    }
}
