//! Portable document format and project envelope.

use crate::background::Background;
use crate::scene::Scene;
use crate::shapes::{ObjectTrait, SceneObject};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;

/// Document loading and saving errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Scene contents in their durable form.
///
/// Image objects carry only their source reference; pixels are decoded again
/// after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct Document {
    pub objects: Vec<SceneObject>,
    pub background: Background,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    objects: Vec<SceneObject>,
    #[serde(default)]
    background: Option<serde_json::Value>,
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let background = match raw.background {
            None | Some(serde_json::Value::Null) => Background::white(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Unrecognized background ({}), using white", e);
                Background::white()
            }),
        };
        // Ids must stay unique for selection and decode lookups
        let mut objects = raw.objects;
        let mut seen = HashSet::new();
        for object in &mut objects {
            if !seen.insert(object.id()) {
                let duplicate = object.id();
                let fresh = object.renew_id();
                log::warn!("Duplicate object id {}, reassigned to {}", duplicate, fresh);
                seen.insert(fresh);
            }
        }
        Self {
            objects,
            background,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            background: Background::white(),
        }
    }
}

impl Document {
    /// Capture a scene's objects and background.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            objects: scene.iter().map(SceneObject::detached).collect(),
            background: scene.background.clone(),
        }
    }

    /// Build a scene; image objects start out pending.
    pub fn into_scene(self) -> Scene {
        Scene::from_parts(self.objects, self.background)
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse either a bare document or a project envelope.
    pub fn from_json_any(json: &str) -> DocumentResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let is_project = value.get("data").is_some() && value.get("objects").is_none();
        if is_project {
            let project: Project = serde_json::from_value(value)?;
            Ok(project.data)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    /// Read a document or project file.
    pub fn load(path: &Path) -> DocumentResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_any(&json)
    }

    /// Write the document as JSON.
    pub fn save(&self, path: &Path) -> DocumentResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Number of objects of each kind, in a stable order.
    pub fn kind_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for object in &self.objects {
            let name = object.kind().name();
            match counts.iter_mut().find(|(kind, _)| *kind == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name, 1)),
            }
        }
        counts
    }
}

/// A saved project: a document plus the time it was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub data: Document,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Project {
    /// Wrap a document, stamped with the current UTC time.
    pub fn now(data: Document) -> Self {
        Self {
            data,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save(&self, path: &Path) -> DocumentResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
