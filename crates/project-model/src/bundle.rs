//! Event bundles: a local JSON file holding a project's frames and events.
//!
//! A bundle stands in for the design-source and event-store backends when
//! working offline or from the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::event::{AnnotatedEvent, EventPatch, NewEvent};
use crate::frame::Frame;
use crate::source::{EventStore, FrameSource, SourceError};

/// Current bundle schema version.
pub const BUNDLE_VERSION: &str = "1.0";

/// Top-level bundle file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBundle {
    /// Schema version.
    pub version: String,

    /// Project metadata.
    pub project: BundleProject,

    /// Frames in display order.
    #[serde(default)]
    pub frames: Vec<Frame>,

    /// Events in caller order.
    #[serde(default)]
    pub events: Vec<AnnotatedEvent>,
}

/// Project metadata carried by a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleProject {
    /// Backend project identifier.
    pub id: String,

    /// Human-readable project name.
    pub name: String,

    /// GA4 measurement ID used in generated snippets.
    #[serde(default)]
    pub measurement_id: Option<String>,

    /// Linked design file key.
    #[serde(default)]
    pub file_association: Option<String>,

    /// Last modified timestamp (ISO 8601).
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl EventBundle {
    /// Create an empty bundle.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            version: BUNDLE_VERSION.to_string(),
            project: BundleProject {
                id: id.into(),
                name: name.into(),
                measurement_id: None,
                file_association: None,
                modified_at: Some(chrono::Utc::now().to_rfc3339()),
            },
            frames: vec![],
            events: vec![],
        }
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    /// Human-readable problems with the bundle contents.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];

        for frame in &self.frames {
            if !frame.intrinsic_size().is_valid() {
                issues.push(format!(
                    "Frame {} ({}) has no usable intrinsic size",
                    frame.id, frame.name
                ));
            }
            if frame.image_url.is_none() {
                issues.push(format!("Frame {} ({}) has no image URL", frame.id, frame.name));
            }
        }

        for event in &self.events {
            if let Err(e) = event.validate() {
                issues.push(format!("Event {} ({}): {e}", event.id, event.name));
            }
            if self.frame(&event.frame_id).is_none() {
                issues.push(format!(
                    "Event {} ({}) references unknown frame {}",
                    event.id, event.name, event.frame_id
                ));
            }
        }

        issues
    }

    fn next_event_id(&self) -> String {
        let mut n = self.events.len() + 1;
        loop {
            let id = format!("evt-{n}");
            if !self.events.iter().any(|event| event.id == id) {
                return id;
            }
            n += 1;
        }
    }

    fn touch(&mut self) {
        self.project.modified_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

/// A bundle together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedBundle {
    /// Filesystem path of the bundle file.
    pub path: PathBuf,

    /// Bundle contents.
    pub bundle: EventBundle,
}

impl LoadedBundle {
    /// Load a bundle and reject stored events that break region invariants.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref().to_path_buf();

        let json = std::fs::read_to_string(&path).map_err(|e| BundleError::IoError {
            path: path.clone(),
            source: e,
        })?;

        let bundle: EventBundle =
            serde_json::from_str(&json).map_err(|e| BundleError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        for event in &bundle.events {
            event
                .validate()
                .map_err(|e| BundleError::ValidationError {
                    message: format!("event {}: {e}", event.id),
                })?;
        }

        Ok(Self { path, bundle })
    }

    /// Save the bundle to its path.
    pub fn save(&self) -> Result<(), BundleError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| BundleError::IoError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let json =
            serde_json::to_string_pretty(&self.bundle).map_err(|e| BundleError::ParseError {
                path: self.path.clone(),
                source: e,
            })?;
        std::fs::write(&self.path, json).map_err(|e| BundleError::IoError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    /// Create a new, empty bundle on disk.
    pub fn create(
        path: impl AsRef<Path>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, BundleError> {
        let loaded = Self {
            path: path.as_ref().to_path_buf(),
            bundle: EventBundle::new(id, name),
        };
        loaded.save()?;
        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl FrameSource for LoadedBundle {
    async fn list_frames(&self, file_association: &str) -> Result<Vec<Frame>, SourceError> {
        match &self.bundle.project.file_association {
            Some(linked) if linked != file_association => Err(SourceError::NotFound {
                kind: "design file",
                id: file_association.to_string(),
            }),
            _ => Ok(self.bundle.frames.clone()),
        }
    }
}

#[async_trait::async_trait]
impl EventStore for LoadedBundle {
    async fn list_events(&self, project_id: &str) -> Result<Vec<AnnotatedEvent>, SourceError> {
        if project_id != self.bundle.project.id {
            return Err(SourceError::NotFound {
                kind: "project",
                id: project_id.to_string(),
            });
        }
        Ok(self.bundle.events.clone())
    }

    async fn create_event(&mut self, event: NewEvent) -> Result<AnnotatedEvent, SourceError> {
        if self.bundle.frame(&event.frame_id).is_none() {
            return Err(SourceError::NotFound {
                kind: "frame",
                id: event.frame_id,
            });
        }
        let id = self.bundle.next_event_id();
        let created = event.into_event(id)?;
        self.bundle.events.push(created.clone());
        self.bundle.touch();
        Ok(created)
    }

    async fn update_event(
        &mut self,
        id: &str,
        patch: EventPatch,
    ) -> Result<AnnotatedEvent, SourceError> {
        let event = self
            .bundle
            .events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| SourceError::NotFound {
                kind: "event",
                id: id.to_string(),
            })?;
        patch.apply(event)?;
        let updated = event.clone();
        self.bundle.touch();
        Ok(updated)
    }
}

/// Errors that can occur when working with bundles.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid bundle: {message}")]
    ValidationError { message: String },
}
