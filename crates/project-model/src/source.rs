//! Interfaces to the external design-source and event-store collaborators.

use crate::event::{AnnotatedEvent, EventError, EventPatch, NewEvent};
use crate::frame::Frame;

/// Errors reported by collaborators.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

/// Lists the frames of a linked design file.
#[async_trait::async_trait]
pub trait FrameSource: Send + Sync {
    async fn list_frames(&self, file_association: &str) -> Result<Vec<Frame>, SourceError>;
}

/// Stores annotated events for a project.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self, project_id: &str) -> Result<Vec<AnnotatedEvent>, SourceError>;

    async fn create_event(&mut self, event: NewEvent) -> Result<AnnotatedEvent, SourceError>;

    async fn update_event(
        &mut self,
        id: &str,
        patch: EventPatch,
    ) -> Result<AnnotatedEvent, SourceError>;
}
