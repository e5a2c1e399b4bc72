//! Tracked interaction events annotated onto frames.
//!
//! Events are owned by the event store; renderers only read them. Region
//! geometry is validated on every write path so a zero-area hotspot never
//! reaches storage.

use serde::{Deserialize, Serialize};

use crate::region::{GeometryError, NormalizedRegion};

/// Verification state reported for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Implemented,
    Pending,
}

impl EventStatus {
    pub fn from_flag(implemented: bool) -> Self {
        if implemented {
            Self::Implemented
        } else {
            Self::Pending
        }
    }

    /// Short label printed on status chips.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Implemented => "Implemented",
            Self::Pending => "Pending",
        }
    }
}

/// An interaction event placed on a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedEvent {
    pub id: String,

    /// Frame the event belongs to.
    pub frame_id: String,

    /// Hotspot on the frame, if one was drawn.
    #[serde(default)]
    pub region: Option<NormalizedRegion>,

    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    /// Free-text description of where the interaction happens.
    #[serde(default)]
    pub location: Option<String>,

    /// Verification result; `None` when the verifier has not reported.
    #[serde(default)]
    pub implemented: Option<bool>,
}

impl AnnotatedEvent {
    pub fn status(&self) -> Option<EventStatus> {
        self.implemented.map(EventStatus::from_flag)
    }

    /// The event's region if it is drawn on `frame_id`.
    pub fn region_on(&self, frame_id: &str) -> Option<&NormalizedRegion> {
        self.region
            .as_ref()
            .filter(|region| region.frame_id == frame_id && self.frame_id == frame_id)
    }

    /// Check the invariants every stored event must satisfy.
    pub fn validate(&self) -> Result<(), EventError> {
        validate_fields(&self.name, &self.frame_id, self.region.as_ref())
    }
}

/// Events belonging to `frame_id`, in caller order.
pub fn events_for_frame<'a>(
    events: &'a [AnnotatedEvent],
    frame_id: &'a str,
) -> impl Iterator<Item = &'a AnnotatedEvent> + 'a {
    events.iter().filter(move |event| event.frame_id == frame_id)
}

/// Payload for creating an event, usually right after a region capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub frame_id: String,
    #[serde(default)]
    pub region: Option<NormalizedRegion>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewEvent {
    pub fn new(frame_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            region: None,
            name: name.into(),
            category: None,
            action: None,
            label: None,
            location: None,
        }
    }

    pub fn with_region(mut self, region: NormalizedRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn validate(&self) -> Result<(), EventError> {
        validate_fields(&self.name, &self.frame_id, self.region.as_ref())
    }

    /// Materialize the stored event under `id`.
    pub fn into_event(self, id: impl Into<String>) -> Result<AnnotatedEvent, EventError> {
        self.validate()?;
        Ok(AnnotatedEvent {
            id: id.into(),
            frame_id: self.frame_id,
            region: self.region,
            name: self.name.trim().to_string(),
            category: self.category,
            action: self.action,
            label: self.label,
            location: self.location,
            implemented: None,
        })
    }
}

/// Partial update for an existing event. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub name: Option<String>,
    pub region: Option<NormalizedRegion>,
    pub category: Option<String>,
    pub action: Option<String>,
    pub label: Option<String>,
    pub location: Option<String>,
    pub implemented: Option<bool>,
}

impl EventPatch {
    /// Apply the patch, leaving `event` untouched if the result is invalid.
    pub fn apply(&self, event: &mut AnnotatedEvent) -> Result<(), EventError> {
        let mut updated = event.clone();
        if let Some(name) = &self.name {
            updated.name = name.trim().to_string();
        }
        if let Some(region) = &self.region {
            updated.region = Some(region.clone());
        }
        if let Some(category) = &self.category {
            updated.category = Some(category.clone());
        }
        if let Some(action) = &self.action {
            updated.action = Some(action.clone());
        }
        if let Some(label) = &self.label {
            updated.label = Some(label.clone());
        }
        if let Some(location) = &self.location {
            updated.location = Some(location.clone());
        }
        if let Some(implemented) = self.implemented {
            updated.implemented = Some(implemented);
        }
        updated.validate()?;
        *event = updated;
        Ok(())
    }
}

fn validate_fields(
    name: &str,
    frame_id: &str,
    region: Option<&NormalizedRegion>,
) -> Result<(), EventError> {
    if name.trim().is_empty() {
        return Err(EventError::MissingName);
    }
    if let Some(region) = region {
        region.validate()?;
        if region.frame_id != frame_id {
            return Err(EventError::FrameMismatch {
                event_frame: frame_id.to_string(),
                region_frame: region.frame_id.clone(),
            });
        }
    }
    Ok(())
}

/// Errors raised when writing events.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventError {
    #[error("Event name must not be empty")]
    MissingName,

    #[error("Region belongs to frame {region_frame} but event is on frame {event_frame}")]
    FrameMismatch {
        event_frame: String,
        region_frame: String,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
