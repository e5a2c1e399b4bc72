//! Error types shared across Tagmap crates.

use std::path::PathBuf;

/// Top-level error type for Tagmap operations.
#[derive(Debug, thiserror::Error)]
pub enum TagmapError {
    #[error("Geometry error: {message}")]
    Geometry { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Resource error: {message}")]
    Resource { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("An export is already being generated")]
    ExportInProgress,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TagmapError.
pub type TagmapResult<T> = Result<T, TagmapError>;

impl TagmapError {
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_human_readable() {
        let err = TagmapError::render("backend refused image");
        assert_eq!(err.to_string(), "Render error: backend refused image");

        let err = TagmapError::ExportInProgress;
        assert!(err.to_string().contains("already"));
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> TagmapResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(TagmapError::Io(_))));
    }
}
