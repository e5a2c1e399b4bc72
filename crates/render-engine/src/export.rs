//! Export configuration and job management.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tagmap_common::clock::Clock;
use tagmap_common::config::AppConfig;
use tagmap_common::error::{TagmapError, TagmapResult};
use tagmap_project_model::event::AnnotatedEvent;
use tagmap_project_model::frame::Frame;
use tagmap_resource_loader::loader::{ImageSource, ResourceLoader};
use tagmap_resource_loader::raster::EmbeddableImage;

use crate::compositor::{CompositorSettings, DocumentCompositor};
use crate::pdf::PdfBackend;

/// Caller-supplied export options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Name printed in the page header.
    pub project_name: Option<String>,

    /// GA4 measurement ID for the cover snippet.
    pub measurement_id: Option<String>,

    /// Enables the backend's direct frame export as an image fallback.
    pub project_id: Option<String>,
}

/// Everything one document generation needs. Dropped after the file is
/// written.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Frames in page order.
    pub frames: Vec<Frame>,

    /// All events, in caller order.
    pub events: Vec<AnnotatedEvent>,

    pub options: ExportOptions,

    /// Timestamp printed in the footer.
    pub generated_at: String,

    /// Loaded previews by frame ID; `None` records a failed load.
    pub images: HashMap<String, Option<EmbeddableImage>>,
}

impl ExportJob {
    pub fn new(frames: Vec<Frame>, events: Vec<AnnotatedEvent>, options: ExportOptions) -> Self {
        Self {
            frames,
            events,
            options,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            images: HashMap::new(),
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: usize,
    pub missing_previews: Vec<String>,
    pub truncated_blocks: usize,
}

/// Generates PDF documents, one at a time.
pub struct DocumentExporter {
    images: Arc<dyn ImageSource>,
    settings: CompositorSettings,
    generating: AtomicBool,
}

impl DocumentExporter {
    pub fn new(images: Arc<dyn ImageSource>, settings: CompositorSettings) -> Self {
        Self {
            images,
            settings,
            generating: AtomicBool::new(false),
        }
    }

    /// Exporter backed by the HTTP resource loader.
    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> TagmapResult<Self> {
        let loader = ResourceLoader::from_config(&config.api, clock)?;
        Ok(Self::new(
            Arc::new(loader),
            CompositorSettings::from_config(config),
        ))
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Build the document for `frames` and `events` and write it to
    /// `file_name` (a `.pdf` extension is added when missing).
    ///
    /// The file is only written once the whole document is assembled, and
    /// replaces any previous file atomically. A second call while one is in
    /// flight fails with [`TagmapError::ExportInProgress`].
    pub async fn generate_document(
        &self,
        file_name: impl AsRef<Path>,
        frames: Vec<Frame>,
        events: Vec<AnnotatedEvent>,
        options: ExportOptions,
    ) -> TagmapResult<ExportReport> {
        let _guard = self.begin_generation()?;
        let path = with_pdf_extension(file_name.as_ref());

        tracing::info!(
            output = %path.display(),
            frames = frames.len(),
            events = events.len(),
            "Starting export"
        );

        let mut job = ExportJob::new(frames, events, options);
        let mut backend = PdfBackend::a4();
        let compositor = DocumentCompositor::new(self.images.as_ref(), &self.settings);
        let composed = compositor.compose(&mut job, &mut backend).await?;
        let bytes = backend.finish()?;

        write_atomically(&path, &bytes)?;
        tracing::info!(
            output = %path.display(),
            pages = composed.pages,
            bytes = bytes.len(),
            "Export complete"
        );

        Ok(ExportReport {
            path,
            pages: composed.pages,
            bytes: bytes.len(),
            missing_previews: composed.missing_previews,
            truncated_blocks: composed.truncated_blocks,
        })
    }

    fn begin_generation(&self) -> TagmapResult<GenerationGuard<'_>> {
        self.generating
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| TagmapError::ExportInProgress)?;
        Ok(GenerationGuard {
            flag: &self.generating,
        })
    }
}

/// Clears the generating flag when an export ends, however it ends.
struct GenerationGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

fn with_pdf_extension(path: &Path) -> PathBuf {
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".pdf");
        PathBuf::from(name)
    }
}

/// Write through a temp file in the target directory, then rename.
fn write_atomically(path: &Path, bytes: &[u8]) -> TagmapResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .map_err(|e| TagmapError::export(format!("Failed to save {}: {}", path.display(), e.error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagmap_project_model::event::NewEvent;

    struct NoImages;

    #[async_trait::async_trait]
    impl ImageSource for NoImages {
        async fn load(&self, _url: &str) -> Option<EmbeddableImage> {
            None
        }
    }

    fn exporter() -> DocumentExporter {
        DocumentExporter::new(Arc::new(NoImages), CompositorSettings::default())
    }

    #[test]
    fn test_pdf_extension() {
        assert_eq!(with_pdf_extension(Path::new("out/report")), PathBuf::from("out/report.pdf"));
        assert_eq!(with_pdf_extension(Path::new("a.PDF")), PathBuf::from("a.PDF"));
        assert_eq!(
            with_pdf_extension(Path::new("shop.v2")),
            PathBuf::from("shop.v2.pdf")
        );
    }

    #[tokio::test]
    async fn test_generate_document_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let frames = vec![Frame::new("f1", "Checkout", 1440.0, 900.0)
            .with_image_url("https://cdn.invalid/checkout.png")];
        let events = vec![NewEvent::new("f1", "purchase").into_event("e1").unwrap()];

        let report = exporter()
            .generate_document(
                dir.path().join("nested/tagging"),
                frames,
                events,
                ExportOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(report.path, dir.path().join("nested/tagging.pdf"));
        assert_eq!(report.pages, 2);
        assert_eq!(report.missing_previews, vec!["f1".to_string()]);
        let bytes = std::fs::read(&report.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(bytes.len(), report.bytes);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_export_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter();

        let guard = exporter.begin_generation().unwrap();
        assert!(exporter.is_generating());
        let err = exporter
            .generate_document(dir.path().join("x"), vec![], vec![], ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TagmapError::ExportInProgress));
        assert!(!dir.path().join("x.pdf").exists());

        drop(guard);
        assert!(!exporter.is_generating());
        exporter
            .generate_document(dir.path().join("x"), vec![], vec![], ExportOptions::default())
            .await
            .unwrap();
        assert!(dir.path().join("x.pdf").exists());
    }
}
