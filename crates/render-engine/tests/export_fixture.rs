use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat as CodecFormat, RgbImage};
use tagmap_project_model::LoadedBundle;
use tagmap_render_engine::{
    CompositorSettings, DocumentCompositor, DocumentExporter, ExportJob, ExportOptions,
    RecordingBackend,
};
use tagmap_resource_loader::loader::ImageSource;
use tagmap_resource_loader::raster::EmbeddableImage;

fn load_fixture_bundle() -> LoadedBundle {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-bundle")
        .join("storefront.json");

    LoadedBundle::load(path).expect("fixture bundle should load")
}

/// Serves a small PNG for the checkout frame and nothing else.
struct CheckoutOnly {
    png: Vec<u8>,
}

impl CheckoutOnly {
    fn new() -> Self {
        let img = RgbImage::from_pixel(144, 90, image::Rgb([30, 144, 255]));
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), CodecFormat::Png)
            .unwrap();
        Self { png }
    }
}

#[async_trait::async_trait]
impl ImageSource for CheckoutOnly {
    async fn load(&self, url: &str) -> Option<EmbeddableImage> {
        if url.contains("checkout") {
            EmbeddableImage::from_encoded(&self.png).ok()
        } else {
            None
        }
    }
}

fn options(bundle: &LoadedBundle) -> ExportOptions {
    ExportOptions {
        project_name: Some(bundle.bundle.project.name.clone()),
        measurement_id: bundle.bundle.project.measurement_id.clone(),
        project_id: None,
    }
}

#[test]
fn fixture_bundle_is_valid() {
    let loaded = load_fixture_bundle();
    let issues = loaded.bundle.validate();
    assert_eq!(loaded.bundle.frames.len(), 3);
    assert_eq!(loaded.bundle.events.len(), 3);
    // The confirmation frame is deliberately unsized and has no image.
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|issue| issue.contains("1:4")));
}

#[tokio::test]
async fn fixture_composes_every_section() {
    let loaded = load_fixture_bundle();
    let images = CheckoutOnly::new();
    let settings = CompositorSettings::default();
    let compositor = DocumentCompositor::new(&images, &settings);

    let mut job = ExportJob::new(
        loaded.bundle.frames.clone(),
        loaded.bundle.events.clone(),
        options(&loaded),
    );
    let mut backend = RecordingBackend::new(595.28, 841.89);
    let report = compositor.compose(&mut job, &mut backend).await.unwrap();

    assert_eq!(report.frames, 3);
    assert_eq!(report.events, 3);
    assert!(report.pages >= 4);
    assert_eq!(report.missing_previews, vec!["1:3".to_string(), "1:4".to_string()]);

    for text in [
        "Screen: Checkout",
        "Screen: Home",
        "Screen: Order Confirmation",
        "Preview not available",
        "No associated events.",
        "Implemented",
        "Pending",
    ] {
        assert!(backend.contains_text(text), "missing text: {text}");
    }
    let total = report.pages;
    assert!(backend.texts_on(0).contains(&"Tagmap: Storefront"));
    let last_footer = format!("Page {total} of {total}");
    assert!(backend
        .texts_on(total - 1)
        .iter()
        .any(|text| *text == last_footer));
}

#[tokio::test]
async fn fixture_exports_readable_pdf() {
    let loaded = load_fixture_bundle();
    let dir = tempfile::tempdir().unwrap();
    let exporter = DocumentExporter::new(Arc::new(CheckoutOnly::new()), CompositorSettings::default());

    let report = exporter
        .generate_document(
            dir.path().join("storefront"),
            loaded.bundle.frames.clone(),
            loaded.bundle.events.clone(),
            options(&loaded),
        )
        .await
        .unwrap();

    assert_eq!(report.path, dir.path().join("storefront.pdf"));
    let bytes = std::fs::read(&report.path).unwrap();
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), report.pages);
    assert_eq!(report.missing_previews.len(), 2);
}
