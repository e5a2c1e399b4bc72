//! Backend image endpoints used as fetch candidates.

use reqwest::Url;
use tagmap_common::config::ApiConfig;
use tracing::warn;

const IMAGE_PROXY_PATH: &str = "/integrations/figma/image-proxy";
const FRAME_IMAGE_PATH: &str = "/integrations/figma/frame-image";

/// `url` routed through the backend image proxy.
pub fn image_proxy_url(api: &ApiConfig, url: &str) -> Option<String> {
    build(api, IMAGE_PROXY_PATH, &[("url", url)])
}

/// The backend's direct PNG export of one design node, at 2x.
pub fn frame_export_url(api: &ApiConfig, project_id: &str, node_id: &str) -> Option<String> {
    build(
        api,
        FRAME_IMAGE_PATH,
        &[
            ("projectId", project_id),
            ("nodeId", node_id),
            ("scale", "2"),
            ("format", "png"),
        ],
    )
}

/// Candidate URLs for a frame image, in the order they should be tried.
pub fn frame_image_candidates(
    api: &ApiConfig,
    image_url: Option<&str>,
    project_id: Option<&str>,
    node_id: &str,
) -> Vec<String> {
    let mut candidates = vec![];
    if let Some(url) = image_url.filter(|url| !url.is_empty()) {
        if api.proxy_images && !api.is_own_backend(url) {
            candidates.extend(image_proxy_url(api, url));
        } else {
            candidates.push(url.to_string());
        }
    }
    if let Some(project_id) = project_id {
        candidates.extend(frame_export_url(api, project_id, node_id));
    }
    candidates
}

fn build(api: &ApiConfig, path: &str, params: &[(&str, &str)]) -> Option<String> {
    match Url::parse_with_params(&api.endpoint(path), params) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!(base_url = %api.base_url, error = %e, "Invalid backend URL");
            None
        }
    }
}
