//! GA4 `gtag` code samples printed in documents.

use tagmap_project_model::event::AnnotatedEvent;

/// Placeholder used when no measurement ID is configured.
pub const MEASUREMENT_ID_PLACEHOLDER: &str = "GA_MEASUREMENT_ID";

/// The site-wide `gtag` bootstrap for the document's cover page.
pub fn base_snippet(measurement_id: Option<&str>) -> String {
    let id = measurement_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(MEASUREMENT_ID_PLACEHOLDER);
    format!(
        "<!-- Header (gtag base) -->\n\
         <script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>\n\
         <script>\n\
         \x20 window.dataLayer = window.dataLayer || [];\n\
         \x20 function gtag(){{dataLayer.push(arguments);}}\n\
         \x20 gtag('js', new Date());\n\
         \x20 gtag('config', '{id}');\n\
         \x20 // Example event\n\
         \x20 gtag('event', 'login', {{ method: 'Google' }});\n\
         </script>"
    )
}

/// The `gtag('event', ...)` call for one event.
pub fn event_snippet(event: &AnnotatedEvent) -> String {
    format!(
        "gtag('event', '{}', {{\n  event_category: '{}',\n  event_label: '{}',\n  event_action: '{}',\n  location: '{}'\n}});",
        js_string(&event.name),
        js_string(event.category.as_deref().unwrap_or("")),
        js_string(event.label.as_deref().unwrap_or("")),
        js_string(event.action.as_deref().unwrap_or("")),
        js_string(event.location.as_deref().unwrap_or("")),
    )
}

/// Wrap code to `width` columns, keeping each source line's indentation.
pub fn wrap_code(code: &str, width: usize) -> Vec<String> {
    let options = textwrap::Options::new(width.max(1)).break_words(true);
    code.lines()
        .flat_map(|line| {
            textwrap::wrap(line, &options)
                .into_iter()
                .map(|part| part.into_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn js_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
