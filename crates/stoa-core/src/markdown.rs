//! Documentation text rendering.
//!
//! Handler and parameter documentation is written in Markdown and rendered
//! to HTML for the API document. A single-paragraph rendering is unwrapped so
//! short descriptions read as inline text.

use pulldown_cmark::{html, Options, Parser};

/// Renders documentation markup to HTML.
///
/// Implementations must return an empty string for absent input.
pub trait DocRenderer: Send + Sync {
    /// Renders the text.
    fn render(&self, text: Option<&str>) -> String;
}

/// The default renderer, backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl DocRenderer for MarkdownRenderer {
    fn render(&self, text: Option<&str>) -> String {
        text.map(render_markdown).unwrap_or_default()
    }
}

/// Renders Markdown to HTML with tables, strikethrough and task lists enabled.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Removes a single wrapping `<p>…</p>` block.
///
/// Output with more than one paragraph, or any other top-level element, is
/// returned trimmed but otherwise unchanged.
///
/// ```
/// use stoa_core::markdown::strip_paragraph;
///
/// assert_eq!(strip_paragraph("<p>Hello <em>you</em></p>\n"), "Hello <em>you</em>");
/// assert_eq!(strip_paragraph("<p>a</p>\n<p>b</p>\n"), "<p>a</p>\n<p>b</p>");
/// ```
pub fn strip_paragraph(html: &str) -> &str {
    let trimmed = html.trim();
    match trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
    {
        Some(inner) if !inner.contains("<p>") => inner,
        _ => trimmed,
    }
}

/// Renders a description and unwraps a lone paragraph.
pub fn render_description(renderer: &dyn DocRenderer, text: Option<&str>) -> String {
    strip_paragraph(&renderer.render(text)).to_string()
}
