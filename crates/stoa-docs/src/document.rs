//! The API document model.
//!
//! These are passive records: a [`Link`] per documented route, grouped into
//! [`Section`]s by includes, and collected into one [`Document`]. All of them
//! serialize with `serde` so the document can be handed to any output format.

use serde::Serialize;
use stoa_core::Validator;

use crate::error::DocsResult;

/// Where a request input is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// A `{name}` segment of the URL template.
    Path,
    /// A query-string value.
    Query,
    /// The decoded request body.
    Body,
}

impl Location {
    /// Returns the lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

/// One documented request input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Input name.
    pub name: String,
    /// Where the input is read from.
    pub location: Location,
    /// Validator describing the accepted values.
    pub schema: Validator,
    /// Whether the input must be supplied.
    pub required: bool,
}

/// The documented successful response of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Content encoding of the response, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Status code, always 200 for generated responses.
    pub status_code: u16,
    /// Schema of the response body.
    pub schema: Validator,
}

/// The full description of one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// URL template, prefixed by every enclosing include once assembled.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Route name.
    pub name: String,
    /// Request body encoding, if the route takes a body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Request inputs in handler parameter order.
    pub fields: Vec<Field>,
    /// Documented response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
    /// Rendered handler documentation.
    pub description: String,
}

impl Link {
    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterates over the fields read from `location`.
    pub fn fields_in(&self, location: Location) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.location == location)
    }

    /// Returns `true` if any field is read from the body.
    pub fn has_body(&self) -> bool {
        self.fields_in(Location::Body).next().is_some()
    }
}

/// An item of a section or document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Content {
    /// A single route.
    Link(Link),
    /// A nested group of routes.
    Section(Section),
}

/// A named group of links and nested sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Section name.
    pub name: String,
    /// Links and nested sections in declaration order.
    pub content: Vec<Content>,
}

impl Section {
    /// Creates a section.
    pub fn new(name: impl Into<String>, content: Vec<Content>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Returns every link in this section and its subsections, depth first.
    pub fn links(&self) -> Vec<&Link> {
        let mut out = Vec::new();
        collect_links(&self.content, &mut out);
        out
    }

    /// Applies `f` to every link in this section and its subsections.
    pub fn for_each_link_mut(&mut self, f: &mut impl FnMut(&mut Link)) {
        for item in &mut self.content {
            match item {
                Content::Link(link) => f(link),
                Content::Section(section) => section.for_each_link_mut(f),
            }
        }
    }
}

fn collect_links<'a>(content: &'a [Content], out: &mut Vec<&'a Link>) {
    for item in content {
        match item {
            Content::Link(link) => out.push(link),
            Content::Section(section) => collect_links(&section.content, out),
        }
    }
}

/// The documented surface of a whole application.
///
/// # Example
///
/// ```
/// use stoa_docs::Document;
///
/// let doc = Document::new(Vec::new()).with_title("Pets").with_version("1.0");
/// let json = doc.to_json().unwrap();
/// assert!(json.contains("\"title\": \"Pets\""));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Document title.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// API version.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Rendered description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Base URL the API is served from.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Top-level links and sections.
    pub content: Vec<Content>,
}

impl Document {
    /// Creates an untitled document.
    pub fn new(content: Vec<Content>) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns every link in the document, depth first.
    pub fn links(&self) -> Vec<&Link> {
        let mut out = Vec::new();
        collect_links(&self.content, &mut out);
        out
    }

    /// Looks up a link by name.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links().into_iter().find(|link| link.name == name)
    }

    /// Serializes the document to pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serializes the document to a JSON value.
    pub fn to_value(&self) -> DocsResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, url: &str) -> Link {
        Link {
            url: url.to_string(),
            method: "GET".to_string(),
            name: name.to_string(),
            encoding: None,
            fields: vec![Field {
                name: "id".to_string(),
                location: Location::Path,
                schema: Validator::integer(),
                required: true,
            }],
            response: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_links_walk_nested_sections() {
        let inner = Section::new("inner", vec![Content::Link(link("b", "/b"))]);
        let doc = Document::new(vec![
            Content::Link(link("a", "/a")),
            Content::Section(inner),
            Content::Link(link("c", "/c")),
        ]);
        let names: Vec<_> = doc.links().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(doc.link("b").unwrap().url, "/b");
    }

    #[test]
    fn test_for_each_link_mut() {
        let mut section = Section::new(
            "s",
            vec![
                Content::Link(link("a", "/a")),
                Content::Section(Section::new("t", vec![Content::Link(link("b", "/b"))])),
            ],
        );
        section.for_each_link_mut(&mut |l: &mut Link| l.url.insert_str(0, "/api"));
        let urls: Vec<_> = section.links().iter().map(|l| l.url.clone()).collect();
        assert_eq!(urls, vec!["/api/a", "/api/b"]);
    }

    #[test]
    fn test_field_lookup() {
        let l = link("a", "/a/{id}");
        assert_eq!(l.field("id").unwrap().location, Location::Path);
        assert!(l.field("missing").is_none());
        assert!(!l.has_body());
        assert_eq!(l.fields_in(Location::Path).count(), 1);
    }

    #[test]
    fn test_serialization_shape() {
        let doc = Document::new(vec![Content::Section(Section::new(
            "users",
            vec![Content::Link(link("get_user", "/users/{id}"))],
        ))]);
        let value = doc.to_value().unwrap();
        let section = &value["content"][0];
        assert_eq!(section["kind"], "section");
        assert_eq!(section["content"][0]["kind"], "link");
        assert_eq!(section["content"][0]["fields"][0]["location"], "path");
        assert!(value.get("title").is_none());
    }
}
