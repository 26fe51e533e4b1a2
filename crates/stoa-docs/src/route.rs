//! Route descriptions.
//!
//! A [`Route`] pairs a URL template and method with a handler and builds the
//! handler's [`Link`] once, at construction. An [`Include`] groups routes
//! under a URL prefix and becomes a [`Section`] of the document.

use std::sync::OnceLock;

use http::Method;
use regex::Regex;
use stoa_core::markdown::render_description;
use stoa_core::{
    Annotation, ConfigurationError, DocRenderer, Function, MarkdownRenderer, Parameter, Validator,
};
use tracing::debug;

use crate::document::{Content, Document, Field, Link, Location, Response, Section};
use crate::error::DocsResult;

const JSON_ENCODING: &str = "application/json";

/// How a handler parameter is supplied.
///
/// Every parameter is classified once, when its route is built. The order of
/// the checks in [`ParameterKind::classify`] is the precedence order: a name
/// that appears in the URL template always makes a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// A `{name}` segment of the URL template.
    PathScalar,
    /// An untyped, scalar or `QueryParam` parameter read from the query.
    QueryScalar,
    /// A validator annotation read from the query.
    ValidatorInstance,
    /// A structured type, read from the body or, for `GET` and `DELETE`,
    /// from the query.
    StructuredBody,
    /// The return value of the handler batch.
    ReturnValueRef,
    /// A value produced by initial state or a component; not documented.
    ComponentManaged,
}

impl ParameterKind {
    /// Classifies a parameter of `function` against the path names of its URL.
    pub fn classify(
        function: &Function,
        parameter: &Parameter,
        path_names: &[String],
    ) -> Result<Self, ConfigurationError> {
        let annotation = parameter.annotation();
        if path_names.iter().any(|name| name == parameter.name()) {
            return match annotation {
                Annotation::Untyped
                | Annotation::Scalar(_)
                | Annotation::QueryParam
                | Annotation::Validator(_) => Ok(Self::PathScalar),
                other => Err(ConfigurationError::InvalidPathParameter {
                    parameter: parameter.name().to_string(),
                    function: function.name().to_string(),
                    annotation: other.to_string(),
                }),
            };
        }

        match annotation {
            Annotation::Untyped | Annotation::Scalar(_) | Annotation::QueryParam => {
                Ok(Self::QueryScalar)
            }
            Annotation::Validator(_) => Ok(Self::ValidatorInstance),
            Annotation::Structured(_) => Ok(Self::StructuredBody),
            Annotation::ReturnValue => Ok(Self::ReturnValueRef),
            Annotation::Type(_) | Annotation::ParameterDescriptor => Ok(Self::ComponentManaged),
            Annotation::ListOf(_) => Err(ConfigurationError::UnsupportedAnnotation {
                parameter: parameter.name().to_string(),
                function: function.name().to_string(),
                annotation: annotation.to_string(),
            }),
        }
    }
}

/// Extracts the parameter names of a URL template.
///
/// A leading `+` (the "rest of the path" marker) is stripped.
///
/// ```
/// use stoa_docs::path_names;
///
/// assert_eq!(path_names("/users/{id}/files/{+path}"), vec!["id", "path"]);
/// ```
pub fn path_names(url: &str) -> Vec<String> {
    static PATH_PARAM: OnceLock<Regex> = OnceLock::new();
    let regex = PATH_PARAM.get_or_init(|| Regex::new(r"\{([^}]*)\}").expect("valid regex"));
    regex
        .captures_iter(url)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_start_matches('+').to_string())
        .collect()
}

/// A routed handler together with its documentation.
///
/// # Example
///
/// ```
/// use http::Method;
/// use stoa_core::{Function, Scalar, Validator, Value};
/// use stoa_docs::{Location, Route};
///
/// let handler = Function::builder("get_user")
///     .param("id", Scalar::Int)
///     .param("verbose", Validator::boolean().allow_null(true))
///     .doc("Fetch one *user*.")
///     .sync(|_| Ok(Value::none()));
///
/// let route = Route::builder("/users/{id}", Method::GET, handler).build().unwrap();
/// let link = route.link();
/// assert_eq!(link.name, "get_user");
/// assert_eq!(link.description, "Fetch one <em>user</em>.");
/// assert_eq!(link.field("id").unwrap().location, Location::Path);
/// assert!(!link.field("verbose").unwrap().required);
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    url: String,
    method: Method,
    handler: Function,
    documented: bool,
    link: Link,
}

impl Route {
    /// Starts building a route.
    pub fn builder(url: impl Into<String>, method: Method, handler: Function) -> RouteBuilder {
        RouteBuilder {
            url: url.into(),
            method,
            handler,
            name: None,
            encoding: None,
            documented: true,
        }
    }

    /// Builds a documented route named after its handler.
    pub fn new(url: impl Into<String>, method: Method, handler: Function) -> DocsResult<Self> {
        Self::builder(url, method, handler).build()
    }

    /// Returns the URL template.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the handler.
    pub fn handler(&self) -> &Function {
        &self.handler
    }

    /// Returns the route name.
    pub fn name(&self) -> &str {
        &self.link.name
    }

    /// Returns `true` if the route appears in the document.
    pub fn is_documented(&self) -> bool {
        self.documented
    }

    /// Returns the effective request encoding.
    pub fn encoding(&self) -> Option<&str> {
        self.link.encoding.as_deref()
    }

    /// Returns the route's link.
    pub fn link(&self) -> &Link {
        &self.link
    }
}

/// Builder for [`Route`].
#[derive(Debug)]
pub struct RouteBuilder {
    url: String,
    method: Method,
    handler: Function,
    name: Option<String>,
    encoding: Option<String>,
    documented: bool,
}

impl RouteBuilder {
    /// Sets the route name. Defaults to the handler name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets an explicit request encoding.
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Sets whether the route appears in the document.
    pub fn documented(mut self, documented: bool) -> Self {
        self.documented = documented;
        self
    }

    /// Builds the route, rendering documentation as Markdown.
    pub fn build(self) -> DocsResult<Route> {
        self.build_with(&MarkdownRenderer)
    }

    /// Builds the route with a custom documentation renderer.
    pub fn build_with(self, renderer: &dyn DocRenderer) -> DocsResult<Route> {
        let name = self
            .name
            .unwrap_or_else(|| self.handler.name().to_string());
        let link = LinkBuilder {
            url: &self.url,
            method: &self.method,
            handler: &self.handler,
            renderer,
        }
        .build(name, self.encoding)?;
        debug!(
            route = %link.name,
            method = %self.method,
            url = %self.url,
            fields = link.fields.len(),
            "described route"
        );

        Ok(Route {
            url: self.url,
            method: self.method,
            handler: self.handler,
            documented: self.documented,
            link,
        })
    }
}

struct LinkBuilder<'a> {
    url: &'a str,
    method: &'a Method,
    handler: &'a Function,
    renderer: &'a dyn DocRenderer,
}

impl LinkBuilder<'_> {
    fn build(&self, name: String, encoding: Option<String>) -> Result<Link, ConfigurationError> {
        let fields = self.fields()?;
        let encoding = encoding.or_else(|| {
            fields
                .iter()
                .any(|f| f.location == Location::Body)
                .then(|| JSON_ENCODING.to_string())
        });
        let response = self.response(encoding.clone());

        Ok(Link {
            url: self.url.to_string(),
            method: self.method.as_str().to_string(),
            name,
            encoding,
            fields,
            response,
            description: render_description(self.renderer, self.handler.doc()),
        })
    }

    fn fields(&self) -> Result<Vec<Field>, ConfigurationError> {
        let path_names = path_names(self.url);
        let reads_query = self.method == Method::GET || self.method == Method::DELETE;
        let mut fields = Vec::new();

        for parameter in self.handler.parameters() {
            let name = parameter.name().to_string();
            match ParameterKind::classify(self.handler, parameter, &path_names)? {
                ParameterKind::PathScalar => {
                    let schema = match parameter.annotation() {
                        Annotation::Validator(validator) => self.describe(validator.clone()),
                        _ => self.describe(path_validator(parameter)),
                    };
                    fields.push(Field {
                        name,
                        location: Location::Path,
                        schema,
                        required: true,
                    });
                }
                ParameterKind::QueryScalar => {
                    let schema = self.describe(parameter.scalar_validator());
                    fields.push(Field {
                        name,
                        location: Location::Query,
                        required: schema.is_required(),
                        schema,
                    });
                }
                ParameterKind::ValidatorInstance => {
                    let Annotation::Validator(validator) = parameter.annotation() else {
                        continue;
                    };
                    let schema = self.describe(validator.clone());
                    fields.push(Field {
                        name,
                        location: Location::Query,
                        required: !schema.allows_null(),
                        schema,
                    });
                }
                ParameterKind::StructuredBody => {
                    let Annotation::Structured(schema) = parameter.annotation() else {
                        continue;
                    };
                    if reads_query {
                        for (property, validator) in schema.properties() {
                            fields.push(Field {
                                name: property.to_string(),
                                location: Location::Query,
                                schema: self.describe(validator.clone()),
                                required: schema.is_required(property),
                            });
                        }
                    } else {
                        let body = schema
                            .validator()
                            .clone()
                            .map_properties(|validator| self.describe(validator));
                        fields.push(Field {
                            name,
                            location: Location::Body,
                            required: !body.allows_null(),
                            schema: body,
                        });
                    }
                }
                ParameterKind::ReturnValueRef | ParameterKind::ComponentManaged => {}
            }
        }
        Ok(fields)
    }

    fn response(&self, encoding: Option<String>) -> Option<Response> {
        let schema = match self.handler.returns() {
            Annotation::Structured(schema) => schema.validator().clone(),
            Annotation::ListOf(schema) => Validator::array(schema.validator().clone()),
            Annotation::Validator(validator) => validator.clone(),
            _ => return None,
        };
        Some(Response {
            encoding,
            status_code: 200,
            schema,
        })
    }

    /// Renders the validator's description, or names its kind if it has none.
    fn describe(&self, validator: Validator) -> Validator {
        let text = validator
            .description()
            .map_or_else(|| format!("`{}`", validator.kind_name()), str::to_string);
        let rendered = render_description(self.renderer, Some(&text));
        validator.with_description(rendered)
    }
}

/// Path segments are always present, so a path parameter never permits null.
fn path_validator(parameter: &Parameter) -> Validator {
    let validator = match parameter.annotation() {
        Annotation::Scalar(scalar) => scalar.validator(),
        _ => Validator::string(),
    };
    let validator = match parameter.default() {
        Some(default) => validator.with_default(default.clone()),
        None => validator,
    };
    validator.allow_null(false)
}

/// An item of a route table: a route or a nested include.
#[derive(Debug, Clone)]
pub enum RouteItem {
    /// A single route.
    Route(Route),
    /// A group of routes under a URL prefix.
    Include(Include),
}

impl From<Route> for RouteItem {
    fn from(route: Route) -> Self {
        Self::Route(route)
    }
}

impl From<Include> for RouteItem {
    fn from(include: Include) -> Self {
        Self::Include(include)
    }
}

/// A group of routes mounted under a URL prefix.
///
/// Links inside the section keep their local URLs; the prefix is applied
/// when the document is assembled.
#[derive(Debug, Clone)]
pub struct Include {
    url: String,
    name: String,
    items: Vec<RouteItem>,
    documented: bool,
    section: Section,
}

impl Include {
    /// Creates a documented include.
    pub fn new(url: impl Into<String>, name: impl Into<String>, items: Vec<RouteItem>) -> Self {
        let name = name.into();
        let section = build_section(&name, &items);
        Self {
            url: url.into(),
            name,
            items,
            documented: true,
            section,
        }
    }

    /// Sets whether the include appears in the document.
    pub fn documented(mut self, documented: bool) -> Self {
        self.documented = documented;
        self
    }

    /// Returns the URL prefix.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the grouped items.
    pub fn items(&self) -> &[RouteItem] {
        &self.items
    }

    /// Returns `true` if the include appears in the document.
    pub fn is_documented(&self) -> bool {
        self.documented
    }

    /// Returns the section with local, unprefixed link URLs.
    pub fn section(&self) -> &Section {
        &self.section
    }

    /// Returns the section with every link URL prefixed, including the
    /// prefixes of nested includes.
    pub fn prefixed_section(&self) -> Section {
        let content = self
            .items
            .iter()
            .filter_map(|item| match item {
                RouteItem::Route(route) if route.is_documented() => {
                    Some(Content::Link(route.link().clone()))
                }
                RouteItem::Include(include) if include.is_documented() => {
                    Some(Content::Section(include.prefixed_section()))
                }
                _ => None,
            })
            .collect();
        let mut section = Section::new(self.name.clone(), content);
        section.for_each_link_mut(&mut |link: &mut Link| link.url.insert_str(0, &self.url));
        section
    }
}

/// Collects the documented routes and includes of `items` into a section.
pub fn build_section(name: &str, items: &[RouteItem]) -> Section {
    let content = items
        .iter()
        .filter_map(|item| match item {
            RouteItem::Route(route) if route.is_documented() => {
                Some(Content::Link(route.link().clone()))
            }
            RouteItem::Include(include) if include.is_documented() => {
                Some(Content::Section(include.section().clone()))
            }
            _ => None,
        })
        .collect();
    Section::new(name, content)
}

/// Assembles the document of a whole route table.
///
/// Top-level routes become links and includes become sections whose link
/// URLs carry the include prefixes.
pub fn build_document(items: &[RouteItem]) -> Document {
    let content = items
        .iter()
        .filter_map(|item| match item {
            RouteItem::Route(route) if route.is_documented() => {
                Some(Content::Link(route.link().clone()))
            }
            RouteItem::Include(include) if include.is_documented() => {
                Some(Content::Section(include.prefixed_section()))
            }
            _ => None,
        })
        .collect();
    Document::new(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoa_core::{Scalar, TypeSchema, Value};

    fn noop(name: &str) -> stoa_core::FunctionBuilder {
        Function::builder(name)
    }

    #[test]
    fn test_path_names() {
        assert_eq!(path_names("/{p}"), vec!["p"]);
        assert_eq!(path_names("/a/{x}/b/{+rest}"), vec!["x", "rest"]);
        assert!(path_names("/static").is_empty());
    }

    #[test]
    fn test_classify_precedence() {
        let f = noop("f").sync(|_| Ok(Value::none()));
        let path = vec!["id".to_string()];

        let kind = |p: Parameter| ParameterKind::classify(&f, &p, &path).unwrap();
        assert_eq!(kind(Parameter::new("id", Validator::integer())), ParameterKind::PathScalar);
        assert_eq!(kind(Parameter::new("id", Scalar::Int)), ParameterKind::PathScalar);
        assert_eq!(kind(Parameter::new("q", Annotation::QueryParam)), ParameterKind::QueryScalar);
        assert_eq!(
            kind(Parameter::new("q", Validator::string())),
            ParameterKind::ValidatorInstance
        );
        assert_eq!(kind(Parameter::new("r", Annotation::ReturnValue)), ParameterKind::ReturnValueRef);
        assert_eq!(
            kind(Parameter::new("m", Annotation::of::<Method>())),
            ParameterKind::ComponentManaged
        );
    }

    #[test]
    fn test_structured_path_parameter_is_rejected() {
        let schema = TypeSchema::new("T", [("a", Validator::string())]);
        let f = noop("f").param("id", schema).sync(|_| Ok(Value::none()));
        let err = Route::new("/{id}", Method::GET, f).unwrap_err();
        assert!(matches!(
            err.as_configuration(),
            Some(ConfigurationError::InvalidPathParameter { parameter, .. }) if parameter == "id"
        ));
    }

    #[test]
    fn test_list_parameter_is_rejected() {
        let schema = TypeSchema::new("T", [("a", Validator::string())]);
        let f = noop("f")
            .param("items", Annotation::list_of(schema))
            .sync(|_| Ok(Value::none()));
        let err = Route::new("/", Method::POST, f).unwrap_err();
        assert!(matches!(
            err.as_configuration(),
            Some(ConfigurationError::UnsupportedAnnotation { .. })
        ));
    }

    #[test]
    fn test_path_scalar_forbids_null() {
        let f = noop("f")
            .param_with_default("id", Scalar::Int, serde_json::Value::Null)
            .sync(|_| Ok(Value::none()));
        let route = Route::new("/{id}", Method::GET, f).unwrap();
        let field = route.link().field("id").unwrap();
        assert!(field.required);
        assert!(!field.schema.allows_null());
        assert_eq!(field.schema.kind_name(), "Integer");
        assert_eq!(field.schema.description(), Some("<code>Integer</code>"));
    }

    #[test]
    fn test_explicit_description_is_rendered_without_mutating_handler() {
        let validator = Validator::integer().with_description("The *page*.");
        let f = noop("f").param("page", validator).sync(|_| Ok(Value::none()));
        let route = Route::new("/", Method::GET, f).unwrap();

        let field = route.link().field("page").unwrap();
        assert_eq!(field.schema.description(), Some("The <em>page</em>."));
        let Annotation::Validator(original) = route.handler().parameters()[0].annotation() else {
            panic!("expected a validator");
        };
        assert_eq!(original.description(), Some("The *page*."));
    }

    #[test]
    fn test_response_shapes() {
        let schema = TypeSchema::new("User", [("name", Validator::string())]);

        let one = noop("one").returns(schema.clone()).sync(|_| Ok(Value::none()));
        let many = noop("many")
            .returns(Annotation::list_of(schema))
            .sync(|_| Ok(Value::none()));
        let plain = noop("plain").sync(|_| Ok(Value::none()));

        let one = Route::new("/one", Method::GET, one).unwrap();
        let response = one.link().response.as_ref().unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.schema.kind_name(), "Object");

        let many = Route::new("/many", Method::GET, many).unwrap();
        assert_eq!(many.link().response.as_ref().unwrap().schema.kind_name(), "Array");

        let plain = Route::new("/plain", Method::GET, plain).unwrap();
        assert!(plain.link().response.is_none());
    }

    #[test]
    fn test_missing_doc_is_empty_description() {
        let f = noop("f").sync(|_| Ok(Value::none()));
        let route = Route::new("/", Method::GET, f).unwrap();
        assert_eq!(route.link().description, "");
        assert_eq!(route.encoding(), None);
    }
}
