//! Components that read and validate request parameters.

use http::Method;
use serde_json::Value as Json;
use stoa_core::{
    Annotation, Args, Error, Function, Parameter, PathParams, QueryParams, Result,
    ValidationErrors, Value,
};
use stoa_inject::Component;
use tracing::trace;

use crate::request::Request;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

fn descriptor(args: &Args) -> Result<&Parameter> {
    args.parameter("parameter")?
        .ok_or_else(|| Error::MissingArgument {
            name: "parameter".to_string(),
        })
}

/// Resolves untyped, scalar and `QueryParam` parameters.
///
/// The value is read from the path parameters, falling back to the query
/// string. Scalars are coerced to their type; untyped and `QueryParam`
/// parameters are strings. A parameter without a default is required, and a
/// default of null makes it nullable.
#[derive(Debug, Clone)]
pub struct PrimitiveParamComponent {
    resolver: Function,
}

impl PrimitiveParamComponent {
    /// Creates the component.
    pub fn new() -> Self {
        Self {
            resolver: Function::builder("primitive_param")
                .param("path_params", Annotation::of::<PathParams>())
                .param("query_params", Annotation::of::<QueryParams>())
                .param("parameter", Annotation::ParameterDescriptor)
                .sync(resolve_primitive),
        }
    }
}

impl Default for PrimitiveParamComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for PrimitiveParamComponent {
    fn can_handle(&self, parameter: &Parameter) -> bool {
        matches!(
            parameter.annotation(),
            Annotation::Untyped | Annotation::Scalar(_) | Annotation::QueryParam
        )
    }

    fn resolver(&self) -> &Function {
        &self.resolver
    }
}

fn resolve_primitive(args: Args) -> Result<Value> {
    let parameter = descriptor(&args)?;
    let path = args.get_as::<PathParams>("path_params")?;
    let query = args.get_as::<QueryParams>("query_params")?;

    let name = parameter.name();
    let raw = path.get_json(name).or_else(|| query.get_json(name));
    trace!(parameter = name, present = raw.is_some(), "validating primitive parameter");

    let value = parameter.scalar_validator().validate_field(name, raw.as_ref())?;
    Ok(Value::json(value))
}

/// Resolves structured-type parameters.
///
/// `GET` and `DELETE` requests validate the query parameters against the
/// type's properties. Other methods decode the body (JSON, or form data when
/// the content type says so) and validate it against the whole type. An
/// empty body is treated as null.
#[derive(Debug, Clone)]
pub struct StructuredParamComponent {
    resolver: Function,
}

impl StructuredParamComponent {
    /// Creates the component.
    pub fn new() -> Self {
        Self {
            resolver: Function::builder("structured_param")
                .param("request", Annotation::of::<Request>())
                .param("query_params", Annotation::of::<QueryParams>())
                .param("parameter", Annotation::ParameterDescriptor)
                .sync(resolve_structured),
        }
    }
}

impl Default for StructuredParamComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StructuredParamComponent {
    fn can_handle(&self, parameter: &Parameter) -> bool {
        matches!(parameter.annotation(), Annotation::Structured(_))
    }

    fn resolver(&self) -> &Function {
        &self.resolver
    }
}

fn resolve_structured(args: Args) -> Result<Value> {
    let parameter = descriptor(&args)?;
    let Annotation::Structured(schema) = parameter.annotation() else {
        return Err(Error::Downcast {
            name: parameter.name().to_string(),
            expected: "structured type",
        });
    };
    let request = args.get_as::<Request>("request")?;
    let name = parameter.name();

    let raw = if request.method() == Method::GET || request.method() == Method::DELETE {
        args.get_as::<QueryParams>("query_params")?.to_json_object()
    } else {
        decode_body(request, name)?
    };

    let value = schema.validate(&raw).map_err(|errors| errors.with_root(name))?;
    Ok(Value::json(value))
}

fn decode_body(request: &Request, name: &str) -> std::result::Result<Json, ValidationErrors> {
    if request.is_body_empty() {
        return Ok(Json::Null);
    }

    let is_form = request
        .content_type()
        .is_some_and(|ct| ct.starts_with(FORM_URLENCODED));

    if is_form {
        let text = std::str::from_utf8(request.body())
            .map_err(|_| ValidationErrors::single(name, "Invalid UTF-8 in form body."))?;
        return Ok(QueryParams::parse(text).to_json_object());
    }

    serde_json::from_slice(request.body())
        .map_err(|e| ValidationErrors::single(name, format!("Invalid JSON: {e}")))
}
