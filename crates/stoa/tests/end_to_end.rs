//! Full request cycles through `App` and `AsyncApp`.

use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::{json, Value as Json};
use stoa::prelude::*;

fn sometype() -> TypeSchema {
    TypeSchema::new(
        "Sometype",
        [
            ("a", Validator::string()),
            ("b", Validator::integer().allow_null(true)),
            ("f", Validator::number()),
            ("c", Validator::boolean()),
        ],
    )
}

fn get_do_nothing() -> Function {
    Function::builder("get_do_nothing")
        .param("p", Validator::integer())
        .param("a", Annotation::Untyped)
        .param("s", Scalar::Str)
        .param("f", Scalar::Float)
        .param("n", Validator::number())
        .param("b", Validator::boolean())
        .param("d", Validator::string().allow_null(true))
        .doc("Do nothing, loudly.")
        .sync(|args| {
            let n = args.json("n")?.clone();
            let d = args.json("d")?.clone();
            Ok(Value::json(json!({ "n": n, "d": d })))
        })
}

fn post_do_nothing() -> Function {
    Function::builder("post_do_nothing")
        .param("p", Scalar::Int)
        .param("a", Annotation::Untyped)
        .param("b", Validator::boolean())
        .param("i", Validator::integer())
        .param("d", Validator::string().allow_null(true))
        .param("data", sometype())
        .sync(|args| Ok(Value::json(args.json("data")?.clone())))
}

fn routes() -> Vec<RouteItem> {
    vec![
        Route::new("/{p}", Method::GET, get_do_nothing()).unwrap().into(),
        Route::new("/{p}", Method::POST, post_do_nothing()).unwrap().into(),
    ]
}

fn body() -> Json {
    json!({"a": "a", "b": 1, "f": 2.0, "c": true})
}

fn get(uri: &str) -> Request {
    Request::new(Method::GET, uri.parse().unwrap())
}

fn post(uri: &str, body: &Json) -> Request {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Request::new(Method::POST, uri.parse().unwrap())
        .with_headers(headers)
        .with_body(body.to_string())
}

#[test]
fn get_resolves_path_and_query_values() {
    let app = App::builder().routes(routes()).build().unwrap();
    let response = app.handle(get("/1?a=2&b=true&s=s&i=4&f=1.0&n=2.0"));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json_body(), Some(json!({"n": 2.0, "d": null})));
}

#[test]
fn get_without_required_query_value_is_rejected() {
    let app = App::builder().routes(routes()).build().unwrap();
    let response = app.handle(get("/1?a=2&b=true&s=s&i=4&f=1.0"));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = response.json_body().unwrap();
    assert!(errors.get("n").is_some());
}

#[test]
fn post_without_required_query_value_is_rejected() {
    let app = App::builder().routes(routes()).build().unwrap();
    let response = app.handle(post("/1?a=2&b=true&s=s&f=1.0&n=2.0", &body()));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let errors = response.json_body().unwrap();
    assert!(errors.get("i").is_some());
}

#[test]
fn post_returns_the_validated_body() {
    let app = App::builder().routes(routes()).build().unwrap();
    let response = app.handle(post("/1?a=2&b=true&s=s&f=1.0&n=2.0&i=4", &body()));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json_body(), Some(body()));
}

#[test]
fn malformed_body_names_the_parameter() {
    let app = App::builder().routes(routes()).build().unwrap();
    let request = Request::new(Method::POST, "/1?a=2&b=true&i=4".parse().unwrap())
        .with_body("{not json");
    let response = app.handle(request);

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.json_body().unwrap().get("data").is_some());
}

#[test]
fn unknown_path_is_not_found() {
    let app = App::builder().routes(routes()).build().unwrap();
    assert_eq!(app.handle(get("/1/2")).status(), StatusCode::NOT_FOUND);
}

#[test]
fn document_describes_both_routes() {
    let mut config = StoaConfig::default();
    config.docs.title = "Nothing API".to_string();
    config.docs.description = "Does *nothing*.".to_string();
    let app = App::builder().config(config).routes(routes()).build().unwrap();

    let doc = app.document();
    assert_eq!(doc.title, "Nothing API");
    assert!(doc.description.contains("<em>nothing</em>"));
    assert_eq!(doc.links().len(), 2);
    assert_eq!(
        doc.link("post_do_nothing").unwrap().encoding.as_deref(),
        Some("application/json")
    );

    let served = app.handle(get("/docs/")).json_body().unwrap();
    assert_eq!(served["title"], "Nothing API");
    assert_eq!(served["content"].as_array().unwrap().len(), 2);
}

#[test]
fn plans_are_cached_after_warmup() {
    let app = App::builder().routes(routes()).build().unwrap();
    let warmed = app.injector().cache().len();
    assert!(warmed >= 2);

    app.handle(get("/1?a=2&b=true&s=s&f=1.0&n=2.0"));
    app.handle(get("/1?a=2&b=true&s=s&f=1.0&n=3.0"));
    assert_eq!(app.injector().cache().len(), warmed);
}

#[tokio::test]
async fn async_app_runs_async_handlers() {
    let lookup = Function::builder("lookup")
        .param("id", Scalar::Int)
        .async_fn(|args| async move {
            let id = args.json("id")?.clone();
            tokio::task::yield_now().await;
            Ok(Value::json(json!({ "id": id, "found": true })))
        });

    let app = AsyncApp::builder()
        .route(Route::new("/items/{id}", Method::GET, lookup).unwrap())
        .build_async()
        .unwrap();

    let response = app.handle(get("/items/12")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json_body(), Some(json!({"id": 12, "found": true})));

    let response = app.handle(get("/items/twelve")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn async_app_matches_sync_validation() {
    let app = AsyncApp::builder().routes(routes()).build_async().unwrap();

    let rejected = app.handle(post("/1?a=2&b=true&s=s&f=1.0&n=2.0", &body())).await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert!(rejected.json_body().unwrap().get("i").is_some());

    let accepted = app.handle(post("/1?a=2&b=true&s=s&f=1.0&n=2.0&i=4", &body())).await;
    assert_eq!(accepted.json_body(), Some(body()));
}

#[tokio::test]
async fn configured_application_picks_its_flavor() {
    let config = ConfigLoader::new()
        .with_string("[app]\nasync_mode = true\n\n[docs]\nenabled = false", "toml")
        .unwrap()
        .load()
        .unwrap();
    let app = AppBuilder::new()
        .config(config)
        .routes(routes())
        .build_configured()
        .unwrap();

    assert!(matches!(app, Application::Async(_)));
    assert_eq!(app.handle(get("/docs/")).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.document().links().len(), 2);
}

#[test]
fn custom_components_take_precedence() {
    use std::sync::Arc;

    struct Tenant(&'static str);

    let tenant = Function::builder("tenant").sync(|_| Ok(Value::new(Tenant("acme"))));
    let handler = Function::builder("whoami")
        .param("tenant", Annotation::of::<Tenant>())
        .sync(|args| Ok(Value::new(args.get_as::<Tenant>("tenant")?.0.to_string())));

    let app = App::builder()
        .component(Arc::new(FnComponent::for_type::<Tenant>(tenant)))
        .route(Route::new("/whoami", Method::GET, handler).unwrap())
        .build()
        .unwrap();

    let response = app.handle(get("/whoami"));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"acme");
}
