//! Application assembly and request dispatch.
//!
//! An application owns the route table, one [`Injector`] and the hook lists.
//! Each request runs through the same sequence:
//!
//! 1. The router matches the path; `404` and `405` are answered directly.
//! 2. Per-request [`State`] is seeded with the [`Request`] and [`PathParams`](stoa_core::PathParams).
//! 3. The batch `[on_request hooks.., handler]` runs as one plan, so hooks and
//!    handler share every resolved dependency.
//! 4. Each `on_response` hook runs with the current result bound to its
//!    `ReturnValue` parameter. A hook returning the unit value keeps the
//!    result; anything else replaces it.
//! 5. The result is mapped with [`Response::from_value`].
//!
//! If any step fails, the error is mapped with [`Response::from_error`] and
//! the `on_error` hooks run with that response as their `ReturnValue`.

use http::{Method, StatusCode};
use stoa_config::StoaConfig;
use stoa_core::markdown::render_markdown;
use stoa_core::{Error, Function, Value};
use stoa_docs::{build_document, Document, RouteItem};
use stoa_extract::{Request, PATH_PARAMS_KEY, REQUEST_KEY};
use stoa_inject::{Component, Injector, State, StateKey};
use std::slice;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::error::AppResult;
use crate::response::Response;
use crate::router::{RouteMatch, Router};

/// Functions run around every handler.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    on_request: Vec<Function>,
    on_response: Vec<Function>,
    on_error: Vec<Function>,
}

impl Hooks {
    /// Hooks run before the handler, in the handler's plan.
    pub fn on_request(&self) -> &[Function] {
        &self.on_request
    }

    /// Hooks run after the handler succeeds.
    pub fn on_response(&self) -> &[Function] {
        &self.on_response
    }

    /// Hooks run after a failure.
    pub fn on_error(&self) -> &[Function] {
        &self.on_error
    }
}

#[derive(Debug)]
struct Endpoint {
    url: String,
    method: Method,
    batch: Vec<Function>,
}

/// Builder for [`App`] and [`AsyncApp`].
///
/// # Example
///
/// ```rust
/// use stoa::prelude::*;
///
/// let hello = Function::builder("hello").sync(|_| Ok(Value::json("hello")));
/// let app = App::builder()
///     .route(Route::new("/", Method::GET, hello).unwrap())
///     .build()
///     .unwrap();
///
/// let response = app.handle(Request::new(Method::GET, "/".parse().unwrap()));
/// assert_eq!(response.status(), http::StatusCode::OK);
/// ```
#[derive(Default)]
pub struct AppBuilder {
    items: Vec<RouteItem>,
    components: Vec<Arc<dyn Component>>,
    hooks: Hooks,
    config: StoaConfig,
}

impl AppBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route or include.
    pub fn route(mut self, item: impl Into<RouteItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Adds several routes or includes.
    pub fn routes(mut self, items: impl IntoIterator<Item = RouteItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Registers a component.
    ///
    /// Application components are consulted before the built-in ones, in
    /// registration order.
    pub fn component(mut self, component: Arc<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    /// Adds an `on_request` hook.
    pub fn on_request(mut self, hook: Function) -> Self {
        self.hooks.on_request.push(hook);
        self
    }

    /// Adds an `on_response` hook.
    pub fn on_response(mut self, hook: Function) -> Self {
        self.hooks.on_response.push(hook);
        self
    }

    /// Adds an `on_error` hook.
    pub fn on_error(mut self, hook: Function) -> Self {
        self.hooks.on_error.push(hook);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: StoaConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a blocking application.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if routes collide, the document cannot be built, or
    /// (with `warm_plans`) any handler or hook cannot be resolved. Async
    /// handlers are rejected at plan time.
    pub fn build(self) -> AppResult<App> {
        let components = self.component_list();
        let injector = Injector::new(components, stoa_extract::initial_state());
        Ok(App {
            core: Core::assemble(self, injector)?,
        })
    }

    /// Builds an application whose handlers may be async.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_async(self) -> AppResult<AsyncApp> {
        let components = self.component_list();
        let injector = Injector::new_async(components, stoa_extract::initial_state());
        Ok(AsyncApp {
            core: Core::assemble(self, injector)?,
        })
    }

    /// Builds whichever flavor `app.async_mode` selects.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_configured(self) -> AppResult<Application> {
        if self.config.app.async_mode {
            self.build_async().map(Application::Async)
        } else {
            self.build().map(Application::Sync)
        }
    }

    fn component_list(&self) -> Vec<Arc<dyn Component>> {
        self.components
            .iter()
            .cloned()
            .chain(stoa_extract::defaults())
            .collect()
    }
}

struct Core {
    endpoints: Vec<Endpoint>,
    router: Router,
    injector: Injector,
    hooks: Hooks,
    document: Document,
    config: StoaConfig,
}

impl Core {
    fn assemble(builder: AppBuilder, injector: Injector) -> AppResult<Self> {
        let AppBuilder {
            items,
            hooks,
            config,
            ..
        } = builder;

        let mut document = build_document(&items)
            .with_title(config.docs.title.as_str())
            .with_version(config.docs.version.as_str());
        if !config.docs.description.is_empty() {
            document = document.with_description(render_markdown(&config.docs.description));
        }

        let mut routes = Vec::new();
        flatten(&items, "", &mut routes);

        if config.docs.enabled {
            document = document.with_url(config.docs.url.as_str());
            let body = document.to_value()?;
            let serve_docs = Function::builder("serve_docs")
                .doc("Returns the API document.")
                .sync(move |_| Ok(Value::json(body.clone())));
            routes.push((config.docs.url.clone(), Method::GET, serve_docs));
        }

        let mut router = Router::new();
        let mut endpoints = Vec::with_capacity(routes.len());
        for (index, (url, method, handler)) in routes.into_iter().enumerate() {
            router.insert(method.clone(), &url, index)?;
            let mut batch = hooks.on_request.clone();
            batch.push(handler);
            endpoints.push(Endpoint { url, method, batch });
        }

        let core = Self {
            endpoints,
            router,
            injector,
            hooks,
            document,
            config,
        };
        if core.config.app.warm_plans {
            core.warm()?;
        }

        info!(
            app = %core.config.app.name,
            routes = core.endpoints.len(),
            async_mode = core.injector.allows_async(),
            "application assembled"
        );
        Ok(core)
    }

    fn warm(&self) -> AppResult<()> {
        for endpoint in &self.endpoints {
            self.injector.prepare(&endpoint.batch)?;
        }
        for hook in self.hooks.on_response.iter().chain(&self.hooks.on_error) {
            self.injector.prepare(slice::from_ref(hook))?;
        }
        debug!(plans = self.injector.cache().len(), "execution plans warmed");
        Ok(())
    }

    /// Matches the request and seeds its state.
    fn dispatch(&self, request: Request) -> Result<(&Endpoint, State), Response> {
        match self.router.find(request.method(), request.path()) {
            RouteMatch::Found { index, params } => {
                let endpoint = &self.endpoints[index];
                let state = State::new()
                    .with(REQUEST_KEY, Value::new(request))
                    .with(PATH_PARAMS_KEY, Value::new(params));
                Ok((endpoint, state))
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                debug!(?allowed, "method not allowed");
                Err(Response::message(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"))
            }
            RouteMatch::NotFound => Err(Response::message(StatusCode::NOT_FOUND, "Not found")),
        }
    }
}

fn flatten(items: &[RouteItem], prefix: &str, out: &mut Vec<(String, Method, Function)>) {
    for item in items {
        match item {
            RouteItem::Route(route) => out.push((
                format!("{prefix}{}", route.url()),
                route.method().clone(),
                route.handler().clone(),
            )),
            RouteItem::Include(include) => {
                flatten(include.items(), &format!("{prefix}{}", include.url()), out);
            }
        }
    }
}

fn keep_or_replace(current: Value, produced: Value) -> Value {
    if produced.is_none() {
        current
    } else {
        produced
    }
}

fn log_failure(err: &Error) {
    match err {
        Error::Validation(errors) => debug!(fields = errors.len(), "request failed validation"),
        other => error!(error = %other, "request failed"),
    }
}

/// A blocking application.
///
/// Handlers and components must be synchronous; each request runs to
/// completion on the calling thread.
pub struct App {
    core: Core,
}

impl App {
    /// Creates a builder.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Handles one request.
    pub fn handle(&self, request: Request) -> Response {
        let span = info_span!("request", method = %request.method(), path = %request.path());
        let _enter = span.enter();

        let (endpoint, mut state) = match self.core.dispatch(request) {
            Ok(found) => found,
            Err(response) => return response,
        };

        let result = self
            .core
            .injector
            .run(&endpoint.batch, &mut state)
            .and_then(|value| self.run_response_hooks(value, &mut state));

        let response = match result {
            Ok(value) => Response::from_value(&value),
            Err(err) => self.run_error_hooks(&err, &mut state),
        };
        debug!(route = %endpoint.url, method = %endpoint.method, status = response.status().as_u16(), "request handled");
        response
    }

    fn run_response_hooks(&self, mut value: Value, state: &mut State) -> stoa_core::Result<Value> {
        for hook in &self.core.hooks.on_response {
            state.insert(StateKey::RETURN_VALUE, value.clone());
            let produced = self.core.injector.run(slice::from_ref(hook), state)?;
            value = keep_or_replace(value, produced);
        }
        Ok(value)
    }

    fn run_error_hooks(&self, err: &Error, state: &mut State) -> Response {
        log_failure(err);
        let mut response = Response::from_error(err);
        for hook in &self.core.hooks.on_error {
            state.insert(StateKey::RETURN_VALUE, Value::new(response.clone()));
            match self.core.injector.run(slice::from_ref(hook), state) {
                Ok(produced) if !produced.is_none() => response = Response::from_value(&produced),
                Ok(_) => {}
                Err(hook_err) => warn!(hook = hook.name(), error = %hook_err, "error hook failed"),
            }
        }
        response
    }

    /// Returns the API document.
    pub fn document(&self) -> &Document {
        &self.core.document
    }

    /// Returns the configuration the application was built with.
    pub fn config(&self) -> &StoaConfig {
        &self.core.config
    }

    /// Returns the hooks.
    pub fn hooks(&self) -> &Hooks {
        &self.core.hooks
    }

    /// Returns the injector.
    pub fn injector(&self) -> &Injector {
        &self.core.injector
    }
}

/// An application whose handlers and components may be async.
pub struct AsyncApp {
    core: Core,
}

impl AsyncApp {
    /// Creates a builder.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Handles one request.
    pub async fn handle(&self, request: Request) -> Response {
        let span = info_span!("request", method = %request.method(), path = %request.path());
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: Request) -> Response {
        let (endpoint, mut state) = match self.core.dispatch(request) {
            Ok(found) => found,
            Err(response) => return response,
        };

        let result = match self.core.injector.run_async(&endpoint.batch, &mut state).await {
            Ok(value) => self.run_response_hooks(value, &mut state).await,
            Err(err) => Err(err),
        };

        let response = match result {
            Ok(value) => Response::from_value(&value),
            Err(err) => self.run_error_hooks(&err, &mut state).await,
        };
        debug!(route = %endpoint.url, method = %endpoint.method, status = response.status().as_u16(), "request handled");
        response
    }

    async fn run_response_hooks(
        &self,
        mut value: Value,
        state: &mut State,
    ) -> stoa_core::Result<Value> {
        for hook in &self.core.hooks.on_response {
            state.insert(StateKey::RETURN_VALUE, value.clone());
            let produced = self
                .core
                .injector
                .run_async(slice::from_ref(hook), state)
                .await?;
            value = keep_or_replace(value, produced);
        }
        Ok(value)
    }

    async fn run_error_hooks(&self, err: &Error, state: &mut State) -> Response {
        log_failure(err);
        let mut response = Response::from_error(err);
        for hook in &self.core.hooks.on_error {
            state.insert(StateKey::RETURN_VALUE, Value::new(response.clone()));
            match self.core.injector.run_async(slice::from_ref(hook), state).await {
                Ok(produced) if !produced.is_none() => response = Response::from_value(&produced),
                Ok(_) => {}
                Err(hook_err) => warn!(hook = hook.name(), error = %hook_err, "error hook failed"),
            }
        }
        response
    }

    /// Returns the API document.
    pub fn document(&self) -> &Document {
        &self.core.document
    }

    /// Returns the configuration the application was built with.
    pub fn config(&self) -> &StoaConfig {
        &self.core.config
    }

    /// Returns the hooks.
    pub fn hooks(&self) -> &Hooks {
        &self.core.hooks
    }

    /// Returns the injector.
    pub fn injector(&self) -> &Injector {
        &self.core.injector
    }
}

/// Either application flavor, as chosen by configuration.
pub enum Application {
    /// A blocking application.
    Sync(App),
    /// An async application.
    Async(AsyncApp),
}

impl Application {
    /// Handles one request on whichever flavor this is.
    pub async fn handle(&self, request: Request) -> Response {
        match self {
            Self::Sync(app) => app.handle(request),
            Self::Async(app) => app.handle(request).await,
        }
    }

    /// Returns the API document.
    pub fn document(&self) -> &Document {
        match self {
            Self::Sync(app) => app.document(),
            Self::Async(app) => app.document(),
        }
    }
}
