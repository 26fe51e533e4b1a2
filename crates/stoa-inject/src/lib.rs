//! # Stoa Inject
//!
//! Dependency resolution for Stoa handlers.
//!
//! An [`Injector`] turns a batch of [`Function`](stoa_core::Function)s into a
//! cached [`Plan`]: an ordered list of [`Step`]s in which every value a step
//! needs is either seeded in per-request [`State`] or produced by an earlier
//! step. Values are produced by [`Component`]s, chosen per parameter in
//! registration order.
//!
//! Two execution strategies walk the same plan:
//!
//! - [`BlockingExecutor`] - runs on the calling thread, used by [`Injector::run`]
//! - [`SuspendingExecutor`] - awaits async steps, used by [`Injector::run_async`]
//!   on injectors built with [`Injector::new_async`]
//!
//! ## Concurrency
//!
//! An injector is `Send + Sync` and is shared by all in-flight requests. Each
//! request owns its [`State`]. The [`PlanCache`] is the only shared mutable
//! structure; see its module docs for the race policy.

#![doc(html_root_url = "https://docs.rs/stoa-inject/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod component;
mod executor;
mod injector;
mod plan;
mod state;

pub use cache::{PlanCache, PlanKey};
pub use component::{default_identity, Component, FnComponent};
pub use executor::{BlockingExecutor, Executor, SuspendingExecutor};
pub use injector::{Injector, SeenState};
pub use plan::{Plan, Step};
pub use state::{InitialState, State, StateKey};
