//! Sift - declarative filter pipelines over opaque query scopes.
//!
//! A searcher type registers, once, how to narrow a scope from request
//! parameters: a default model, an optional setup step, an ordered list of
//! filters and the fields that should be read as booleans. At call time a
//! [`Search`] folds those steps over a starting scope.
//!
//! The scope is whatever the steps understand: a `Vec`, an ORM query
//! builder, an API request under construction. Sift never looks inside it.
//!
//! # Quick Start
//!
//! ```rust
//! use once_cell::sync::Lazy;
//! use sift::{Configuration, Filter, Params, Search, Searcher, SearcherError};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Task {
//!     name: &'static str,
//!     done: bool,
//! }
//!
//! struct Tasks;
//!
//! static TASKS: Lazy<Configuration<Tasks>> = Lazy::new(|| {
//!     let mut config = Configuration::<Tasks>::new();
//!     config.booleans(["done"]);
//!     config
//!         .model(|| {
//!             vec![
//!                 Task { name: "write docs", done: false },
//!                 Task { name: "fix bug", done: true },
//!             ]
//!         })
//!         .and_then(|c| {
//!             c.filter(
//!                 Filter::<Tasks>::new()
//!                     .body(|_, scope: Vec<Task>, params: &Params| {
//!                         let done = params.is_true("done");
//!                         Ok(scope.into_iter().filter(|t| t.done == done).collect())
//!                     })
//!                     .when(|params| params.contains_key("done")),
//!             )
//!         })
//!         .expect("valid searcher definition");
//!     config
//! });
//!
//! impl Searcher for Tasks {
//!     type Scope = Vec<Task>;
//!     type Error = SearcherError;
//!
//!     fn configuration() -> &'static Configuration<Self> {
//!         &TASKS
//!     }
//! }
//!
//! let search = Search::from_model(Tasks).unwrap();
//!
//! let open = search.search(&Params::new().with("done", "false")).unwrap();
//! assert_eq!(open.len(), 1);
//! assert_eq!(open[0].name, "write docs");
//!
//! // without the parameter the guarded filter does not run
//! assert_eq!(search.search(&Params::new()).unwrap().len(), 2);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! search(params)
//!   1. coerce boolean fields         (see [`boolean`])
//!   2. starting scope                 default_filter() or the bound scope
//!   3. setup step                     if registered
//!   4. filters, in order              skipped when `when` fails or `unless` holds
//!   5. return the scope
//! ```
//!
//! Steps are either names, resolved through [`Searcher::dispatch`], or
//! inline closures. Errors returned by a step abort the search and reach
//! the caller unchanged.

pub mod boolean;
mod config;
mod error;
mod params;
mod searcher;
mod step;
mod value;

// Re-export public API
pub use config::{Configuration, Source};
pub use error::{ErrorKind, Result, SearcherError};
pub use params::Params;
pub use searcher::{Search, Searcher};
pub use step::{Filter, FilterDescriptor, Guard, Step, StepFn};
pub use value::{Number, Param};
