//! The searcher trait and the executor that runs a search.
//!
//! A searcher type declares its [`Configuration`] once and handles named
//! steps in [`Searcher::dispatch`]. A [`Search`] binds a searcher value to a
//! starting scope and runs the pipeline:
//!
//! ```text
//! params
//!   → boolean coercion of flagged fields
//!   → starting scope (default_filter hook, else the bound scope)
//!   → setup step (if any)
//!   → filters, in registration order, each gated by its guards
//!   → final scope
//! ```

use std::any::type_name;
use std::fmt;

use tracing::{debug, debug_span, trace};

use crate::boolean;
use crate::config::Configuration;
use crate::error::SearcherError;
use crate::params::Params;

/// A searcher definition.
///
/// # Example
///
/// ```
/// use once_cell::sync::Lazy;
/// use sift::{Configuration, Filter, Params, Search, Searcher, SearcherError};
///
/// struct Evens;
///
/// static CONFIG: Lazy<Configuration<Evens>> = Lazy::new(|| {
///     let mut config = Configuration::<Evens>::new();
///     config
///         .model(|| vec![1, 2, 3, 4, 5])
///         .and_then(|c| c.filter(Filter::<Evens>::new().method("even").when(|p| p.is_true("only_even"))))
///         .expect("valid searcher definition");
///     config.booleans(["only_even"]);
///     config
/// });
///
/// impl Searcher for Evens {
///     type Scope = Vec<i64>;
///     type Error = SearcherError;
///
///     fn configuration() -> &'static Configuration<Self> {
///         &CONFIG
///     }
///
///     fn dispatch(&self, method: &str, scope: Vec<i64>, _: &Params) -> Result<Vec<i64>, SearcherError> {
///         match method {
///             "even" => Ok(scope.into_iter().filter(|n| n % 2 == 0).collect()),
///             other => Err(SearcherError::unknown_step::<Self>(other)),
///         }
///     }
/// }
///
/// let search = Search::from_model(Evens).unwrap();
/// assert_eq!(search.search(&Params::new().with("only_even", "1")).unwrap(), vec![2, 4]);
/// assert_eq!(search.search(&Params::new().with("only_even", "off")).unwrap(), vec![1, 2, 3, 4, 5]);
/// ```
pub trait Searcher: Sized + 'static {
    /// The value narrowed by the pipeline: a collection, a query builder, ...
    type Scope: Clone;

    /// Error type returned by steps. Unknown named steps produce a
    /// [`SearcherError`], so it must convert from one.
    type Error: From<SearcherError>;

    /// The definition-time configuration of this searcher type.
    fn configuration() -> &'static Configuration<Self>;

    /// Runs the named setup or filter step.
    ///
    /// The default implementation knows no steps.
    fn dispatch(
        &self,
        method: &str,
        scope: Self::Scope,
        params: &Params,
    ) -> Result<Self::Scope, Self::Error> {
        let _ = (scope, params);
        Err(SearcherError::unknown_step::<Self>(method).into())
    }

    /// Per-call override of the starting scope.
    ///
    /// Returning `None` starts from the bound scope.
    fn default_filter(&self) -> Option<Self::Scope> {
        None
    }
}

/// A searcher bound to a starting scope.
pub struct Search<S: Searcher> {
    searcher: S,
    scope: S::Scope,
}

impl<S> Clone for Search<S>
where
    S: Searcher + Clone,
{
    fn clone(&self) -> Self {
        Search {
            searcher: self.searcher.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<S> fmt::Debug for Search<S>
where
    S: Searcher + fmt::Debug,
    S::Scope: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("searcher", &self.searcher)
            .field("scope", &self.scope)
            .finish()
    }
}

impl<S: Searcher> Search<S> {
    /// Binds `searcher` to `scope`, or to all records of the configured
    /// model when `scope` is `None`.
    ///
    /// Fails with [`SearcherError::NoDefaultScope`] if neither is available.
    pub fn new(searcher: S, scope: Option<S::Scope>) -> Result<Self, SearcherError> {
        let scope = match scope {
            Some(scope) => scope,
            None => S::configuration()
                .all()
                .ok_or(SearcherError::NoDefaultScope {
                    searcher: type_name::<S>(),
                })?,
        };

        Ok(Search { searcher, scope })
    }

    /// Binds `searcher` to an explicit scope.
    pub fn with_scope(searcher: S, scope: S::Scope) -> Self {
        Search { searcher, scope }
    }

    /// Binds `searcher` to all records of the configured model.
    pub fn from_model(searcher: S) -> Result<Self, SearcherError> {
        Search::new(searcher, None)
    }

    /// The bound scope.
    pub fn scope(&self) -> &S::Scope {
        &self.scope
    }

    /// The searcher value.
    pub fn searcher(&self) -> &S {
        &self.searcher
    }

    /// The searcher's configuration.
    pub fn configuration(&self) -> &'static Configuration<S> {
        S::configuration()
    }

    /// Returns a copy of `params` with every boolean field coerced.
    pub fn normalize(&self, params: &Params) -> Params {
        let config = S::configuration();
        params.map_values(|key, value| {
            if config.is_boolean(key) {
                boolean::cast(value).into()
            } else {
                value.clone()
            }
        })
    }

    /// Runs the pipeline and returns the final scope.
    ///
    /// The first step that fails aborts the search with its error,
    /// unchanged.
    pub fn search(&self, params: &Params) -> Result<S::Scope, S::Error> {
        let config = S::configuration();
        let _span = debug_span!("search", searcher = type_name::<S>()).entered();

        let params = self.normalize(params);

        let mut scope = match self.searcher.default_filter() {
            Some(scope) => {
                trace!("starting from default_filter scope");
                scope
            }
            None => self.scope.clone(),
        };

        if let Some(setup) = config.setup_step() {
            trace!(step = %setup, "applying setup");
            scope = setup.apply(&self.searcher, scope, &params)?;
        }

        let mut applied = 0usize;
        for (index, filter) in config.filters().iter().enumerate() {
            if !filter.applies(&params) {
                trace!(index, step = %filter.step(), "filter skipped by guard");
                continue;
            }

            trace!(index, step = %filter.step(), "applying filter");
            scope = filter.apply(&self.searcher, scope, &params)?;
            applied += 1;
        }

        debug!(
            applied,
            skipped = config.filters().len() - applied,
            "search complete"
        );
        Ok(scope)
    }
}
