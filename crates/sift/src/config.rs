//! Definition-time configuration for a searcher.
//!
//! A [`Configuration`] holds everything a searcher type declares once: the
//! default model, the optional setup step, the ordered filters and the
//! fields coerced to booleans. It is usually built inside a
//! `once_cell::sync::Lazy` static and returned from
//! [`Searcher::configuration`]; after that it is only read.
//!
//! # Inheritance
//!
//! A derived definition starts from a copy of its parent's configuration.
//! The copy is independent: filters added to the child never show up in the
//! parent and vice versa. Inheritance replaces whatever the child already
//! had, so it must happen before any local registration.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SearcherError};
use crate::params::Params;
use crate::searcher::Searcher;
use crate::step::{Filter, FilterDescriptor, Step};

/// The default source of records for a searcher.
///
/// Any `Fn() -> Scope` closure is a source.
pub trait Source<Scope>: Send + Sync {
    /// Returns the unfiltered scope.
    fn all(&self) -> Scope;
}

impl<Scope, F> Source<Scope> for F
where
    F: Fn() -> Scope + Send + Sync,
{
    fn all(&self) -> Scope {
        self()
    }
}

/// The registry of a searcher definition.
///
/// # Example
///
/// ```
/// use sift::{Configuration, Filter, Params, Searcher, SearcherError};
///
/// struct Numbers;
///
/// impl Searcher for Numbers {
///     type Scope = Vec<i64>;
///     type Error = SearcherError;
///
///     fn configuration() -> &'static Configuration<Self> {
///         unimplemented!()
///     }
/// }
///
/// # fn main() -> Result<(), SearcherError> {
/// let mut config = Configuration::<Numbers>::new();
/// config
///     .model(|| vec![1, 2, 3])?
///     .filter_with(|_, scope: Vec<i64>, _| Ok(scope))?
///     .booleans(["active"]);
///
/// assert!(config.model(|| vec![]).is_err());
/// assert_eq!(config.filters().len(), 1);
/// assert!(config.is_boolean("active"));
/// # Ok(())
/// # }
/// ```
pub struct Configuration<S: Searcher> {
    model: Option<Arc<dyn Source<S::Scope>>>,
    setup: Option<Step<S>>,
    filters: Vec<FilterDescriptor<S>>,
    booleans: BTreeSet<String>,
}

impl<S: Searcher> Configuration<S> {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Configuration {
            model: None,
            setup: None,
            filters: Vec::new(),
            booleans: BTreeSet::new(),
        }
    }

    /// Creates a configuration seeded from a parent of the same searcher type.
    pub fn derive_from(parent: &Configuration<S>) -> Self {
        let mut config = Configuration::new();
        config.inherit_from(parent);
        config
    }

    /// Creates a configuration seeded from a parent searcher type.
    ///
    /// See [`Configuration::inherit_from_base`].
    pub fn derive_from_base<P>(parent: &Configuration<P>) -> Self
    where
        P: Searcher<Scope = S::Scope>,
        S: AsRef<P>,
        S::Error: From<P::Error>,
    {
        let mut config = Configuration::new();
        config.inherit_from_base(parent);
        config
    }

    /// Copies the parent's model, setup, filters and boolean fields.
    ///
    /// Anything registered on `self` before this call is replaced.
    pub fn inherit_from(&mut self, parent: &Configuration<S>) {
        self.model = parent.model.clone();
        self.setup = parent.setup.clone();
        self.filters = parent.filters.clone();
        self.booleans = parent.booleans.clone();
    }

    /// Copies the configuration of a parent searcher type.
    ///
    /// Inline steps are re-targeted at the child through `AsRef<P>`, and
    /// their errors are converted with `From`. Named steps keep their
    /// names; the child's [`Searcher::dispatch`] must handle them, usually
    /// by delegating to the parent.
    ///
    /// Anything registered on `self` before this call is replaced.
    pub fn inherit_from_base<P>(&mut self, parent: &Configuration<P>)
    where
        P: Searcher<Scope = S::Scope>,
        S: AsRef<P>,
        S::Error: From<P::Error>,
    {
        self.model = parent.model.clone();
        self.setup = parent.setup.as_ref().map(|step| step.adapt());
        self.filters = parent.filters.iter().map(|filter| filter.adapt()).collect();
        self.booleans = parent.booleans.clone();
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Registers the default model. Fails if one is already set.
    pub fn model<M>(&mut self, source: M) -> Result<&mut Self>
    where
        M: Source<S::Scope> + 'static,
    {
        if self.model.is_some() {
            return Err(SearcherError::ModelAlreadyDefined {
                searcher: std::any::type_name::<S>(),
            });
        }

        self.model = Some(Arc::new(source));
        Ok(self)
    }

    /// Registers the setup step. Fails if one is already set.
    pub fn setup(&mut self, step: Step<S>) -> Result<&mut Self> {
        if self.setup.is_some() {
            return Err(SearcherError::SetupAlreadyDefined {
                searcher: std::any::type_name::<S>(),
            });
        }

        self.setup = Some(step);
        Ok(self)
    }

    /// Registers a setup step resolved by name.
    pub fn setup_method(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.setup(Step::method(name))
    }

    /// Registers an inline setup step.
    pub fn setup_with<F>(&mut self, body: F) -> Result<&mut Self>
    where
        F: Fn(&S, S::Scope, &Params) -> std::result::Result<S::Scope, S::Error> + Send + Sync + 'static,
    {
        self.setup(Step::inline(body))
    }

    /// Appends a filter. Fails if it has neither a method nor a body.
    pub fn filter(&mut self, filter: Filter<S>) -> Result<&mut Self> {
        self.filters.push(filter.build()?);
        Ok(self)
    }

    /// Appends an unguarded filter resolved by name.
    pub fn filter_method(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.filter(Filter::<S>::new().method(name))
    }

    /// Appends an unguarded inline filter.
    pub fn filter_with<F>(&mut self, body: F) -> Result<&mut Self>
    where
        F: Fn(&S, S::Scope, &Params) -> std::result::Result<S::Scope, S::Error> + Send + Sync + 'static,
    {
        self.filter(Filter::<S>::new().body(body))
    }

    /// Flags fields whose values are coerced to booleans before steps run.
    ///
    /// Registering a field twice has no effect.
    pub fn booleans<I, K>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.booleans
            .extend(fields.into_iter().map(|field| field.as_ref().to_string()));
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns `true` if a default model is registered.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Returns the default model.
    pub fn model_source(&self) -> Option<&dyn Source<S::Scope>> {
        self.model.as_deref()
    }

    /// Loads all records from the default model, if one is registered.
    pub fn all(&self) -> Option<S::Scope> {
        self.model.as_ref().map(|source| source.all())
    }

    /// Returns the setup step.
    pub fn setup_step(&self) -> Option<&Step<S>> {
        self.setup.as_ref()
    }

    /// Returns the filters in registration order.
    pub fn filters(&self) -> &[FilterDescriptor<S>] {
        &self.filters
    }

    /// Returns the boolean-coerced field names.
    pub fn boolean_fields(&self) -> &BTreeSet<String> {
        &self.booleans
    }

    /// Returns `true` if `field` is coerced to a boolean.
    pub fn is_boolean(&self, field: &str) -> bool {
        self.booleans.contains(field)
    }
}

impl<S: Searcher> Default for Configuration<S> {
    fn default() -> Self {
        Configuration::new()
    }
}

impl<S: Searcher> Clone for Configuration<S> {
    fn clone(&self) -> Self {
        Configuration::derive_from(self)
    }
}

impl<S: Searcher> fmt::Debug for Configuration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("searcher", &std::any::type_name::<S>())
            .field("model", &self.has_model())
            .field("setup", &self.setup)
            .field("filters", &self.filters)
            .field("booleans", &self.booleans)
            .finish()
    }
}
