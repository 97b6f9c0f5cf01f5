//! Setup and filter steps.
//!
//! A step is either the name of an operation the searcher handles in
//! [`Searcher::dispatch`], or an inline closure. Both receive the current
//! scope and the normalized parameters and return the next scope.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SearcherError};
use crate::params::Params;
use crate::searcher::Searcher;

/// Inline step body.
pub type StepFn<S> = Arc<
    dyn Fn(&S, <S as Searcher>::Scope, &Params) -> std::result::Result<<S as Searcher>::Scope, <S as Searcher>::Error>
        + Send
        + Sync,
>;

/// Guard predicate over the normalized parameters.
pub type Guard = Arc<dyn Fn(&Params) -> bool + Send + Sync>;

/// A setup or filter transformation.
pub enum Step<S: Searcher> {
    /// Resolved through [`Searcher::dispatch`] at call time.
    Method(String),
    /// Called directly with the searcher.
    Inline(StepFn<S>),
}

impl<S: Searcher> Step<S> {
    /// Creates a step resolved by name.
    pub fn method(name: impl Into<String>) -> Self {
        Step::Method(name.into())
    }

    /// Creates an inline step.
    pub fn inline<F>(body: F) -> Self
    where
        F: Fn(&S, S::Scope, &Params) -> std::result::Result<S::Scope, S::Error> + Send + Sync + 'static,
    {
        Step::Inline(Arc::new(body))
    }

    /// Returns the method name for named steps.
    pub fn name(&self) -> Option<&str> {
        match self {
            Step::Method(name) => Some(name),
            Step::Inline(_) => None,
        }
    }

    /// Returns `true` for inline steps.
    pub fn is_inline(&self) -> bool {
        matches!(self, Step::Inline(_))
    }

    pub(crate) fn apply(
        &self,
        searcher: &S,
        scope: S::Scope,
        params: &Params,
    ) -> std::result::Result<S::Scope, S::Error> {
        match self {
            Step::Method(name) => searcher.dispatch(name, scope, params),
            Step::Inline(body) => body(searcher, scope, params),
        }
    }

    /// Re-targets this step at a searcher that can view itself as `S`.
    pub(crate) fn adapt<C>(&self) -> Step<C>
    where
        C: Searcher<Scope = S::Scope> + AsRef<S>,
        C::Error: From<S::Error>,
    {
        match self {
            Step::Method(name) => Step::Method(name.clone()),
            Step::Inline(body) => {
                let body = Arc::clone(body);
                let adapted: StepFn<C> =
                    Arc::new(move |child: &C, scope: C::Scope, params: &Params| {
                        body(AsRef::<S>::as_ref(child), scope, params).map_err(C::Error::from)
                    });
                Step::Inline(adapted)
            }
        }
    }
}

impl<S: Searcher> Clone for Step<S> {
    fn clone(&self) -> Self {
        match self {
            Step::Method(name) => Step::Method(name.clone()),
            Step::Inline(body) => Step::Inline(Arc::clone(body)),
        }
    }
}

impl<S: Searcher> fmt::Debug for Step<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Method(name) => f.debug_tuple("Method").field(name).finish(),
            Step::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

impl<S: Searcher> fmt::Display for Step<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Method(name) => write!(f, "{name}"),
            Step::Inline(_) => write!(f, "<inline>"),
        }
    }
}

/// Builder for a filter registration.
///
/// A filter needs a method name or a body; registering one with neither
/// fails with [`SearcherError::MissingFilterStep`]. If both are given the
/// method name is used.
///
/// # Example
///
/// ```
/// use sift::{Filter, Params, Searcher, Configuration};
///
/// struct Numbers;
///
/// impl Searcher for Numbers {
///     type Scope = Vec<i64>;
///     type Error = sift::SearcherError;
///
///     fn configuration() -> &'static Configuration<Self> {
///         unimplemented!()
///     }
/// }
///
/// let filter = Filter::<Numbers>::new()
///     .body(|_, scope: Vec<i64>, _| Ok(scope.into_iter().filter(|n| n % 2 == 0).collect()))
///     .unless(|params: &Params| params.is_true("skip"));
/// assert!(filter.has_step());
/// ```
pub struct Filter<S: Searcher> {
    method: Option<String>,
    body: Option<StepFn<S>>,
    guard_if: Option<Guard>,
    guard_unless: Option<Guard>,
}

impl<S: Searcher> Filter<S> {
    /// Creates an empty filter builder.
    pub fn new() -> Self {
        Filter {
            method: None,
            body: None,
            guard_if: None,
            guard_unless: None,
        }
    }

    /// Sets the method name resolved through [`Searcher::dispatch`].
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.method = Some(name.into());
        self
    }

    /// Sets an inline body.
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&S, S::Scope, &Params) -> std::result::Result<S::Scope, S::Error> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Only run the filter when the predicate holds.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Params) -> bool + Send + Sync + 'static,
    {
        self.guard_if = Some(Arc::new(predicate));
        self
    }

    /// Skip the filter when the predicate holds.
    pub fn unless<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Params) -> bool + Send + Sync + 'static,
    {
        self.guard_unless = Some(Arc::new(predicate));
        self
    }

    /// Returns `true` if a method name or body has been set.
    pub fn has_step(&self) -> bool {
        self.method.is_some() || self.body.is_some()
    }

    /// Validates the builder into a descriptor.
    pub fn build(self) -> Result<FilterDescriptor<S>> {
        let step = match (self.method, self.body) {
            (Some(name), _) => Step::Method(name),
            (None, Some(body)) => Step::Inline(body),
            (None, None) => return Err(SearcherError::MissingFilterStep),
        };

        Ok(FilterDescriptor {
            step,
            guard_if: self.guard_if,
            guard_unless: self.guard_unless,
        })
    }
}

impl<S: Searcher> Default for Filter<S> {
    fn default() -> Self {
        Filter::new()
    }
}

/// A registered filter: one step plus optional guards.
pub struct FilterDescriptor<S: Searcher> {
    step: Step<S>,
    guard_if: Option<Guard>,
    guard_unless: Option<Guard>,
}

impl<S: Searcher> FilterDescriptor<S> {
    /// The step this filter runs.
    pub fn step(&self) -> &Step<S> {
        &self.step
    }

    /// The method name, for named filters.
    pub fn method(&self) -> Option<&str> {
        self.step.name()
    }

    /// Returns `true` if the filter has an `if` guard.
    pub fn has_if(&self) -> bool {
        self.guard_if.is_some()
    }

    /// Returns `true` if the filter has an `unless` guard.
    pub fn has_unless(&self) -> bool {
        self.guard_unless.is_some()
    }

    /// Evaluates the guards. Filters without guards always apply.
    pub fn applies(&self, params: &Params) -> bool {
        if let Some(guard) = &self.guard_if {
            if !guard(params) {
                return false;
            }
        }

        if let Some(guard) = &self.guard_unless {
            if guard(params) {
                return false;
            }
        }

        true
    }

    pub(crate) fn apply(
        &self,
        searcher: &S,
        scope: S::Scope,
        params: &Params,
    ) -> std::result::Result<S::Scope, S::Error> {
        self.step.apply(searcher, scope, params)
    }

    pub(crate) fn adapt<C>(&self) -> FilterDescriptor<C>
    where
        C: Searcher<Scope = S::Scope> + AsRef<S>,
        C::Error: From<S::Error>,
    {
        FilterDescriptor {
            step: self.step.adapt(),
            guard_if: self.guard_if.clone(),
            guard_unless: self.guard_unless.clone(),
        }
    }
}

impl<S: Searcher> Clone for FilterDescriptor<S> {
    fn clone(&self) -> Self {
        FilterDescriptor {
            step: self.step.clone(),
            guard_if: self.guard_if.clone(),
            guard_unless: self.guard_unless.clone(),
        }
    }
}

impl<S: Searcher> fmt::Debug for FilterDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("step", &self.step)
            .field("if", &self.has_if())
            .field("unless", &self.has_unless())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    struct Words;

    impl Searcher for Words {
        type Scope = Vec<String>;
        type Error = SearcherError;

        fn configuration() -> &'static Configuration<Self> {
            unreachable!("steps are exercised directly")
        }

        fn dispatch(
            &self,
            method: &str,
            mut scope: Vec<String>,
            _params: &Params,
        ) -> std::result::Result<Vec<String>, SearcherError> {
            match method {
                "shout" => {
                    scope.push("SHOUT".to_string());
                    Ok(scope)
                }
                other => Err(SearcherError::unknown_step::<Self>(other)),
            }
        }
    }

    fn push(word: &'static str) -> Filter<Words> {
        Filter::<Words>::new().body(move |_, mut scope: Vec<String>, _| {
            scope.push(word.to_string());
            Ok(scope)
        })
    }

    #[test]
    fn empty_filter_is_rejected() {
        let err = Filter::<Words>::new().build().unwrap_err();
        assert_eq!(err, SearcherError::MissingFilterStep);
        assert!(err.is_argument());
    }

    #[test]
    fn method_wins_over_body() {
        let descriptor = push("body").method("shout").build().unwrap();
        assert_eq!(descriptor.method(), Some("shout"));

        let scope = descriptor.apply(&Words, vec![], &Params::new()).unwrap();
        assert_eq!(scope, vec!["SHOUT"]);
    }

    #[test]
    fn inline_body_runs() {
        let descriptor = push("a").build().unwrap();
        assert!(descriptor.step().is_inline());

        let scope = descriptor.apply(&Words, vec![], &Params::new()).unwrap();
        assert_eq!(scope, vec!["a"]);
    }

    #[test]
    fn unknown_method_errors() {
        let step = Step::<Words>::method("whisper");
        let err = step.apply(&Words, vec![], &Params::new()).unwrap_err();
        assert!(matches!(err, SearcherError::UnknownStep { ref name, .. } if name == "whisper"));
    }

    #[test]
    fn guards() {
        let descriptor = push("x")
            .when(|p| p.contains_key("go"))
            .unless(|p| p.is_true("stop"))
            .build()
            .unwrap();

        assert!(!descriptor.applies(&Params::new()));
        assert!(descriptor.applies(&Params::new().with("go", 1)));
        assert!(!descriptor.applies(&Params::new().with("go", 1).with("stop", true)));
        assert!(descriptor.applies(&Params::new().with("go", 1).with("stop", false)));
    }

    #[test]
    fn display() {
        assert_eq!(Step::<Words>::method("by_name").to_string(), "by_name");
        assert_eq!(push("x").build().unwrap().step().to_string(), "<inline>");
    }
}
