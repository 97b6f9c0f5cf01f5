//! End-to-end tests for searcher definitions and the search pipeline.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use sift::{Configuration, Filter, Param, Params, Search, Searcher, SearcherError};

// ============================================================================
// Shared error type
// ============================================================================

#[derive(Debug, PartialEq)]
enum AppError {
    Searcher(SearcherError),
    Rejected(String),
}

impl From<SearcherError> for AppError {
    fn from(err: SearcherError) -> Self {
        AppError::Searcher(err)
    }
}

fn push(mut scope: Vec<String>, marker: &str) -> Vec<String> {
    scope.push(marker.to_string());
    scope
}

// ============================================================================
// In-memory numbers
// ============================================================================

struct Numbers;

static NUMBERS: Lazy<Configuration<Numbers>> = Lazy::new(|| {
    let mut config = Configuration::<Numbers>::new();
    config
        .model(|| vec![1, 2, 3, 4, 5])
        .and_then(|c| c.filter_method("even"))
        .expect("numbers definition");
    config.booleans(["only_even"]);
    config
});

impl Searcher for Numbers {
    type Scope = Vec<i64>;
    type Error = SearcherError;

    fn configuration() -> &'static Configuration<Self> {
        &NUMBERS
    }

    fn dispatch(&self, method: &str, scope: Vec<i64>, params: &Params) -> Result<Vec<i64>, SearcherError> {
        match method {
            "even" if params.is_true("only_even") => {
                Ok(scope.into_iter().filter(|n| n % 2 == 0).collect())
            }
            "even" => Ok(scope),
            other => Err(SearcherError::unknown_step::<Self>(other)),
        }
    }
}

#[test]
fn only_even_from_model() {
    let search = Search::from_model(Numbers).unwrap();

    assert_eq!(
        search.search(&Params::new().with("only_even", true)).unwrap(),
        vec![2, 4]
    );
    assert_eq!(
        search.search(&Params::new().with("only_even", false)).unwrap(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(search.search(&Params::new()).unwrap(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn only_even_from_query_string_values() {
    let search = Search::from_model(Numbers).unwrap();

    assert_eq!(
        search.search(&Params::new().with("only_even", "t")).unwrap(),
        vec![2, 4]
    );
    assert_eq!(
        search.search(&Params::new().with("only_even", "OFF")).unwrap(),
        vec![1, 2, 3, 4, 5]
    );
}

#[test]
fn explicit_scope_wins_over_model() {
    let search = Search::new(Numbers, Some(vec![10, 11, 12])).unwrap();

    assert_eq!(search.scope(), &vec![10, 11, 12]);
    assert_eq!(
        search.search(&Params::new().with("only_even", true)).unwrap(),
        vec![10, 12]
    );
}

#[test]
fn json_params() {
    let search = Search::from_model(Numbers).unwrap();
    let params = Params::from(serde_json::json!({ "only_even": "1", "page": 3 }));

    assert_eq!(search.search(&params).unwrap(), vec![2, 4]);
}

// ============================================================================
// Fold order and guards
// ============================================================================

struct Markers;

static MARKERS: Lazy<Configuration<Markers>> = Lazy::new(|| {
    let mut config = Configuration::<Markers>::new();
    config
        .filter_with(|_, scope: Vec<String>, _| Ok(push(scope, "F1")))
        .and_then(|c| c.filter_method("f2"))
        .and_then(|c| c.filter_with(|_, scope: Vec<String>, _| Ok(push(scope, "F3"))))
        .and_then(|c| {
            c.filter(
                Filter::<Markers>::new()
                    .body(|_, scope: Vec<String>, _| Ok(push(scope, "UNLESS")))
                    .unless(|p| p.is_true("skip")),
            )
        })
        .and_then(|c| {
            c.filter(
                Filter::<Markers>::new()
                    .method("f2")
                    .when(|p| p.get_str("mode") == Some("twice")),
            )
        })
        .expect("markers definition");
    config.booleans(["skip"]);
    config
});

impl Searcher for Markers {
    type Scope = Vec<String>;
    type Error = SearcherError;

    fn configuration() -> &'static Configuration<Self> {
        &MARKERS
    }

    fn dispatch(&self, method: &str, scope: Vec<String>, _: &Params) -> Result<Vec<String>, SearcherError> {
        match method {
            "f2" => Ok(push(scope, "F2")),
            other => Err(SearcherError::unknown_step::<Self>(other)),
        }
    }
}

#[test]
fn filters_fold_in_registration_order() {
    let search = Search::with_scope(Markers, vec![]);
    let scope = search.search(&Params::new()).unwrap();

    assert_eq!(scope, vec!["F1", "F2", "F3", "UNLESS"]);
}

#[test]
fn unless_guard() {
    let search = Search::with_scope(Markers, vec![]);

    let skipped = search.search(&Params::new().with("skip", true)).unwrap();
    assert_eq!(skipped, vec!["F1", "F2", "F3"]);

    let applied = search.search(&Params::new().with("skip", false)).unwrap();
    assert_eq!(applied, vec!["F1", "F2", "F3", "UNLESS"]);

    // "skip" is a boolean field, so the string form is coerced first
    let coerced = search.search(&Params::new().with("skip", "true")).unwrap();
    assert_eq!(coerced, vec!["F1", "F2", "F3"]);
}

#[test]
fn when_guard() {
    let search = Search::with_scope(Markers, vec!["start".to_string()]);
    let scope = search
        .search(&Params::new().with("mode", "twice"))
        .unwrap();

    assert_eq!(scope, vec!["start", "F1", "F2", "F3", "UNLESS", "F2"]);
}

#[test]
fn bound_scope_is_reused_between_calls() {
    let search = Search::with_scope(Markers, vec!["start".to_string()]);

    search.search(&Params::new()).unwrap();
    let again = search.search(&Params::new()).unwrap();

    assert_eq!(again.first().map(String::as_str), Some("start"));
    assert_eq!(again.len(), 5);
    assert_eq!(search.scope(), &vec!["start".to_string()]);
}

// ============================================================================
// Setup, default_filter and failures
// ============================================================================

#[derive(Debug, Clone)]
struct Orders {
    tenant: &'static str,
    override_scope: Option<Vec<String>>,
}

// Counts filter runs that saw a "locked" status.
static LOCKED_FILTER_RUNS: AtomicUsize = AtomicUsize::new(0);

static ORDERS: Lazy<Configuration<Orders>> = Lazy::new(|| {
    let mut config = Configuration::<Orders>::new();
    config
        .setup_method("tenant")
        .and_then(|c| c.filter_method("reject"))
        .and_then(|c| {
            c.filter_with(|_, scope: Vec<String>, params: &Params| {
                let status = params.get_str("status").unwrap_or("any");
                if status == "locked" {
                    LOCKED_FILTER_RUNS.fetch_add(1, Ordering::SeqCst);
                }
                Ok(push(scope, status))
            })
        })
        .expect("orders definition");
    config
});

impl Searcher for Orders {
    type Scope = Vec<String>;
    type Error = AppError;

    fn configuration() -> &'static Configuration<Self> {
        &ORDERS
    }

    fn dispatch(&self, method: &str, scope: Vec<String>, params: &Params) -> Result<Vec<String>, AppError> {
        match method {
            "tenant" => match params.get_str("status") {
                Some("locked") => Err(AppError::Rejected(format!("{} is locked", self.tenant))),
                _ => Ok(push(scope, self.tenant)),
            },
            "reject" => match params.get_str("status") {
                Some("bogus") => Err(AppError::Rejected("bogus".to_string())),
                _ => Ok(scope),
            },
            other => Err(SearcherError::unknown_step::<Self>(other).into()),
        }
    }

    fn default_filter(&self) -> Option<Vec<String>> {
        self.override_scope.clone()
    }
}

#[test]
fn setup_runs_before_filters() {
    let orders = Orders {
        tenant: "acme",
        override_scope: None,
    };
    let search = Search::with_scope(orders, vec![]);

    let scope = search.search(&Params::new().with("status", "open")).unwrap();
    assert_eq!(scope, vec!["acme", "open"]);
}

#[test]
fn default_filter_replaces_starting_scope() {
    let orders = Orders {
        tenant: "acme",
        override_scope: Some(vec!["override".to_string()]),
    };
    let search = Search::with_scope(orders, vec!["bound".to_string()]);

    let scope = search.search(&Params::new()).unwrap();
    assert_eq!(scope, vec!["override", "acme", "any"]);
    assert_eq!(search.scope(), &vec!["bound".to_string()]);
}

#[test]
fn step_errors_propagate_unchanged() {
    let orders = Orders {
        tenant: "acme",
        override_scope: None,
    };
    let search = Search::with_scope(orders, vec![]);

    let err = search
        .search(&Params::new().with("status", "bogus"))
        .unwrap_err();
    assert_eq!(err, AppError::Rejected("bogus".to_string()));
}

#[test]
fn setup_error_aborts_search() {
    let orders = Orders {
        tenant: "acme",
        override_scope: None,
    };
    let search = Search::with_scope(orders, vec![]);

    let err = search
        .search(&Params::new().with("status", "locked"))
        .unwrap_err();
    assert_eq!(err, AppError::Rejected("acme is locked".to_string()));
    assert_eq!(LOCKED_FILTER_RUNS.load(Ordering::SeqCst), 0);
}

#[test]
fn no_scope_and_no_model() {
    let orders = Orders {
        tenant: "acme",
        override_scope: None,
    };

    let err = Search::new(orders, None).unwrap_err();
    assert!(err.is_configuration());
    assert!(err
        .to_string()
        .starts_with("no default scope or model configured for"));
}

// ============================================================================
// Unknown steps
// ============================================================================

struct Forgetful;

static FORGETFUL: Lazy<Configuration<Forgetful>> = Lazy::new(|| {
    let mut config = Configuration::<Forgetful>::new();
    config.setup_method("missing").expect("forgetful definition");
    config
});

impl Searcher for Forgetful {
    type Scope = Vec<String>;
    type Error = SearcherError;

    fn configuration() -> &'static Configuration<Self> {
        &FORGETFUL
    }
}

#[test]
fn unhandled_named_step_fails() {
    let search = Search::with_scope(Forgetful, vec![]);
    let err = search.search(&Params::new()).unwrap_err();

    assert!(matches!(err, SearcherError::UnknownStep { ref name, .. } if name == "missing"));
}

// ============================================================================
// Inheritance across searcher types
// ============================================================================

#[derive(Debug, Clone)]
struct BaseSearch {
    label: &'static str,
}

static BASE: Lazy<Configuration<BaseSearch>> = Lazy::new(|| {
    let mut config = Configuration::<BaseSearch>::new();
    config
        .model(|| vec!["record".to_string()])
        .and_then(|c| {
            c.setup_with(|searcher: &BaseSearch, scope: Vec<String>, _: &Params| {
                Ok(push(scope, searcher.label))
            })
        })
        .and_then(|c| c.filter_method("base"))
        .expect("base definition");
    config.booleans(["active"]);
    config
});

impl Searcher for BaseSearch {
    type Scope = Vec<String>;
    type Error = AppError;

    fn configuration() -> &'static Configuration<Self> {
        &BASE
    }

    fn dispatch(&self, method: &str, scope: Vec<String>, _: &Params) -> Result<Vec<String>, AppError> {
        match method {
            "base" => Ok(push(scope, "base")),
            other => Err(SearcherError::unknown_step::<Self>(other).into()),
        }
    }
}

#[derive(Debug, Clone)]
struct DerivedSearch {
    base: BaseSearch,
}

impl AsRef<BaseSearch> for DerivedSearch {
    fn as_ref(&self) -> &BaseSearch {
        &self.base
    }
}

static DERIVED: Lazy<Configuration<DerivedSearch>> = Lazy::new(|| {
    let mut config = Configuration::<DerivedSearch>::derive_from_base(BaseSearch::configuration());
    config
        .filter(
            Filter::<DerivedSearch>::new()
                .body(|_, scope: Vec<String>, _| Ok(push(scope, "derived")))
                .when(|p| p.is_true("active")),
        )
        .expect("derived definition");
    config
});

impl Searcher for DerivedSearch {
    type Scope = Vec<String>;
    type Error = AppError;

    fn configuration() -> &'static Configuration<Self> {
        &DERIVED
    }

    fn dispatch(&self, method: &str, scope: Vec<String>, params: &Params) -> Result<Vec<String>, AppError> {
        self.base.dispatch(method, scope, params)
    }
}

#[test]
fn derived_definition_runs_inherited_steps() {
    let derived = DerivedSearch {
        base: BaseSearch { label: "child" },
    };
    let search = Search::from_model(derived).unwrap();

    let scope = search.search(&Params::new().with("active", "1")).unwrap();
    assert_eq!(scope, vec!["record", "child", "base", "derived"]);

    let scope = search.search(&Params::new().with("active", "0")).unwrap();
    assert_eq!(scope, vec!["record", "child", "base"]);
}

#[test]
fn derived_definition_does_not_leak_into_base() {
    assert_eq!(BaseSearch::configuration().filters().len(), 1);
    assert_eq!(DerivedSearch::configuration().filters().len(), 2);

    let search = Search::from_model(BaseSearch { label: "parent" }).unwrap();
    let scope = search.search(&Params::new().with("active", true)).unwrap();
    assert_eq!(scope, vec!["record", "parent", "base"]);
}

#[test]
fn derived_definition_keeps_boolean_fields() {
    let derived = DerivedSearch {
        base: BaseSearch { label: "child" },
    };
    let search = Search::from_model(derived).unwrap();

    let normalized = search.normalize(&Params::new().with("active", "off"));
    assert_eq!(normalized.get("active"), Some(&Param::Bool(false)));
}
