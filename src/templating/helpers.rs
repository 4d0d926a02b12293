//! Helper namespace shared by every template of a [`View`](super::View).
//!
//! A [`Helpers`] set is bound when the view is constructed and never changes
//! afterwards. Each generation of compiled templates is built on a Tera instance
//! that already carries these helpers, so a template can never observe helpers
//! from a different generation than its own.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use tera::Value;
//! use viewreg::templating::{Helpers, View};
//!
//! let helpers = Helpers::new()
//!     .filter("shout", |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
//!         let text = value.as_str().unwrap_or_default();
//!         Ok(Value::String(format!("{}!", text.to_uppercase())))
//!     })
//!     .function("site_name", |_: &HashMap<String, Value>| -> tera::Result<Value> {
//!         Ok(Value::from("viewreg"))
//!     });
//!
//! let view = View::new(helpers);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tera::{Tera, Value};

/// Named Tera functions, filters and testers available to all templates.
#[derive(Clone, Default)]
pub struct Helpers {
    functions: BTreeMap<String, Arc<dyn tera::Function>>,
    filters: BTreeMap<String, Arc<dyn tera::Filter>>,
    testers: BTreeMap<String, Arc<dyn tera::Test>>,
}

impl Helpers {
    /// Create an empty helper namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global function, callable as `{{ name(arg=value) }}`.
    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: tera::Function + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Add a filter, usable as `{{ value | name }}`.
    #[must_use]
    pub fn filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: tera::Filter + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Add a tester, usable as `{% if value is name %}`.
    #[must_use]
    pub fn tester<T>(mut self, name: impl Into<String>, tester: T) -> Self
    where
        T: tera::Test + 'static,
    {
        self.testers.insert(name.into(), Arc::new(tester));
        self
    }

    /// Whether no helpers are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.filters.is_empty() && self.testers.is_empty()
    }

    /// All helper names, sorted, across functions, filters and testers.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .functions
            .keys()
            .chain(self.filters.keys())
            .chain(self.testers.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Register every helper on a Tera instance.
    pub(crate) fn register(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            tera.register_function(name, SharedFunction(Arc::clone(function)));
        }
        for (name, filter) in &self.filters {
            tera.register_filter(name, SharedFilter(Arc::clone(filter)));
        }
        for (name, tester) in &self.testers {
            tera.register_tester(name, SharedTest(Arc::clone(tester)));
        }
    }
}

impl fmt::Debug for Helpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helpers")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("testers", &self.testers.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct SharedFunction(Arc<dyn tera::Function>);

impl tera::Function for SharedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

struct SharedFilter(Arc<dyn tera::Filter>);

impl tera::Filter for SharedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.filter(value, args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

struct SharedTest(Arc<dyn tera::Test>);

impl tera::Test for SharedTest {
    fn test(&self, value: Option<&Value>, args: &[Value]) -> tera::Result<bool> {
        self.0.test(value, args)
    }
}
