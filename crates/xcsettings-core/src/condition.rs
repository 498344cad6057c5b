//! Condition parameters, condition sets and bindings.
//!
//! An assignment such as `OTHER_CFLAGS[sdk=iphone*][arch=arm64]` carries a
//! [`ConditionSet`]: one glob pattern per condition parameter. A scope binds
//! each parameter to one value (plus optional fallbacks) via [`Bindings`].
//!
//! Matching rules:
//! - an axis absent from the set, or the pattern `*`, matches anything,
//!   including an unbound parameter;
//! - any other pattern matches if at least one bound value matches it;
//! - an unbound parameter only matches wildcards.

use globset::{Glob, GlobMatcher};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::ConditionError;

/// A named axis an assignment can be conditioned on.
#[derive(Clone)]
pub struct ConditionParameter(Arc<str>);

impl ConditionParameter {
    pub(crate) fn new(name: Arc<str>) -> Self {
        ConditionParameter(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ConditionParameter {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ConditionParameter {}

impl Hash for ConditionParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for ConditionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConditionParameter({})", self.0)
    }
}

impl fmt::Display for ConditionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Any,
    Exact(String),
    Glob(GlobMatcher),
}

impl Matcher {
    fn is_match(&self, value: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::Exact(text) => text == value,
            Matcher::Glob(glob) => glob.is_match(value),
        }
    }
}

fn has_glob_syntax(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{', '\\'])
}

/// One `[parameter=pattern]` clause.
#[derive(Debug, Clone)]
pub struct Condition {
    parameter: ConditionParameter,
    pattern: String,
    matcher: Matcher,
}

impl Condition {
    pub fn new(parameter: &ConditionParameter, pattern: &str) -> Result<Self, ConditionError> {
        let matcher = if pattern == "*" {
            Matcher::Any
        } else if !has_glob_syntax(pattern) {
            Matcher::Exact(pattern.to_string())
        } else {
            let glob = Glob::new(pattern).map_err(|source| ConditionError::InvalidPattern {
                parameter: parameter.name().to_string(),
                pattern: pattern.to_string(),
                source,
            })?;
            Matcher::Glob(glob.compile_matcher())
        };
        Ok(Condition {
            parameter: parameter.clone(),
            pattern: pattern.to_string(),
            matcher,
        })
    }

    pub fn parameter(&self) -> &ConditionParameter {
        &self.parameter
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.matcher, Matcher::Any)
    }

    /// Test against the values bound for this condition's parameter.
    pub fn matches(&self, values: Option<&[String]>) -> bool {
        if self.is_wildcard() {
            return true;
        }
        match values {
            Some(values) => values.iter().any(|v| self.matcher.is_match(v)),
            None => false,
        }
    }
}

/// The conditions of one assignment; at most one clause per parameter.
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
}

impl ConditionSet {
    /// The unconditional set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, parameter: &ConditionParameter, pattern: &str) -> Result<Self, ConditionError> {
        self.insert(Condition::new(parameter, pattern)?);
        Ok(self)
    }

    /// Add a clause, replacing any existing clause for the same parameter.
    pub fn insert(&mut self, condition: Condition) {
        match self
            .conditions
            .binary_search_by(|c| c.parameter.name().cmp(condition.parameter.name()))
        {
            Ok(i) => self.conditions[i] = condition,
            Err(i) => self.conditions.insert(i, condition),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    /// The number of non-wildcard clauses.
    pub fn specificity(&self) -> usize {
        self.conditions.iter().filter(|c| !c.is_wildcard()).count()
    }

    pub fn matches(&self, bindings: &Bindings) -> bool {
        self.conditions
            .iter()
            .all(|c| c.matches(bindings.get(&c.parameter)))
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.conditions {
            write!(f, "[{}={}]", c.parameter, c.pattern)?;
        }
        Ok(())
    }
}

/// The concrete condition values of a build context.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<ConditionParameter, Vec<String>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter to a single value.
    pub fn bind(mut self, parameter: &ConditionParameter, value: impl Into<String>) -> Self {
        self.set(parameter, vec![value.into()]);
        self
    }

    /// Bind a parameter to a preferred value followed by fallbacks. A
    /// condition matches if any of them matches.
    pub fn bind_with_fallbacks<I, S>(mut self, parameter: &ConditionParameter, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(parameter, values.into_iter().map(Into::into).collect());
        self
    }

    /// Replace (or, with an empty list, remove) a binding in place.
    pub fn set(&mut self, parameter: &ConditionParameter, values: Vec<String>) {
        if values.is_empty() {
            self.values.remove(parameter);
        } else {
            self.values.insert(parameter.clone(), values);
        }
    }

    pub fn get(&self, parameter: &ConditionParameter) -> Option<&[String]> {
        self.values.get(parameter).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
