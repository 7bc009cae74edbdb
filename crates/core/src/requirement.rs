//! Field-level requirements
//!
//! A [`Requirement`] is an immutable predicate over a transformed value.
//! Requirements compose: a `Vec<Requirement>` converts into an implicit AND,
//! [`Requirement::either`] / [`Requirement::any_of`] build an OR, and
//! [`Requirement::not`] negates the AND of its arguments.
//!
//! ```rust,ignore
//! use objmap_core::Requirement;
//!
//! // present and within 0..=150
//! let age = Requirement::from(vec![
//!     Requirement::exists(),
//!     Requirement::greater_than_or_equal_to(0),
//!     Requirement::less_than_or_equal_to(150),
//! ]);
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::value::FieldValue;

/// Custom predicate; receives `None` when the external key was absent
pub type Predicate = Arc<dyn Fn(Option<&FieldValue>) -> bool + Send + Sync>;

/// Numeric comparison against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    Equal,
    GreaterThanOrEqual,
    GreaterThan,
}

impl Comparison {
    fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::LessThan => value < threshold,
            Comparison::LessThanOrEqual => value <= threshold,
            Comparison::Equal => value == threshold,
            Comparison::GreaterThanOrEqual => value >= threshold,
            Comparison::GreaterThan => value > threshold,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::LessThan => write!(f, "<"),
            Comparison::LessThanOrEqual => write!(f, "<="),
            Comparison::Equal => write!(f, "=="),
            Comparison::GreaterThanOrEqual => write!(f, ">="),
            Comparison::GreaterThan => write!(f, ">"),
        }
    }
}

/// Predicate a transformed value must satisfy before assignment
#[derive(Clone)]
pub enum Requirement {
    /// Key present and value not `null`
    Exists,
    /// Numeric comparison; non-numeric values fail
    Compare { op: Comparison, threshold: f64 },
    /// Arbitrary predicate
    Passes(Predicate),
    /// Passes if any member passes
    Any(Vec<Requirement>),
    /// Passes unless every member passes
    Not(Vec<Requirement>),
    /// Passes if every member passes
    All(Vec<Requirement>),
}

impl Requirement {
    pub fn exists() -> Self {
        Requirement::Exists
    }

    pub fn passes<F>(predicate: F) -> Self
    where
        F: Fn(Option<&FieldValue>) -> bool + Send + Sync + 'static,
    {
        Requirement::Passes(Arc::new(predicate))
    }

    /// String values must match `pattern`; other values fail
    pub fn matches(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self::passes(move |value| {
            value
                .and_then(FieldValue::as_str)
                .is_some_and(|s| regex.is_match(s))
        }))
    }

    pub fn compare(op: Comparison, threshold: impl Into<f64>) -> Self {
        Requirement::Compare {
            op,
            threshold: threshold.into(),
        }
    }

    pub fn greater_than(threshold: impl Into<f64>) -> Self {
        Self::compare(Comparison::GreaterThan, threshold)
    }

    pub fn greater_than_or_equal_to(threshold: impl Into<f64>) -> Self {
        Self::compare(Comparison::GreaterThanOrEqual, threshold)
    }

    pub fn equal_to(threshold: impl Into<f64>) -> Self {
        Self::compare(Comparison::Equal, threshold)
    }

    pub fn less_than(threshold: impl Into<f64>) -> Self {
        Self::compare(Comparison::LessThan, threshold)
    }

    pub fn less_than_or_equal_to(threshold: impl Into<f64>) -> Self {
        Self::compare(Comparison::LessThanOrEqual, threshold)
    }

    /// Either or both requirement groups must pass
    pub fn either(first: impl Into<Requirement>, second: impl Into<Requirement>) -> Self {
        Self::any_of([first.into(), second.into()])
    }

    /// At least one of the requirement groups must pass
    ///
    /// Nested OR-combinations are flattened; AND groups are kept intact.
    pub fn any_of(requirements: impl IntoIterator<Item = Requirement>) -> Self {
        let mut flat = Vec::new();
        for requirement in requirements {
            match requirement {
                Requirement::Any(members) => flat.extend(members),
                other => flat.push(other),
            }
        }
        Requirement::Any(flat)
    }

    /// Every requirement must pass
    pub fn all_of(requirements: impl IntoIterator<Item = Requirement>) -> Self {
        Requirement::All(requirements.into_iter().collect())
    }

    /// Negates the AND of `requirements`
    pub fn not(requirements: impl Into<Requirement>) -> Self {
        match requirements.into() {
            Requirement::All(members) => Requirement::Not(members),
            single => Requirement::Not(vec![single]),
        }
    }

    /// Evaluate against a value; `None` means the key was absent
    pub fn evaluate(&self, value: Option<&FieldValue>) -> bool {
        match self {
            Requirement::Exists => value.is_some_and(|v| !v.is_null()),
            Requirement::Compare { op, threshold } => value
                .and_then(FieldValue::as_f64)
                .is_some_and(|v| op.holds(v, *threshold)),
            Requirement::Passes(predicate) => predicate(value),
            Requirement::Any(members) => members.iter().any(|r| r.evaluate(value)),
            Requirement::Not(members) => !members.iter().all(|r| r.evaluate(value)),
            Requirement::All(members) => members.iter().all(|r| r.evaluate(value)),
        }
    }
}

impl From<Vec<Requirement>> for Requirement {
    fn from(requirements: Vec<Requirement>) -> Self {
        Requirement::All(requirements)
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Exists => write!(f, "exists"),
            Requirement::Compare { op, threshold } => write!(f, "{} {}", op, threshold),
            Requirement::Passes(_) => write!(f, "passes(<predicate>)"),
            Requirement::Any(members) => f.debug_tuple("any").field(members).finish(),
            Requirement::Not(members) => f.debug_tuple("not").field(members).finish(),
            Requirement::All(members) => f.debug_tuple("all").field(members).finish(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> FieldValue {
        FieldValue::Integer(v)
    }

    #[test]
    fn test_exists() {
        let r = Requirement::exists();
        assert!(!r.evaluate(None));
        assert!(!r.evaluate(Some(&FieldValue::Null)));
        assert!(r.evaluate(Some(&FieldValue::from(""))));
        assert!(r.evaluate(Some(&FieldValue::List(vec![]))));
    }

    #[test]
    fn test_compare_family() {
        assert!(Requirement::greater_than(3).evaluate(Some(&int(4))));
        assert!(!Requirement::greater_than(3).evaluate(Some(&int(3))));
        assert!(Requirement::greater_than_or_equal_to(3).evaluate(Some(&int(3))));
        assert!(Requirement::equal_to(2.5).evaluate(Some(&FieldValue::Float(2.5))));
        assert!(Requirement::less_than(0).evaluate(Some(&int(-1))));
        assert!(Requirement::less_than_or_equal_to(0).evaluate(Some(&int(0))));
    }

    #[test]
    fn test_compare_rejects_non_numeric() {
        let r = Requirement::greater_than(0);
        assert!(!r.evaluate(Some(&FieldValue::from("5"))));
        assert!(!r.evaluate(Some(&FieldValue::Bool(true))));
        assert!(!r.evaluate(Some(&FieldValue::Null)));
        assert!(!r.evaluate(None));
    }

    #[test]
    fn test_list_is_implicit_and() {
        let r: Requirement = vec![Requirement::greater_than(0), Requirement::less_than(10)].into();
        assert!(r.evaluate(Some(&int(5))));
        assert!(!r.evaluate(Some(&int(10))));
    }

    #[test]
    fn test_not_negates_conjunction() {
        let r1 = Requirement::greater_than(0);
        let r2 = Requirement::less_than(10);
        let not = Requirement::not(vec![r1.clone(), r2.clone()]);

        for v in [-5, 0, 5, 10, 15] {
            let value = int(v);
            let expected = !(r1.evaluate(Some(&value)) && r2.evaluate(Some(&value)));
            assert_eq!(not.evaluate(Some(&value)), expected, "value {}", v);
        }
    }

    #[test]
    fn test_either_with_groups() {
        // (> 0 and < 10) or (== 100)
        let a: Requirement = vec![Requirement::greater_than(0), Requirement::less_than(10)].into();
        let b = Requirement::equal_to(100);
        let either = Requirement::either(a, b);

        assert!(either.evaluate(Some(&int(5))));
        assert!(either.evaluate(Some(&int(100))));
        assert!(!either.evaluate(Some(&int(50))));
    }

    #[test]
    fn test_any_of_flattens_nested_or() {
        let inner = Requirement::either(Requirement::equal_to(1), Requirement::equal_to(2));
        let outer = Requirement::any_of([inner, Requirement::equal_to(3)]);

        match &outer {
            Requirement::Any(members) => assert_eq!(members.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
        assert!(outer.evaluate(Some(&int(2))));
        assert!(!outer.evaluate(Some(&int(4))));
    }

    #[test]
    fn test_custom_and_regex() {
        let even = Requirement::passes(|v| v.and_then(FieldValue::as_i64).is_some_and(|i| i % 2 == 0));
        assert!(even.evaluate(Some(&int(4))));
        assert!(!even.evaluate(Some(&int(3))));

        let code = Requirement::matches(r"^[A-Z]{3}$").unwrap();
        assert!(code.evaluate(Some(&FieldValue::from("EUR"))));
        assert!(!code.evaluate(Some(&FieldValue::from("eur"))));
        assert!(!code.evaluate(None));
        assert!(Requirement::matches("(").is_err());
    }
}
