//! Match-expression predicates evaluated against the reverse index.

use regex::Regex;

/// A single label (or name) comparison operator.
#[derive(Debug, Clone)]
pub enum Operator {
    /// Value equals the operand exactly.
    Eql(String),
    /// Value differs from the operand.
    Neq(String),
    /// Value matches the operand as a regex.
    EqlRegex(Regex),
    /// Value does not match the operand as a regex.
    NeqRegex(Regex),
    /// The label is present, regardless of value.
    Exists,
    /// The label is absent.
    Nexists,
}

/// A predicate on a single label name (or, within the name-predicate
/// group, the metric name itself).
#[derive(Debug, Clone)]
pub struct Predicate {
    /// Label name this predicate constrains (ignored for the name group,
    /// where it always refers to the metric name).
    pub label: String,
    /// Comparison to apply.
    pub op: Operator,
}

impl Predicate {
    /// Builds an `EQL` predicate.
    #[must_use]
    pub fn eql(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            op: Operator::Eql(value.into()),
        }
    }

    /// Builds a `NEQ` predicate.
    #[must_use]
    pub fn neq(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            op: Operator::Neq(value.into()),
        }
    }

    /// Builds an `EQL_REGEX` predicate.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` fails to compile.
    pub fn eql_regex(label: impl Into<String>, pattern: &str) -> crate::error::Result<Self> {
        Ok(Self {
            label: label.into(),
            op: Operator::EqlRegex(Regex::new(pattern)?),
        })
    }

    /// Builds a `NEQ_REGEX` predicate.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` fails to compile.
    pub fn neq_regex(label: impl Into<String>, pattern: &str) -> crate::error::Result<Self> {
        Ok(Self {
            label: label.into(),
            op: Operator::NeqRegex(Regex::new(pattern)?),
        })
    }

    /// Builds an `EXISTS` predicate.
    #[must_use]
    pub fn exists(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            op: Operator::Exists,
        }
    }

    /// Builds a `NEXISTS` predicate.
    #[must_use]
    pub fn nexists(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            op: Operator::Nexists,
        }
    }
}

/// A compiled match expression: a name-predicate group and a
/// label-predicate group, both implicitly AND-ed together.
#[derive(Debug, Clone, Default)]
pub struct MetricMatch {
    /// Predicates over the metric name.
    pub name: Vec<Predicate>,
    /// Predicates over labels.
    pub labels: Vec<Predicate>,
}

impl MetricMatch {
    /// True if this expression is servable by the reverse index's fast
    /// path: exactly one name predicate, which is an `EQL`, and no label
    /// predicates.
    #[must_use]
    pub fn is_name_eql_fast_path(&self) -> Option<&str> {
        if self.labels.is_empty() && self.name.len() == 1 {
            if let Operator::Eql(v) = &self.name[0].op {
                return Some(v.as_str());
            }
        }
        None
    }
}
