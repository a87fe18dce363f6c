use std::fmt;
use std::sync::Arc;

use binviz_common::attribute::Attribute;
use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;

/// Relational operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    StartsWith,
    EndsWith,
    Contains,
}

impl Operator {
    /// Method name of string operators, rendered as a null guarded call
    pub fn method(&self) -> Option<&'static str> {
        match self {
            Operator::StartsWith => Some("StartsWith"),
            Operator::EndsWith => Some("EndsWith"),
            Operator::Contains => Some("Contains"),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::StartsWith | Operator::EndsWith | Operator::Contains => "",
        }
    }
}

/// Literal side of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    /// A nested comparison, compared by its own equality
    Comparison(Box<ValueComparison>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Number(v) => write!(f, "{v}"),
            FilterValue::Text(s) => write!(f, "\"{}\"", escape_string(s)),
            FilterValue::Boolean(b) => write!(f, "{b}"),
            FilterValue::DateTime(dt) => {
                write!(f, "\"{}\"", dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            FilterValue::Comparison(c) => write!(f, "({c})"),
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// `attribute operator value`
#[derive(Debug, Clone)]
pub struct ValueComparison {
    pub attribute: Arc<Attribute>,
    pub operator: Operator,
    pub value: FilterValue,
}

impl ValueComparison {
    pub fn new(attribute: Arc<Attribute>, operator: Operator, value: FilterValue) -> Self {
        Self {
            attribute,
            operator,
            value,
        }
    }
}

impl PartialEq for ValueComparison {
    fn eq(&self, other: &Self) -> bool {
        self.attribute.id() == other.attribute.id()
            && self.operator == other.operator
            && self.value == other.value
    }
}

impl fmt::Display for ValueComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.attribute.expression_name();
        match self.operator.method() {
            Some(method) => write!(f, "{name} != null && {name}.{method}({})", self.value),
            None => write!(f, "{name} {} {}", self.operator.symbol(), self.value),
        }
    }
}

/// Conjunction of predicates. Equality compares predicates pairwise in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterModel {
    pub comparisons: Vec<ValueComparison>,
}

impl FilterModel {
    pub fn new(comparisons: Vec<ValueComparison>) -> Self {
        Self { comparisons }
    }

    pub fn push(&mut self, comparison: ValueComparison) {
        self.comparisons.push(comparison);
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn render(&self) -> String {
        self.comparisons.iter().join(" && ")
    }
}
