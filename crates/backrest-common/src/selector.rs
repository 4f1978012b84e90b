//! Structured Kubernetes label selectors
//!
//! Selectors are built as a list of requirements and rendered to the string
//! form the API server accepts. Caller-supplied selector strings, equality
//! and set-based alike, are parsed into the same structure so that malformed
//! input is rejected before it reaches the API server.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Operator of a single selector requirement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorOperator {
    /// Label must be present with the given value
    Equals,
    /// Label must be absent or have a different value
    NotEquals,
    /// Label must be present with one of the given values
    In,
    /// Label must be absent or have none of the given values
    NotIn,
    /// Label must be present (value ignored)
    Exists,
    /// Label must be absent
    DoesNotExist,
}

/// A single `key <op> values` requirement
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    /// Label key
    pub key: String,
    /// Relationship between the label and `values`
    pub operator: SelectorOperator,
    /// Values compared against: one for the equality operators, one or more
    /// for `In` and `NotIn`, none for `Exists` and `DoesNotExist`
    pub values: Vec<String>,
}

impl Requirement {
    /// Check if a label set satisfies this requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        let actual = labels.get(&self.key);
        let listed = || actual.is_some_and(|v| self.values.contains(v));
        match self.operator {
            SelectorOperator::Equals | SelectorOperator::In => listed(),
            SelectorOperator::NotEquals | SelectorOperator::NotIn => !listed(),
            SelectorOperator::Exists => actual.is_some(),
            SelectorOperator::DoesNotExist => actual.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = &self.key;
        let values = self.values.join(",");
        match self.operator {
            SelectorOperator::Equals => write!(f, "{}={}", key, values),
            SelectorOperator::NotEquals => write!(f, "{}!={}", key, values),
            SelectorOperator::In => write!(f, "{} in ({})", key, values),
            SelectorOperator::NotIn => write!(f, "{} notin ({})", key, values),
            SelectorOperator::Exists => write!(f, "{}", key),
            SelectorOperator::DoesNotExist => write!(f, "!{}", key),
        }
    }
}

/// An ordered conjunction of label requirements
///
/// An empty selector matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    /// Create an empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key=value`
    pub fn eq(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, SelectorOperator::Equals, vec![value.into()])
    }

    /// Require `key!=value`
    pub fn ne(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, SelectorOperator::NotEquals, vec![value.into()])
    }

    /// Require `key in (values)`
    pub fn in_set<I, V>(self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with(key, SelectorOperator::In, values)
    }

    /// Require `key notin (values)`
    pub fn not_in<I, V>(self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with(key, SelectorOperator::NotIn, values)
    }

    /// Require the label to be present
    pub fn exists(self, key: impl Into<String>) -> Self {
        self.with(key, SelectorOperator::Exists, Vec::new())
    }

    /// Require the label to be absent
    pub fn does_not_exist(self, key: impl Into<String>) -> Self {
        self.with(key, SelectorOperator::DoesNotExist, Vec::new())
    }

    fn with(
        mut self,
        key: impl Into<String>,
        operator: SelectorOperator,
        values: Vec<String>,
    ) -> Self {
        self.requirements.push(Requirement {
            key: key.into(),
            operator,
            values,
        });
        self
    }

    /// The requirements in the order they were added
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// True when the selector has no requirements and matches everything
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Check if a label set satisfies every requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(labels))
    }

    /// Parse the Kubernetes selector syntax
    ///
    /// Accepts `k=v`, `k==v`, `k!=v`, `k in (a,b)`, `k notin (a,b)`, `k` and
    /// `!k`, comma separated. Commas inside a value set do not split terms.
    /// An empty or all-whitespace input yields the empty selector.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let mut selector = Self::new();
        if input.trim().is_empty() {
            return Ok(selector);
        }

        for term in split_terms(input) {
            let term = term.trim();
            if term.is_empty() {
                return Err(Error::invalid_selector(input, "empty requirement"));
            }
            selector.requirements.push(parse_term(input, term)?);
        }

        Ok(selector)
    }
}

/// Split on commas that are not inside a parenthesised value set
fn split_terms(input: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                terms.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(&input[start..]);
    terms
}

fn parse_term(input: &str, term: &str) -> Result<Requirement, Error> {
    if let Some(open) = term.find('(') {
        return parse_set_term(input, term, open);
    }

    let (key, operator, value) = if let Some(key) = term.strip_prefix('!') {
        (key, SelectorOperator::DoesNotExist, None)
    } else if let Some((key, value)) = term.split_once("!=") {
        (key, SelectorOperator::NotEquals, Some(value))
    } else if let Some((key, value)) = term.split_once("==") {
        (key, SelectorOperator::Equals, Some(value))
    } else if let Some((key, value)) = term.split_once('=') {
        (key, SelectorOperator::Equals, Some(value))
    } else {
        (term, SelectorOperator::Exists, None)
    };

    let key = key.trim();
    validate_key(input, key)?;
    let values = match value {
        Some(value) => {
            let value = value.trim();
            validate_value(input, value)?;
            vec![value.to_string()]
        }
        None => Vec::new(),
    };
    Ok(Requirement {
        key: key.to_string(),
        operator,
        values,
    })
}

/// `key in (a,b)` or `key notin (a,b)`; `open` is the index of `(`
fn parse_set_term(input: &str, term: &str, open: usize) -> Result<Requirement, Error> {
    let Some(inner) = term[open + 1..].strip_suffix(')') else {
        return Err(Error::invalid_selector(input, "unterminated value set"));
    };

    let head = term[..open].trim_end();
    let (key, operator) = if let Some(key) = head.strip_suffix("notin") {
        (key, SelectorOperator::NotIn)
    } else if let Some(key) = head.strip_suffix("in") {
        (key, SelectorOperator::In)
    } else {
        return Err(Error::invalid_selector(
            input,
            format!("expected 'in' or 'notin' before value set in {:?}", term),
        ));
    };
    if !key.ends_with(char::is_whitespace) {
        return Err(Error::invalid_selector(
            input,
            format!("expected whitespace before operator in {:?}", term),
        ));
    }
    let key = key.trim();
    validate_key(input, key)?;

    if inner.trim().is_empty() {
        return Err(Error::invalid_selector(input, "empty value set"));
    }
    let mut values = Vec::new();
    for value in inner.split(',') {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::invalid_selector(input, "empty value in set"));
        }
        validate_value(input, value)?;
        values.push(value.to_string());
    }

    Ok(Requirement {
        key: key.to_string(),
        operator,
        values,
    })
}

fn validate_key(input: &str, key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::invalid_selector(input, "empty label key"));
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')))
    {
        return Err(Error::invalid_selector(
            input,
            format!("invalid character {:?} in key {:?}", c, key),
        ));
    }
    Ok(())
}

fn validate_value(input: &str, value: &str) -> Result<(), Error> {
    if let Some(c) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(Error::invalid_selector(
            input,
            format!("invalid character {:?} in value {:?}", c, value),
        ));
    }
    Ok(())
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, requirement) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", requirement)?;
        }
        Ok(())
    }
}

impl FromStr for LabelSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
