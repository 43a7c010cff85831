use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LocatorError, LocatorResult};

// ============================================================================
// Criterion values
// ============================================================================

/// Expected value of one criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl CriterionValue {
    /// Parse a command-line `value`: booleans and integers are typed, the rest is text.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => CriterionValue::Flag(true),
            "false" => CriterionValue::Flag(false),
            _ => match raw.parse::<i64>() {
                Ok(n) => CriterionValue::Number(n),
                Err(_) => CriterionValue::Text(raw.to_string()),
            },
        }
    }

    /// Textual form compared against dump attributes.
    pub fn as_attr_string(&self) -> String {
        match self {
            CriterionValue::Flag(b) => b.to_string(),
            CriterionValue::Number(n) => n.to_string(),
            CriterionValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for CriterionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_attr_string())
    }
}

impl From<bool> for CriterionValue {
    fn from(value: bool) -> Self {
        CriterionValue::Flag(value)
    }
}

impl From<i64> for CriterionValue {
    fn from(value: i64) -> Self {
        CriterionValue::Number(value)
    }
}

impl From<i32> for CriterionValue {
    fn from(value: i32) -> Self {
        CriterionValue::Number(value as i64)
    }
}

impl From<&str> for CriterionValue {
    fn from(value: &str) -> Self {
        CriterionValue::Text(value.to_string())
    }
}

impl From<String> for CriterionValue {
    fn from(value: String) -> Self {
        CriterionValue::Text(value)
    }
}

/// Query-attribute name to expected value. Ordered so that locators built
/// from criteria render deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, CriterionValue>);

impl Criteria {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Single-attribute criteria, as used for uniqueness checks.
    pub fn single(name: &str, value: impl Into<CriterionValue>) -> Self {
        Self::new().with(name, value)
    }

    pub fn with(mut self, name: &str, value: impl Into<CriterionValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&CriterionValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CriterionValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `key=value` pairs as given on the command line.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Self, String> {
        let mut criteria = Criteria::new();
        for pair in pairs {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty criterion name in '{}'", pair));
            }
            let value = match lookup_attribute(key) {
                Ok(attribute) => attribute.parse_value(value),
                // Unknown names are reported when the criteria are used
                Err(_) => CriterionValue::parse(value),
            };
            criteria = criteria.with(key, value);
        }
        Ok(criteria)
    }
}

impl<K: Into<String>, V: Into<CriterionValue>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============================================================================
// Query attribute table
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Equals,
    Contains,
    StartsWith,
    /// Regex search anywhere in the value, not a full match
    Matches,
}

/// Kind of value a selector field carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Number,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryAttribute {
    /// Name used in criteria and locators
    pub name: &'static str,
    /// Attribute name in the XML dump
    pub dump_attr: &'static str,
    pub match_kind: MatchKind,
    /// Bit in the uiautomator selector mask
    pub mask: u32,
    pub field_kind: FieldKind,
}

const fn attr(
    name: &'static str,
    dump_attr: &'static str,
    match_kind: MatchKind,
    mask: u32,
    field_kind: FieldKind,
) -> QueryAttribute {
    QueryAttribute {
        name,
        dump_attr,
        match_kind,
        mask,
        field_kind,
    }
}

use FieldKind::{Flag, Number, Text};
use MatchKind::{Contains, Equals, Matches, StartsWith};

/// Every criterion either backend can answer.
pub const QUERY_ATTRIBUTES: &[QueryAttribute] = &[
    attr("text", "text", Equals, 0x01, Text),
    attr("textContains", "text", Contains, 0x02, Text),
    attr("textMatches", "text", Matches, 0x04, Text),
    attr("textStartsWith", "text", StartsWith, 0x08, Text),
    attr("className", "class", Equals, 0x10, Text),
    attr("classNameMatches", "class", Matches, 0x20, Text),
    attr("description", "content-desc", Equals, 0x40, Text),
    attr("descriptionContains", "content-desc", Contains, 0x80, Text),
    attr("descriptionMatches", "content-desc", Matches, 0x0100, Text),
    attr("descriptionStartsWith", "content-desc", StartsWith, 0x0200, Text),
    attr("checkable", "checkable", Equals, 0x0400, Flag),
    attr("checked", "checked", Equals, 0x0800, Flag),
    attr("clickable", "clickable", Equals, 0x1000, Flag),
    attr("longClickable", "long-clickable", Equals, 0x2000, Flag),
    attr("scrollable", "scrollable", Equals, 0x4000, Flag),
    attr("enabled", "enabled", Equals, 0x8000, Flag),
    attr("focusable", "focusable", Equals, 0x01_0000, Flag),
    attr("focused", "focused", Equals, 0x02_0000, Flag),
    attr("selected", "selected", Equals, 0x04_0000, Flag),
    attr("packageName", "package", Equals, 0x08_0000, Text),
    attr("packageNameMatches", "package", Matches, 0x10_0000, Text),
    attr("resourceId", "resource-id", Equals, 0x20_0000, Text),
    attr("resourceIdMatches", "resource-id", Matches, 0x40_0000, Text),
    attr("index", "index", Equals, 0x80_0000, Number),
];

impl QueryAttribute {
    /// Type a command-line value by what this attribute holds. Text stays
    /// verbatim, so `007` or `+1` are not read as numbers.
    pub fn parse_value(&self, raw: &str) -> CriterionValue {
        match self.field_kind {
            FieldKind::Text => CriterionValue::Text(raw.to_string()),
            FieldKind::Flag | FieldKind::Number => CriterionValue::parse(raw),
        }
    }

    /// Check `value` against the kind this attribute holds. Flags accept
    /// `"true"`/`"false"` text and numbers accept decimal text; anything
    /// compares as text.
    pub fn typed_value(&self, value: &CriterionValue) -> LocatorResult<CriterionValue> {
        let invalid = |expected| LocatorError::InvalidCriterionValue {
            criterion: self.name.to_string(),
            expected,
        };
        match (self.field_kind, value) {
            (FieldKind::Flag, CriterionValue::Flag(b)) => Ok(CriterionValue::Flag(*b)),
            (FieldKind::Flag, CriterionValue::Text(s)) => match s.as_str() {
                "true" => Ok(CriterionValue::Flag(true)),
                "false" => Ok(CriterionValue::Flag(false)),
                _ => Err(invalid("a boolean")),
            },
            (FieldKind::Flag, CriterionValue::Number(_)) => Err(invalid("a boolean")),
            (FieldKind::Number, CriterionValue::Number(n)) => Ok(CriterionValue::Number(*n)),
            (FieldKind::Number, CriterionValue::Text(s)) => s
                .parse::<i64>()
                .map(CriterionValue::Number)
                .map_err(|_| invalid("an integer")),
            (FieldKind::Number, CriterionValue::Flag(_)) => Err(invalid("an integer")),
            (FieldKind::Text, v) => Ok(CriterionValue::Text(v.as_attr_string())),
        }
    }
}

pub fn lookup_attribute(name: &str) -> LocatorResult<&'static QueryAttribute> {
    QUERY_ATTRIBUTES
        .iter()
        .find(|a| a.name == name)
        .ok_or_else(|| LocatorError::UnsupportedCriterion(name.to_string()))
}

// ============================================================================
// Compiled matchers
// ============================================================================

#[derive(Debug)]
enum Comparison {
    Equals(String),
    Contains(String),
    StartsWith(String),
    Matches(Regex),
}

/// One criterion, resolved against the table and ready to test attribute strings.
#[derive(Debug)]
pub struct Matcher {
    pub attribute: &'static QueryAttribute,
    comparison: Comparison,
}

impl Matcher {
    pub fn new(name: &str, value: &CriterionValue) -> LocatorResult<Self> {
        let attribute = lookup_attribute(name)?;
        let expected = attribute.typed_value(value)?.as_attr_string();
        let comparison = match attribute.match_kind {
            MatchKind::Equals => Comparison::Equals(expected),
            MatchKind::Contains => Comparison::Contains(expected),
            MatchKind::StartsWith => Comparison::StartsWith(expected),
            MatchKind::Matches => {
                let re = Regex::new(&expected).map_err(|e| LocatorError::InvalidPattern {
                    criterion: name.to_string(),
                    source: e,
                })?;
                Comparison::Matches(re)
            }
        };
        Ok(Self {
            attribute,
            comparison,
        })
    }

    pub fn is_match(&self, actual: &str) -> bool {
        match &self.comparison {
            Comparison::Equals(expected) => actual == expected,
            Comparison::Contains(expected) => actual.contains(expected.as_str()),
            Comparison::StartsWith(expected) => actual.starts_with(expected.as_str()),
            Comparison::Matches(re) => re.is_match(actual),
        }
    }
}

/// Compile every criterion, failing on the first unknown name or bad pattern.
pub fn compile(criteria: &Criteria) -> LocatorResult<Vec<Matcher>> {
    criteria
        .iter()
        .map(|(name, value)| Matcher::new(name, value))
        .collect()
}
