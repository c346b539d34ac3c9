//! Normalization of grouping, filter and variable specifications.
//!
//! Callers describe the table they want with a [`GroupingSpec`] (which run
//! attributes become columns, optionally restricted to some values) and a
//! [`VariableSpec`] (which vectors to read). [`normalize`] turns both into the
//! canonical [`Grouping`] and [`Variables`] used by the query builder.
//!
//! The same shapes can be given as JSON (see the `TryFrom<serde_json::Value>`
//! impls), which is where malformed input is rejected.

use serde_json::Value;

use crate::error::{OppsqlError, Result};
use crate::value::Scalar;

const BY_SHAPES: &str = "By must be string, list of strings or dictionary";
const FILTER_SHAPES: &str = "Filter must be string, int, float or bool, a list of these or None";
const VARIABLE_SHAPES: &str = "Variable must be string or list of strings";

/// Allowed values for one grouping attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// Any value, and the column is always kept.
    Unconstrained,
    /// Exactly one value. The column is constant and therefore elided.
    One(Scalar),
    /// Any of the listed values, in this category order.
    Many(Vec<Scalar>),
}

impl FilterSpec {
    pub fn one(value: impl Into<Scalar>) -> Self {
        FilterSpec::One(value.into())
    }
    pub fn many<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        FilterSpec::Many(values.into_iter().map(Into::into).collect())
    }
    fn into_values(self) -> Vec<Scalar> {
        match self {
            FilterSpec::Unconstrained => Vec::new(),
            FilterSpec::One(value) => vec![value],
            FilterSpec::Many(values) => values,
        }
    }
}

/// The attributes that become columns of the result table.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupingSpec {
    Name(String),
    Names(Vec<String>),
    Filtered(Vec<(String, FilterSpec)>),
}

impl GroupingSpec {
    pub fn filtered<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, FilterSpec)>,
        K: Into<String>,
    {
        GroupingSpec::Filtered(entries.into_iter().map(|(k, f)| (k.into(), f)).collect())
    }
}

impl From<&str> for GroupingSpec {
    fn from(name: &str) -> Self { GroupingSpec::Name(name.to_string()) }
}
impl From<String> for GroupingSpec {
    fn from(name: String) -> Self { GroupingSpec::Name(name) }
}
impl From<Vec<&str>> for GroupingSpec {
    fn from(names: Vec<&str>) -> Self {
        GroupingSpec::Names(names.into_iter().map(String::from).collect())
    }
}
impl From<Vec<String>> for GroupingSpec {
    fn from(names: Vec<String>) -> Self { GroupingSpec::Names(names) }
}

/// The vectors whose samples fill the value column.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableSpec {
    Name(String),
    Names(Vec<String>),
}

impl From<&str> for VariableSpec {
    fn from(name: &str) -> Self { VariableSpec::Name(name.to_string()) }
}
impl From<String> for VariableSpec {
    fn from(name: String) -> Self { VariableSpec::Name(name) }
}
impl From<Vec<&str>> for VariableSpec {
    fn from(names: Vec<&str>) -> Self {
        VariableSpec::Names(names.into_iter().map(String::from).collect())
    }
}
impl From<Vec<String>> for VariableSpec {
    fn from(names: Vec<String>) -> Self { VariableSpec::Names(names) }
}

fn scalar_from_json(value: &Value) -> Option<Scalar> {
    match value {
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        _ => None,
    }
}

impl TryFrom<Value> for FilterSpec {
    type Error = OppsqlError;
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(FilterSpec::Unconstrained),
            Value::Array(items) => items
                .iter()
                .map(|item| scalar_from_json(item).ok_or_else(|| OppsqlError::invalid(FILTER_SHAPES)))
                .collect::<Result<Vec<_>>>()
                .map(FilterSpec::Many),
            other => scalar_from_json(&other)
                .map(FilterSpec::One)
                .ok_or_else(|| OppsqlError::invalid(FILTER_SHAPES)),
        }
    }
}

impl TryFrom<Value> for GroupingSpec {
    type Error = OppsqlError;
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(GroupingSpec::Name(name)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    _ => Err(OppsqlError::invalid(BY_SHAPES)),
                })
                .collect::<Result<Vec<_>>>()
                .map(GroupingSpec::Names),
            // object keys keep their document order (serde_json "preserve_order")
            Value::Object(entries) => entries
                .into_iter()
                .map(|(name, filter)| Ok((name, FilterSpec::try_from(filter)?)))
                .collect::<Result<Vec<_>>>()
                .map(GroupingSpec::Filtered),
            _ => Err(OppsqlError::invalid(BY_SHAPES)),
        }
    }
}

impl TryFrom<Value> for VariableSpec {
    type Error = OppsqlError;
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(VariableSpec::Name(name)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    _ => Err(OppsqlError::invalid(VARIABLE_SHAPES)),
                })
                .collect::<Result<Vec<_>>>()
                .map(VariableSpec::Names),
            _ => Err(OppsqlError::invalid(VARIABLE_SHAPES)),
        }
    }
}

// ------------- Canonical form -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    filter: Vec<Scalar>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, filter: Vec<Scalar>) -> Self {
        Self { name: name.into(), filter }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Allowed values in caller order, empty when unconstrained.
    pub fn filter(&self) -> &[Scalar] {
        &self.filter
    }
    pub fn is_constrained(&self) -> bool {
        !self.filter.is_empty()
    }
    /// A single allowed value makes the column constant.
    pub fn is_singular(&self) -> bool {
        self.filter.len() == 1
    }
}

/// Ordered mapping from attribute name to allowed values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grouping {
    attributes: Vec<Attribute>,
}

impl Grouping {
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }
    pub fn len(&self) -> usize {
        self.attributes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
    fn push(&mut self, name: String, filter: Vec<Scalar>) -> Result<()> {
        if name.is_empty() {
            return Err(OppsqlError::invalid("attribute names must not be empty"));
        }
        if self.get(&name).is_some() {
            return Err(OppsqlError::invalid(format!("attribute '{name}' is given more than once")));
        }
        self.attributes.push(Attribute { name, filter });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variables(Vec<String>);

impl Variables {
    pub fn names(&self) -> &[String] {
        &self.0
    }
    /// Exactly one variable, so the value column can carry its name.
    pub fn single(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

pub fn normalize_grouping(by: GroupingSpec) -> Result<Grouping> {
    let mut grouping = Grouping::default();
    match by {
        GroupingSpec::Name(name) => grouping.push(name, Vec::new())?,
        GroupingSpec::Names(names) => {
            for name in names {
                grouping.push(name, Vec::new())?;
            }
        }
        GroupingSpec::Filtered(entries) => {
            for (name, filter) in entries {
                grouping.push(name, filter.into_values())?;
            }
        }
    }
    Ok(grouping)
}

pub fn normalize_variables(variable: VariableSpec) -> Result<Variables> {
    let names = match variable {
        VariableSpec::Name(name) => vec![name],
        VariableSpec::Names(names) => names,
    };
    if names.is_empty() {
        return Err(OppsqlError::invalid("at least one variable is required"));
    }
    if names.iter().any(String::is_empty) {
        return Err(OppsqlError::invalid("variable names must not be empty"));
    }
    Ok(Variables(names))
}

pub fn normalize(by: GroupingSpec, variable: VariableSpec) -> Result<(Grouping, Variables)> {
    Ok((normalize_grouping(by)?, normalize_variables(variable)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_values_keep_caller_order() {
        let grouping = normalize_grouping(GroupingSpec::filtered([
            ("nCars", FilterSpec::many([300, 100, 200])),
            ("repetition", FilterSpec::Unconstrained),
        ]))
        .unwrap();
        assert_eq!(grouping.names().collect::<Vec<_>>(), vec!["nCars", "repetition"]);
        let filter = grouping.get("nCars").unwrap().filter();
        assert_eq!(filter, &[Scalar::Int(300), Scalar::Int(100), Scalar::Int(200)]);
        assert!(!grouping.get("repetition").unwrap().is_constrained());
    }

    #[test]
    fn json_object_keeps_document_order() {
        let spec = GroupingSpec::try_from(json!({"speed": null, "nCars": 320, "alpha": [1, 2]})).unwrap();
        let grouping = normalize_grouping(spec).unwrap();
        assert_eq!(grouping.names().collect::<Vec<_>>(), vec!["speed", "nCars", "alpha"]);
        assert!(grouping.get("nCars").unwrap().is_singular());
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        assert!(normalize_grouping(GroupingSpec::from(vec!["a", "a"])).is_err());
        assert!(normalize_grouping(GroupingSpec::from("")).is_err());
        assert!(normalize_variables(VariableSpec::Names(Vec::new())).is_err());
    }
}
