//! Vector tables: samples of one or more vectors, labelled with run attributes.
//!
//! The statement is assembled from the normalized grouping: every grouping
//! attribute contributes one filtered subquery over `runattr`, inner joined on
//! the run key, so runs lacking the attribute (or an allowed value of it) drop
//! out. Attributes restricted to a single value are constant and therefore not
//! selected, unless self-descriptive output is requested. The same holds for
//! the vector name when exactly one variable is read.

use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::grouping::{self, Attribute, Grouping, GroupingSpec, VariableSpec, Variables};
use crate::query::{Aggregate, Filter, Select};
use crate::schema::{RUN, RUN_ATTRIBUTE, VECTOR, VECTOR_DATA};
use crate::table::{Cast, Table, Values};
use crate::value::{Kind, Scalar};

/// Name of the time column and of the SQL function computing it.
pub const SIMTIME: &str = "simtime";
pub const MODULE_NAME: &str = "moduleName";
pub const VECTOR_NAME: &str = "vectorName";
/// Value column name when more than one variable is read.
pub const VALUE: &str = "value";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VectorOptions {
    /// Add the sample time in seconds.
    pub time: bool,
    /// Add the name of the module that recorded the vector.
    pub module: bool,
    pub filter: Option<Filter>,
    /// Aggregate the sample values of each group instead of returning them.
    pub aggregate: Option<Aggregate>,
    /// Keep columns that would otherwise be elided as constant.
    pub self_descriptive: bool,
}

/// Seconds from a raw fixed point timestamp and the run's exponent.
pub fn simtime(raw: i64, exponent: i32) -> f64 {
    raw as f64 * 10f64.powi(exponent)
}

/// Make `simtime(raw, exponent)` callable from statements on this connection.
/// Registration is local to the connection and has to be repeated for every
/// new one.
pub fn register_simtime(connection: &Connection) -> Result<()> {
    connection.create_scalar_function(SIMTIME, 2, FunctionFlags::SQLITE_UTF8, |context| {
        let raw: i64 = context.get(0)?;
        let exponent: i32 = context.get(1)?;
        Ok(simtime(raw, exponent))
    })?;
    Ok(())
}

fn attribute_alias(index: usize) -> String {
    format!("a{index}")
}

// Attributes restricted to one value are constant, so they are only selected
// when self-descriptive output is asked for.
fn is_selected(attribute: &Attribute, options: &VectorOptions) -> bool {
    options.self_descriptive || !attribute.is_singular()
}

/// Build the statement for a normalized request.
pub fn build(grouping: &Grouping, variables: &Variables, options: &VectorOptions) -> Select {
    let elide = !options.self_descriptive;
    let mut select = Select::from(RUN);
    select.join(format!(
        "{VECTOR} on {VECTOR}.runId = {RUN}.runId and {VECTOR}.dbId = {RUN}.dbId"
    ));
    select.join(format!(
        "{VECTOR_DATA} on {VECTOR_DATA}.vectorId = {VECTOR}.vectorId and {VECTOR_DATA}.dbId = {VECTOR}.dbId"
    ));

    for (index, attribute) in grouping.attributes().iter().enumerate() {
        let alias = attribute_alias(index);
        let mut subquery = format!(
            "(select runId, dbId, attrValue from {RUN_ATTRIBUTE} where attrName = {}",
            select.bind(attribute.name().to_string())
        );
        if attribute.is_constrained() {
            let allowed = select.bind_all(attribute.filter().iter().cloned());
            subquery.push_str(&format!(" and attrValue in ({allowed})"));
        }
        select.join(format!(
            "{subquery}) as {alias} on {alias}.runId = {RUN}.runId and {alias}.dbId = {RUN}.dbId"
        ));
        if is_selected(attribute, options) {
            select.column(format!("{alias}.attrValue"), attribute.name());
        }
    }

    // everything selected besides the value itself is grouped on when aggregating
    let mut keys: Vec<String> = grouping
        .attributes()
        .iter()
        .enumerate()
        .filter(|(_, attribute)| !attribute.is_singular())
        .map(|(index, _)| format!("{}.attrValue", attribute_alias(index)))
        .collect();

    if options.time {
        let expression = format!("{SIMTIME}({VECTOR_DATA}.simtimeRaw, {RUN}.simtimeExp)");
        select.column(&expression, SIMTIME);
        keys.push(expression);
    }
    if options.module {
        select.column(format!("{VECTOR}.moduleName"), MODULE_NAME);
        keys.push(format!("{VECTOR}.moduleName"));
    }
    let value_name = match variables.single() {
        Some(variable) if elide => variable,
        _ => {
            select.column(format!("{VECTOR}.vectorName"), VECTOR_NAME);
            keys.push(format!("{VECTOR}.vectorName"));
            VALUE
        }
    };
    let value = format!("{VECTOR_DATA}.value");
    match options.aggregate {
        Some(aggregate) => select.column(aggregate.apply(&value), value_name),
        None => select.column(&value, value_name),
    }

    if let Some(filter) = &options.filter {
        let constraint = filter.render(&mut select);
        select.constrain(constraint);
    }
    let names = select.bind_all(variables.names().iter().cloned());
    select.constrain(format!("{VECTOR}.vectorName in ({names})"));

    if options.aggregate.is_some() {
        for key in keys {
            select.group_by(key);
        }
    }
    select
}

/// How a grouping column is typed once loaded.
fn grouping_cast(attribute: &Attribute) -> Cast {
    match attribute.filter().first() {
        None => Cast::Inferred,
        Some(Scalar::Text(_)) => Cast::Categorical(attribute.filter().to_vec()),
        Some(first) => Cast::Native(first.kind()),
    }
}

/// Read samples for already normalized grouping and variables.
pub fn fetch_vector(
    connection: &Connection,
    grouping: &Grouping,
    variables: &Variables,
    options: &VectorOptions,
) -> Result<Table> {
    if options.time {
        register_simtime(connection)?;
    }
    let select = build(grouping, variables, options);
    let sql = select.sql();
    trace!(%sql, params = select.params().len(), "vector query");
    let mut statement = connection.prepare(&sql)?;
    let mut table = Table::from_statement(&mut statement, rusqlite::params_from_iter(select.params()))?;
    debug!(rows = table.len(), columns = ?table.column_names(), "vector table loaded");

    // grouping columns come first, in grouping order, and the value column
    // last; names can collide (`by="speed", variable="speed"`), positions cannot
    let selected = grouping.attributes().iter().filter(|attribute| is_selected(attribute, options));
    for (index, attribute) in selected.enumerate() {
        if let Some(column) = table.column_at_mut(index) {
            column.cast(grouping_cast(attribute))?;
        }
    }
    if let Some(last) = table.columns().len().checked_sub(1) {
        coerce_values(&mut table, last, options.aggregate)?;
    }
    Ok(table)
}

// Sample values are doubles, counts are integers. SQLite hands back whole
// numbers as integers and anything it could not store as a number as text.
fn coerce_values(table: &mut Table, index: usize, aggregate: Option<Aggregate>) -> Result<()> {
    let Some(column) = table.column_at_mut(index) else {
        return Ok(());
    };
    let kind = match aggregate {
        Some(Aggregate::Count) => Kind::Int,
        _ => Kind::Float,
    };
    match column.values() {
        Values::Float(_) if kind == Kind::Float => return Ok(()),
        Values::Int(_) if kind == Kind::Int => return Ok(()),
        Values::Text(cells) if !cells.is_empty() => {
            warn!(target: "oppsql::numeric", column = column.name(), to = kind.name(), "numeric values stored as text, converting");
        }
        _ => (),
    }
    column.cast(Cast::Native(kind))
}

/// Normalize the specifications and read the samples.
pub fn vector(
    connection: &Connection,
    by: impl Into<GroupingSpec>,
    variable: impl Into<VariableSpec>,
    options: &VectorOptions,
) -> Result<Table> {
    let (grouping, variables) = grouping::normalize(by.into(), variable.into())?;
    fetch_vector(connection, &grouping, &variables, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::FilterSpec;

    fn normalized(by: GroupingSpec, variable: &str) -> (Grouping, Variables) {
        grouping::normalize(by, variable.into()).unwrap()
    }

    #[test]
    fn simtime_scales_by_exponent() {
        assert_eq!(simtime(1_500, -3), 1.5);
        assert_eq!(simtime(2, 0), 2.0);
    }

    #[test]
    fn one_join_per_grouping_attribute() {
        let (grouping, variables) = normalized(GroupingSpec::from(vec!["nCars", "repetition", "speed"]), "collisions");
        let sql = build(&grouping, &variables, &VectorOptions::default()).sql();
        assert_eq!(sql.matches("from runattr").count(), 3);
        assert!(sql.contains("a2.attrValue as \"speed\""));
    }

    #[test]
    fn singular_attribute_is_not_grouped() {
        let (grouping, variables) = normalized(
            GroupingSpec::filtered([
                ("nCars", FilterSpec::one(320)),
                ("repetition", FilterSpec::Unconstrained),
            ]),
            "collisions",
        );
        let options = VectorOptions { aggregate: Some(Aggregate::Avg), ..Default::default() };
        let sql = build(&grouping, &variables, &options).sql();
        assert!(sql.ends_with("group by a1.attrValue"), "{sql}");
        assert!(sql.contains("avg(vectordata.value) as \"collisions\""));
        assert!(!sql.contains("a0.attrValue as"));
    }

    #[test]
    fn parameters_follow_placeholders() {
        let (grouping, variables) = normalized(
            GroupingSpec::filtered([("warmup", FilterSpec::one(true))]),
            "collisions",
        );
        let select = build(&grouping, &variables, &VectorOptions::default());
        assert_eq!(
            select.params(),
            &[
                rusqlite::types::Value::Text("warmup".into()),
                rusqlite::types::Value::Text("true".into()),
                rusqlite::types::Value::Text("collisions".into()),
            ]
        );
    }
}
