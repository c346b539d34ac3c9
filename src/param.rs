//! Single query lookups: globally unique parameters and iteration variables.

use std::collections::BTreeMap;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::Connection;
use tracing::debug;

use crate::error::{OppsqlError, Result};
use crate::schema::{ITERATION_VARIABLES, RUN_ATTRIBUTE, RUN_PARAMETER};
use crate::value::Scalar;

lazy_static! {
    // "$nCars=320, $speed=13.9" names the variables nCars and speed
    static ref ITERATION_VARIABLE: Regex = Regex::new(r"\$(\w+)\s*=").unwrap();
}

/// Distinct stored values of the parameter whose name ends in `name`.
fn distinct_parameter_values(connection: &Connection, name: &str) -> Result<Vec<String>> {
    let mut statement = connection.prepare(&format!(
        "select distinct parValue from {RUN_PARAMETER} where parName like '%' || ?1"
    ))?;
    let values = statement
        .query_map([name], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(parameter = name, distinct = values.len(), "parameter lookup");
    Ok(values)
}

fn unique_parameter_value(connection: &Connection, name: &str) -> Result<String> {
    let mut values = distinct_parameter_values(connection, name)?;
    match values.len() {
        0 => Err(OppsqlError::MissingResult(name.to_string())),
        1 => Ok(values.remove(0)),
        count => Err(OppsqlError::AmbiguousResult { name: name.to_string(), count }),
    }
}

/// The single value of a parameter, converted into `T`.
///
/// Parameter names are matched by suffix, so `"playgroundSizeX"` finds
/// `"Net.playgroundSizeX"`. More than one distinct value across all runs is an
/// [`OppsqlError::AmbiguousResult`].
pub fn fetch_scalar<T>(connection: &Connection, name: &str) -> Result<T>
where
    T: FromStr,
{
    let value = unique_parameter_value(connection, name)?;
    value.parse::<T>().map_err(|_| OppsqlError::Coercion {
        value,
        target: std::any::type_name::<T>(),
    })
}

/// Like [`fetch_scalar`], with the type inferred from the stored text.
pub fn fetch_parameter(connection: &Connection, name: &str) -> Result<Scalar> {
    unique_parameter_value(connection, name).map(|value| Scalar::infer(&value))
}

/// Discover the swept attributes and the values each of them takes.
pub fn fetch_iteration_variables(connection: &Connection) -> Result<BTreeMap<String, Vec<Scalar>>> {
    let mut statement = connection.prepare(&format!(
        "select distinct attrValue from {RUN_ATTRIBUTE} where attrName = ?1"
    ))?;
    let listings = statement
        .query_map([ITERATION_VARIABLES], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut names: Vec<String> = Vec::new();
    for listing in &listings {
        for captures in ITERATION_VARIABLE.captures_iter(listing) {
            let name = &captures[1];
            if !names.iter().any(|known| known == name) {
                names.push(name.to_string());
            }
        }
    }

    let mut variables = BTreeMap::new();
    for name in names {
        let mut values = statement
            .query_map([&name], |row| row.get::<_, Scalar>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        values.sort_by(Scalar::natural_cmp);
        debug!(variable = %name, values = values.len(), "iteration variable");
        variables.insert(name, values);
    }
    Ok(variables)
}
