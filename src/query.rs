//! A small SELECT builder with numbered bind parameters.
//!
//! Joins, columns, constraints and groupings are accumulated in the order the
//! caller adds them. Parameters are numbered as they are bound (`?1`, `?2`,
//! ...), so clauses can be added in any order regardless of where they end up
//! in the rendered statement.

use rusqlite::types::Value;
use serde::Deserialize;

use crate::schema::{RUN, VECTOR, VECTOR_DATA};

/// Quote an identifier for use as a column alias.
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[derive(Debug, Clone, Default)]
pub struct Select {
    columns: Vec<String>,
    from: String,
    joins: Vec<String>,
    constraints: Vec<String>,
    group_by: Vec<String>,
    params: Vec<Value>,
}

impl Select {
    pub fn from(source: impl Into<String>) -> Self {
        Self { from: source.into(), ..Default::default() }
    }

    /// Bind one value and return its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    /// Bind a list of values and return the comma separated placeholders.
    pub fn bind_all<I, V>(&mut self, values: I) -> String
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .map(|value| self.bind(value))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn column(&mut self, expression: impl AsRef<str>, alias: &str) {
        self.columns.push(format!("{} as {}", expression.as_ref(), quote(alias)));
    }

    pub fn join(&mut self, clause: impl Into<String>) {
        self.joins.push(clause.into());
    }

    pub fn constrain(&mut self, clause: impl Into<String>) {
        self.constraints.push(clause.into());
    }

    pub fn group_by(&mut self, expression: impl Into<String>) {
        self.group_by.push(expression.into());
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_by.is_empty()
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn sql(&self) -> String {
        let mut sql = format!("select {}\n    from {}", self.columns.join(",\n        "), self.from);
        for join in &self.joins {
            sql.push_str("\n    join ");
            sql.push_str(join);
        }
        if !self.constraints.is_empty() {
            sql.push_str("\n    where ");
            sql.push_str(&self.constraints.join("\n    and "));
        }
        if !self.group_by.is_empty() {
            sql.push_str("\n    group by ");
            sql.push_str(&self.group_by.join(", "));
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

/// Additional row level constraint on the joined samples.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Compare the sample value.
    Value(Comparison, f64),
    /// Compare the raw (unscaled) sample timestamp.
    SimtimeRaw(Comparison, i64),
    EventNumber(Comparison, i64),
    /// `LIKE` pattern on the module name.
    Module(String),
    /// `LIKE` pattern on the run name.
    Run(String),
    /// Raw SQL, ANDed in verbatim. Not accepted from JSON.
    #[serde(skip_deserializing)]
    Sql(String),
    All(Vec<Filter>),
}

impl Filter {
    /// Render into a boolean SQL expression, binding its values on `select`.
    pub fn render(&self, select: &mut Select) -> String {
        match self {
            Filter::Value(cmp, v) => {
                format!("{VECTOR_DATA}.value {} {}", cmp.operator(), select.bind(*v))
            }
            Filter::SimtimeRaw(cmp, t) => {
                format!("{VECTOR_DATA}.simtimeRaw {} {}", cmp.operator(), select.bind(*t))
            }
            Filter::EventNumber(cmp, e) => {
                format!("{VECTOR_DATA}.eventNumber {} {}", cmp.operator(), select.bind(*e))
            }
            Filter::Module(pattern) => {
                format!("{VECTOR}.moduleName like {}", select.bind(pattern.clone()))
            }
            Filter::Run(pattern) => {
                format!("{RUN}.runName like {}", select.bind(pattern.clone()))
            }
            Filter::Sql(raw) => format!("({raw})"),
            Filter::All(filters) if filters.is_empty() => "1".to_string(),
            Filter::All(filters) => {
                let parts: Vec<String> = filters.iter().map(|f| f.render(select)).collect();
                format!("({})", parts.join(" and "))
            }
        }
    }
}

/// Aggregate applied to the sample values of each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Avg,
    Sum,
    Min,
    Max,
    Count,
    Total,
}

impl Aggregate {
    pub fn function(&self) -> &'static str {
        match self {
            Aggregate::Avg => "avg",
            Aggregate::Sum => "sum",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Count => "count",
            Aggregate::Total => "total",
        }
    }
    pub fn apply(&self, expression: &str) -> String {
        format!("{}({expression})", self.function())
    }
}
