//! Column oriented result tables.
//!
//! A [`Table`] is filled row by row from an executed statement and then has
//! some of its columns cast, either into a native type or into an ordered
//! categorical whose categories fix the order in which values sort and plot.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use rusqlite::{Params, Statement};
use seahash::SeaHasher;

use crate::error::Result;
use crate::value::{Kind, Scalar};

type SeenHasher = BuildHasherDefault<SeaHasher>;

#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Bool(Vec<Option<bool>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    /// Codes index into `categories`; a value outside the categories has no code.
    Categorical {
        categories: Vec<Scalar>,
        codes: Vec<Option<usize>>,
    },
}

impl Values {
    fn len(&self) -> usize {
        match self {
            Values::Bool(v) => v.len(),
            Values::Int(v) => v.len(),
            Values::Float(v) => v.len(),
            Values::Text(v) => v.len(),
            Values::Categorical { codes, .. } => codes.len(),
        }
    }

    /// Build the narrowest column for loosely typed cells: integers stay
    /// integers, integers mixed with reals become floats, anything mixed with
    /// text becomes text.
    pub fn from_cells(cells: Vec<Option<Scalar>>) -> Values {
        let mut kind: Option<Kind> = None;
        for cell in cells.iter().flatten() {
            kind = Some(match (kind, cell.kind()) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(Kind::Int), Kind::Float) | (Some(Kind::Float), Kind::Int) => Kind::Float,
                _ => Kind::Text,
            });
        }
        Values::of_kind(kind.unwrap_or(Kind::Text), cells)
    }

    /// Column of the given kind; cells of another kind become missing values.
    fn of_kind(kind: Kind, cells: Vec<Option<Scalar>>) -> Values {
        match kind {
            Kind::Bool => Values::Bool(
                cells.into_iter().map(|c| match c {
                    Some(Scalar::Bool(b)) => Some(b),
                    _ => None,
                }).collect(),
            ),
            Kind::Int => Values::Int(
                cells.into_iter().map(|c| match c {
                    Some(Scalar::Int(i)) => Some(i),
                    _ => None,
                }).collect(),
            ),
            Kind::Float => Values::Float(
                cells.into_iter().map(|c| match c {
                    Some(Scalar::Int(i)) => Some(i as f64),
                    Some(Scalar::Float(f)) => Some(f),
                    _ => None,
                }).collect(),
            ),
            Kind::Text => Values::Text(cells.into_iter().map(|c| c.map(|s| s.encode())).collect()),
        }
    }

    fn cell(&self, row: usize) -> Option<Scalar> {
        match self {
            Values::Bool(v) => v.get(row).copied().flatten().map(Scalar::Bool),
            Values::Int(v) => v.get(row).copied().flatten().map(Scalar::Int),
            Values::Float(v) => v.get(row).copied().flatten().map(Scalar::Float),
            Values::Text(v) => v.get(row).cloned().flatten().map(Scalar::Text),
            Values::Categorical { categories, codes } => codes
                .get(row)
                .copied()
                .flatten()
                .and_then(|code| categories.get(code).cloned()),
        }
    }

    fn cells(&self) -> Vec<Option<Scalar>> {
        (0..self.len()).map(|row| self.cell(row)).collect()
    }
}

/// How a column is to be cast.
#[derive(Debug, Clone, PartialEq)]
pub enum Cast {
    /// Strict conversion of every value into this kind.
    Native(Kind),
    /// Ordered categorical with exactly these categories, in this order.
    Categorical(Vec<Scalar>),
    /// Ordered categorical of inferred values, categories in first-seen order.
    Inferred,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Values,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Values) -> Self {
        Self { name: name.into(), values }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn values(&self) -> &Values {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn get(&self, row: usize) -> Option<Scalar> {
        self.values.cell(row)
    }
    pub fn categories(&self) -> Option<&[Scalar]> {
        match &self.values {
            Values::Categorical { categories, .. } => Some(categories),
            _ => None,
        }
    }
    pub fn type_name(&self) -> &'static str {
        match &self.values {
            Values::Bool(_) => Kind::Bool.name(),
            Values::Int(_) => Kind::Int.name(),
            Values::Float(_) => Kind::Float.name(),
            Values::Text(_) => Kind::Text.name(),
            Values::Categorical { .. } => "category",
        }
    }

    pub fn cast(&mut self, cast: Cast) -> Result<()> {
        let cells = self.values.cells();
        self.values = match cast {
            Cast::Native(kind) => {
                let converted = cells
                    .into_iter()
                    .map(|cell| cell.map(|s| s.coerce(kind)).transpose())
                    .collect::<Result<Vec<_>>>()?;
                Values::of_kind(kind, converted)
            }
            Cast::Categorical(categories) => {
                let codes = cells
                    .iter()
                    .map(|cell| {
                        cell.as_ref().and_then(|value| {
                            categories
                                .iter()
                                .position(|c| c == value || c.encode() == value.encode())
                        })
                    })
                    .collect();
                Values::Categorical { categories, codes }
            }
            Cast::Inferred => {
                let mut seen: HashMap<Scalar, usize, SeenHasher> = HashMap::default();
                let mut categories = Vec::new();
                let mut codes = Vec::with_capacity(cells.len());
                for cell in cells {
                    let code = cell.map(|value| {
                        let value = match value {
                            Scalar::Text(text) => Scalar::infer(&text),
                            other => other,
                        };
                        *seen.entry(value).or_insert_with_key(|value| {
                            categories.push(value.clone());
                            categories.len() - 1
                        })
                    });
                    codes.push(code);
                }
                Values::Categorical { categories, codes }
            }
        };
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Execute a prepared statement and load one table row per result row.
    /// Columns are named after the statement's result columns.
    pub fn from_statement<P: Params>(statement: &mut Statement<'_>, params: P) -> Result<Table> {
        let names: Vec<String> = statement.column_names().into_iter().map(String::from).collect();
        let mut cells: Vec<Vec<Option<Scalar>>> = vec![Vec::new(); names.len()];
        let mut rows = statement.query(params)?;
        while let Some(row) = rows.next()? {
            for (index, column) in cells.iter_mut().enumerate() {
                column.push(Scalar::from_value_ref(row.get_ref(index)?));
            }
        }
        Ok(Table {
            columns: names
                .into_iter()
                .zip(cells)
                .map(|(name, cells)| Column::new(name, Values::from_cells(cells)))
                .collect(),
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
    /// Column by position. Names need not be unique, positions are.
    pub fn column_at_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn row(&self, row: usize) -> Vec<Option<Scalar>> {
        self.columns.iter().map(|c| c.get(row)).collect()
    }
    pub fn rows(&self) -> Vec<Vec<Option<Scalar>>> {
        (0..self.len()).map(|row| self.row(row)).collect()
    }
}
