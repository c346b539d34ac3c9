//! oppsql – shaping OMNeT++ SQLite result files into analysis ready tables.
//!
//! A result database stores runs, the attributes and parameters of each run,
//! vector metadata and vector samples in separate, normalized tables. The
//! interesting questions ("collisions per `nCars` and repetition", "average
//! speed for `nCars` 320") need a join per attribute of interest. This crate
//! builds those joins from a compact grouping specification and hands back a
//! typed [`table::Table`].
//!
//! ## Modules
//! * [`grouping`] – The accepted shapes of grouping and variable specifications
//!   and their canonical form.
//! * [`value`] – [`value::Scalar`], the attribute value type, with ordered type
//!   inference (bool, int, float, text).
//! * [`query`] – A SELECT builder with numbered parameters, row filters and
//!   aggregates.
//! * [`vector`] – Statement construction and result assembly for vector samples.
//! * [`table`] – Typed columns, categoricals and casting.
//! * [`param`] – Unique parameter lookup and iteration variable discovery.
//! * [`database`] – A result file handle opening one read-only connection per call.
//! * [`server`] – JSON over HTTP access to a [`database::Database`].
//!
//! ## Grouping
//! `by` names the run attributes that label each sample. It may be a single
//! name, a list of names, or a list of `(name, filter)` pairs where the filter
//! restricts the attribute to the given values. Attributes restricted to a
//! single value are not returned as columns (they would be constant) unless
//! [`vector::VectorOptions::self_descriptive`] is set.
//!
//! ## Quick Start
//! ```
//! use rusqlite::Connection;
//! use oppsql::schema::SCHEMA;
//! use oppsql::vector::{vector, VectorOptions};
//! let conn = Connection::open_in_memory().unwrap();
//! conn.execute_batch(SCHEMA).unwrap();
//! conn.execute_batch("
//!     insert into run values (1, 1, 'General-0', -12);
//!     insert into runattr values (1, 1, 'nCars', '10');
//!     insert into vector (dbId, vectorId, runId, moduleName, vectorName)
//!         values (1, 1, 1, 'Net.car[0]', 'speed');
//!     insert into vectordata values (1, 1, 0, 1000000000000, 13.9);
//! ").unwrap();
//! let table = vector(&conn, "nCars", "speed", &VectorOptions::default()).unwrap();
//! assert_eq!(table.column_names(), vec!["nCars", "speed"]);
//! assert_eq!(table.len(), 1);
//! ```

pub mod database;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod param;
pub mod query;
pub mod schema;
pub mod server;
pub mod settings;
pub mod table;
pub mod value;
pub mod vector;

pub use database::Database;
pub use error::{OppsqlError, Result};
pub use grouping::{FilterSpec, GroupingSpec, VariableSpec};
pub use param::{fetch_iteration_variables, fetch_parameter, fetch_scalar};
pub use table::Table;
pub use value::Scalar;
pub use vector::{fetch_vector, VectorOptions};
