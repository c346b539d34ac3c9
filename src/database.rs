use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{OppsqlError, Result};
use crate::grouping::{GroupingSpec, VariableSpec};
use crate::param;
use crate::table::Table;
use crate::value::Scalar;
use crate::vector::{self, VectorOptions};

/// A result file on disk.
///
/// Nothing is kept open between calls: every method opens its own read-only
/// connection, which is closed again when the call returns, whether it
/// succeeded or not.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Database> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(OppsqlError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no result file at {}", path.display()),
            )));
        }
        Ok(Database { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        debug!(path = %self.path.display(), "opening result file");
        let connection = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(connection)
    }

    pub fn vector(
        &self,
        by: impl Into<GroupingSpec>,
        variable: impl Into<VariableSpec>,
        options: &VectorOptions,
    ) -> Result<Table> {
        vector::vector(&self.connect()?, by, variable, options)
    }

    pub fn scalar<T: FromStr>(&self, name: &str) -> Result<T> {
        param::fetch_scalar(&self.connect()?, name)
    }

    pub fn parameter(&self, name: &str) -> Result<Scalar> {
        param::fetch_parameter(&self.connect()?, name)
    }

    pub fn iteration_variables(&self) -> Result<BTreeMap<String, Vec<Scalar>>> {
        param::fetch_iteration_variables(&self.connect()?)
    }
}
