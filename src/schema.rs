//! Table and column names of the result database.
//!
//! Result files are written by the simulator (and merged by external tools),
//! never by this crate. [`SCHEMA`] is the layout those files have; it exists so
//! that fixtures and benchmarks can build databases of the same shape.

pub const RUN: &str = "run";
pub const RUN_ATTRIBUTE: &str = "runattr";
pub const RUN_PARAMETER: &str = "runparam";
pub const VECTOR: &str = "vector";
pub const VECTOR_DATA: &str = "vectordata";

/// Attribute listing the iteration variables of a run as `$name=value, ...`.
pub const ITERATION_VARIABLES: &str = "iterationvars";

// The "STRICT" keyword is left out on purpose, values in the numeric columns
// may arrive as integers, reals or text depending on the writer.
pub const SCHEMA: &str = "
create table if not exists db (
    dbId integer not null,
    dbName text not null,
    constraint referenceable_dbId primary key (dbId),
    constraint unique_dbName unique (dbName)
);
create table if not exists run (
    dbId integer not null,
    runId integer not null,
    runName text not null,
    simtimeExp integer not null,
    constraint referenceable_run primary key (dbId, runId)
);
create table if not exists runattr (
    dbId integer not null,
    runId integer not null,
    attrName text not null,
    attrValue text not null,
    constraint runattr_of_run foreign key (runId, dbId) references run(runId, dbId)
);
create table if not exists runparam (
    dbId integer not null,
    runId integer not null,
    parName text not null,
    parValue text not null,
    constraint runparam_of_run foreign key (runId, dbId) references run(runId, dbId)
);
create table if not exists vector (
    dbId integer not null,
    vectorId integer not null,
    runId integer not null,
    moduleName text not null,
    vectorName text not null,
    vectorCount integer,
    vectorMin real,
    vectorMax real,
    vectorSum real,
    vectorSumSqr real,
    startEventNum integer,
    endEventNum integer,
    startSimtimeRaw integer,
    endSimtimeRaw integer,
    constraint referenceable_vector primary key (dbId, vectorId),
    constraint vector_of_run foreign key (runId, dbId) references run(runId, dbId)
);
create table if not exists vectordata (
    dbId integer not null,
    vectorId integer not null,
    eventNumber integer not null,
    simtimeRaw integer not null,
    value numeric not null,
    constraint vectordata_of_vector foreign key (vectorId, dbId) references vector(vectorId, dbId)
);
";
