use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::database::Database;
use crate::error::{OppsqlError, Result};
use crate::grouping::{GroupingSpec, VariableSpec};
use crate::value::Scalar;
use crate::vector::VectorOptions;

#[derive(Deserialize)]
pub struct VectorRequest {
    /// Grouping attributes, in any of the accepted shapes.
    pub by: Value,
    pub variable: Value,
    #[serde(flatten)]
    pub options: VectorOptions,
}

#[derive(Deserialize)]
pub struct ParameterRequest {
    pub name: String,
}

#[derive(Serialize, Default)]
pub struct QueryResponse {
    pub status: String,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<Option<Scalar>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, Vec<Scalar>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type Reply = (StatusCode, Json<QueryResponse>);

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

pub fn status_of(error: &OppsqlError) -> StatusCode {
    match error {
        OppsqlError::InvalidSpecification(_) => StatusCode::BAD_REQUEST,
        OppsqlError::MissingResult(_) => StatusCode::NOT_FOUND,
        OppsqlError::AmbiguousResult { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Database work is synchronous, so it runs on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        warn!(error = %e, "join error");
        OppsqlError::Io(std::io::Error::other(e))
    })?
}

fn ok(started: Instant, response: QueryResponse) -> Reply {
    (
        StatusCode::OK,
        Json(QueryResponse { status: "ok".into(), elapsed_ms: elapsed_ms(started), ..response }),
    )
}

fn failure(started: Instant, error: OppsqlError) -> Reply {
    let status = status_of(&error);
    let msg = error.to_string();
    warn!(%msg, code = %status.as_u16(), "request failed");
    let body = QueryResponse {
        status: "error".into(),
        elapsed_ms: elapsed_ms(started),
        error: Some(msg),
        ..Default::default()
    };
    (status, Json(body))
}

async fn vector(State(database): State<Arc<Database>>, Json(request): Json<VectorRequest>) -> Reply {
    let started = Instant::now();
    let outcome = blocking(move || {
        let by = GroupingSpec::try_from(request.by)?;
        let variable = VariableSpec::try_from(request.variable)?;
        database.vector(by, variable, &request.options)
    })
    .await;
    match outcome {
        Ok(table) => {
            info!(ms = elapsed_ms(started), rows = table.len(), "vector query complete");
            ok(
                started,
                QueryResponse {
                    columns: Some(table.column_names().into_iter().map(String::from).collect()),
                    row_types: Some(table.columns().iter().map(|c| c.type_name().to_string()).collect()),
                    row_count: Some(table.len()),
                    rows: Some(table.rows()),
                    ..Default::default()
                },
            )
        }
        Err(e) => failure(started, e),
    }
}

async fn parameter(State(database): State<Arc<Database>>, Json(request): Json<ParameterRequest>) -> Reply {
    let started = Instant::now();
    match blocking(move || database.parameter(&request.name)).await {
        Ok(value) => ok(started, QueryResponse { value: Some(value), ..Default::default() }),
        Err(e) => failure(started, e),
    }
}

async fn iteration_variables(State(database): State<Arc<Database>>) -> Reply {
    let started = Instant::now();
    match blocking(move || database.iteration_variables()).await {
        Ok(variables) => ok(started, QueryResponse { variables: Some(variables), ..Default::default() }),
        Err(e) => failure(started, e),
    }
}

pub fn router(database: Arc<Database>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    Router::new()
        .route("/v1/vector", post(vector))
        .route("/v1/parameter", post(parameter))
        .route("/v1/iteration-variables", get(iteration_variables))
        .layer(cors)
        .with_state(database)
}
