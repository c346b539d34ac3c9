use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use oppsql::settings::Settings;
use oppsql::{logging, server, Database};

#[tokio::main]
async fn main() -> oppsql::Result<()> {
    let settings = Settings::load()?;
    logging::init(Some(&settings.log));

    let database = Arc::new(Database::open(&settings.database)?);
    info!(database = %database.path().display(), "serving result file");

    let listener = TcpListener::bind(settings.listen.as_str()).await?;
    info!(address = %settings.listen, "listening");
    axum::serve(listener, server::router(database)).await?;
    Ok(())
}
