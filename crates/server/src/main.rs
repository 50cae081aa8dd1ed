use annotator::Annotator;
use detector::Detector;
use schema::ClassCatalog;
use server::config::{OutputPaths, ServerConfig};
use server::logging::setup_logging;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    std::fs::create_dir_all(&config.output_dir)?;
    let paths = OutputPaths::new(&config.output_dir);

    tracing::info!("Loading detection model");
    let detector = Detector::from_config(&config.detector)?;
    tracing::info!("Model loaded successfully");

    let annotator = Annotator::new(ClassCatalog::blood_cells())?;
    let state = AppState::new(Box::new(detector), annotator, paths);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, server::app(state)).await?;

    Ok(())
}
