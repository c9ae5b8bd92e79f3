//! Symptom prediction gRPC server binary.

use symptom_engine::{discover_data_files, DataFiles, EngineConfig, Predictor};
use symptom_service::proto::symptom_service_server::SymptomServiceServer;
use symptom_service::SymptomServer;
use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PORT: u16 = 50052;
const DEFAULT_DATA_PATH: &str = "data";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Get data path from env or use default
    let data_path = std::env::var("SYMPTOM_DATA_PATH")
        .unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

    tracing::info!("Loading symptom data from: {}", data_path);

    // A missing directory leaves the service running but not ready
    let files = match discover_data_files(&data_path) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Could not discover data files: {}", e);
            DataFiles::default()
        }
    };

    if !files.has_required_files() {
        tracing::warn!("Missing data files: {:?}", files.missing_files());
    }

    let predictor = Predictor::load(&files, EngineConfig::default());

    if !predictor.is_ready() {
        tracing::warn!("Predictor is not ready; prediction requests will be rejected");
    }

    // Create server
    let server = SymptomServer::new(predictor);

    // Get port from env or use default
    let port = std::env::var("SYMPTOM_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = format!("[::1]:{}", port).parse()?;
    tracing::info!("Starting symptom gRPC server on {}", addr);

    Server::builder()
        .add_service(SymptomServiceServer::new(server))
        .serve(addr)
        .await?;

    Ok(())
}
