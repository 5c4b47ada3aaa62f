use roadbot::actuation::LoggingActuator;
use roadbot::common::Frame;
use roadbot::intake::SimulatedDetector;
use roadbot::{AppError, Configuration, CoordinatorBuilder, EngineConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Emits blank frames at a fixed rate until cancelled.
fn start_camera(
    configuration: &Configuration,
    frames: Sender<Frame>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let (width, height) = (configuration.frame_width, configuration.frame_height);
    let period = Duration::from_millis(configuration.frame_interval_ms.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => {
                    if frames.send(Frame::blank(width, height)).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let configuration = Configuration::load(config_path.as_deref())?;
    init_logging(&configuration.log_level);
    tracing::info!("Starting roadbot with {:?}", configuration);

    let engine_config = EngineConfig::from_configuration(&configuration)?;
    let classes = engine_config.classes();
    let seed = rand::random::<u64>();

    let coordinator = CoordinatorBuilder::new(configuration.clone())
        .engine_config(engine_config)
        .detector(Box::new(SimulatedDetector::new(classes, seed)))
        .actuator(Box::new(LoggingActuator::new()))
        .build()?;

    let camera_token = CancellationToken::new();
    let camera = start_camera(&configuration, coordinator.frames()?, camera_token.clone());

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::Pipeline(format!("Failed to listen for Ctrl-C: {e}")))?;
    tracing::info!("Shutting down");

    camera_token.cancel();
    camera
        .await
        .map_err(|e| AppError::Pipeline(format!("Camera task failed: {e}")))?;
    let stats = coordinator.shutdown().await?;
    tracing::info!(
        "Processed {} frames ({} committed, {} fallbacks, {} detector failures)",
        stats.frames,
        stats.committed,
        stats.fallbacks,
        stats.detector_failures
    );
    Ok(())
}
