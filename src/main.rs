use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use eyewatch::alert::AlertDispatcher;
use eyewatch::config::Config;
use eyewatch::logging::init_tracing;
use eyewatch::pipeline::FramePipeline;
use eyewatch::services::cue_command::CommandCuePlayer;
use eyewatch::services::log_renderer::LogRenderer;
use eyewatch::services::replay::{RecordedLandmarks, ReplaySource};
use eyewatch::shutdown::{shutdown_signal, StopFlag};

/// Grace period for cues still playing when the session ends.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let mut config = Config::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config.source.path = path;
    }

    init_tracing(&config.log_config());
    tracing::info!("Starting eyewatch");

    if let Err(e) = config.detector.validate() {
        tracing::error!(error = %e, "Invalid detector configuration");
        return ExitCode::FAILURE;
    }

    let mut source = match ReplaySource::open(&config.source.path, config.source.replay_fps) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "Could not open frame source");
            return ExitCode::FAILURE;
        }
    };

    let stop = StopFlag::new();
    tokio::spawn(shutdown_signal(stop.clone()));

    let player = Arc::new(CommandCuePlayer::new(&config.alert.player_program));
    tracing::info!(
        player = player.program(),
        cue = %config.alert.cue_identifier,
        coalesce = config.alert.coalesce,
        "Alert cue configured"
    );
    let dispatcher = AlertDispatcher::new(player, &config.alert, tokio::runtime::Handle::current());
    let mut pipeline = FramePipeline::new(&config.detector, dispatcher);

    // The frame loop is synchronous; keep it off the async workers.
    let session = tokio::task::spawn_blocking(move || {
        let mut detector = RecordedLandmarks;
        let mut renderer = LogRenderer::new();
        let summary = pipeline.run(&mut source, &mut detector, &mut renderer, &stop);
        (pipeline, summary)
    })
    .await;

    let (pipeline, summary) = match session {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(error = %e, "Frame loop panicked");
            return ExitCode::FAILURE;
        }
    };

    if !pipeline.dispatcher().drain(DRAIN_TIMEOUT).await {
        tracing::warn!(
            in_flight = pipeline.dispatcher().stats().in_flight,
            "Alert cues still playing at exit"
        );
    }

    match serde_json::to_string(&summary) {
        Ok(json) => tracing::info!(summary = %json, "Session summary"),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize session summary"),
    }
    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
