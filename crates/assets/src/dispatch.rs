use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use lumen_scene::{EnvironmentMap, Model};

use crate::error::AssetError;
use crate::gltf_import::{LoadProgress, load_model};
use crate::hdr::load_environment;
use crate::source::AssetSource;

/// Completion and progress notifications from background loads.
///
/// Each load ends with exactly one terminal event: `*Loaded` or `*Failed`.
#[derive(Debug)]
pub enum AssetEvent {
    EnvironmentLoaded(EnvironmentMap),
    EnvironmentFailed(AssetError),
    ModelProgress(LoadProgress),
    ModelLoaded(Model),
    ModelFailed(AssetError),
}

impl AssetEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::ModelProgress(_))
    }
}

/// Delivers asset events back to the thread that owns the scene.
pub trait AssetSink: Send + 'static {
    fn deliver(&self, event: AssetEvent);
}

impl AssetSink for mpsc::Sender<AssetEvent> {
    fn deliver(&self, event: AssetEvent) {
        if self.send(event).is_err() {
            tracing::debug!("asset event receiver dropped");
        }
    }
}

/// Load the environment map on a background thread.
pub fn spawn_environment_load<S: AssetSink>(
    source: AssetSource,
    sink: S,
) -> Result<JoinHandle<()>, AssetError> {
    let handle = thread::Builder::new()
        .name("environment-loader".into())
        .spawn(move || {
            tracing::info!(%source, "loading environment");
            let event = match load_environment(&source) {
                Ok(env) => AssetEvent::EnvironmentLoaded(env),
                Err(e) => AssetEvent::EnvironmentFailed(e),
            };
            sink.deliver(event);
        })?;
    Ok(handle)
}

/// Load the model on a background thread, reporting progress as it reads.
pub fn spawn_model_load<S: AssetSink>(
    path: PathBuf,
    sink: S,
) -> Result<JoinHandle<()>, AssetError> {
    let handle = thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || {
            tracing::info!(path = %path.display(), "loading model");
            let result = load_model(&path, |p| sink.deliver(AssetEvent::ModelProgress(p)));
            let event = match result {
                Ok(model) => AssetEvent::ModelLoaded(model),
                Err(e) => AssetEvent::ModelFailed(e),
            };
            sink.deliver(event);
        })?;
    Ok(handle)
}
