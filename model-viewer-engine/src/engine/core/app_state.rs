use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::model_library::ViewerManifest;
use crate::engine::loading::model_loader::ModelLoadRequest;
use crate::engine::loading::progress::LoadingProgress;

/// Application lifecycle: manifest fetch, then the interactive viewer.
/// Model loads are runtime operations and may repeat while Running.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Handle to the in-flight manifest fetch.
#[derive(Resource, Default)]
pub struct ManifestLoader {
    pub handle: Option<Handle<ViewerManifest>>,
}

/// Kick off the viewer configuration fetch.
pub fn start_manifest_load(mut loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(constants::path::VIEWER_MANIFEST_PATH));
}

/// Resolve the manifest, queue the default model, and enter Running.
/// A missing manifest degrades to an empty viewer awaiting frontend
/// requests.
pub fn transition_to_running(
    loader: Res<ManifestLoader>,
    manifests: Res<Assets<ViewerManifest>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut progress: ResMut<LoadingProgress>,
    mut requests: EventWriter<ModelLoadRequest>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = &loader.handle else {
        return;
    };
    match asset_server.get_load_state(handle) {
        Some(LoadState::Loaded) => {
            let Some(manifest) = manifests.get(handle) else {
                return;
            };
            progress.manifest_loaded = true;
            if let Some(entry) = manifest.default_entry() {
                requests.write(ModelLoadRequest {
                    url: entry.url.clone(),
                    cancel: None,
                    environment_url: manifest.environment_url.clone(),
                });
            }
            commands.insert_resource(manifest.clone());
            info!("→ Viewer configuration loaded, transitioning to Running");
            next_state.set(AppState::Running);
        }
        Some(LoadState::Failed(error)) => {
            warn!("Viewer manifest unavailable ({error}); waiting for frontend requests");
            next_state.set(AppState::Running);
        }
        _ => {}
    }
}
