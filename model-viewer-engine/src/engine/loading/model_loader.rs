use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::assets::viewer_assets::{CurrentModel, DisplayedModel, EnvironmentAssets};
use crate::engine::loading::cancel::CancelToken;
use crate::engine::loading::environment::start_environment_load;
use crate::engine::loading::error::LoadError;
use crate::engine::loading::progress::LoadingProgress;

/// Request to load and display a model by URL.
///
/// One request yields exactly one outcome: a displayed model, `Cancelled`,
/// or `LoadFailed`. The URL is an opaque identifier resolved by the asset
/// I/O layer; no validation happens here.
#[derive(Event, Debug, Clone)]
pub struct ModelLoadRequest {
    pub url: String,
    /// Caller-supplied cancellation handle; one is created when absent so
    /// the frontend can always cancel the active load.
    pub cancel: Option<CancelToken>,
    /// Optional secondary load for image-based lighting.
    pub environment_url: Option<String>,
}

/// Outcome of a finished (or abandoned) request.
#[derive(Event, Debug, Clone)]
pub struct ModelLoadOutcome {
    pub url: String,
    pub result: Result<(), LoadError>,
}

/// Request to swap the displayed document scene without re-fetching.
#[derive(Event, Debug, Clone, Copy)]
pub struct VariantSelectRequest {
    pub index: usize,
}

/// The single in-flight load slot.
#[derive(Resource, Default)]
pub struct ActiveLoad(pub Option<PendingLoad>);

pub struct PendingLoad {
    pub url: String,
    pub gltf: Handle<Gltf>,
    pub cancel: CancelToken,
    pub environment_url: Option<String>,
}

/// Where a pending load stands this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    InFlight,
    Ready,
    Cancelled,
    Failed(String),
}

/// Classify a pending load. The cancellation check strictly precedes the
/// backend state check, so a cancelled request can never surface as
/// `LoadFailed` or as a resolved model.
pub fn classify_pending(cancelled: bool, state: Option<&LoadState>) -> PendingState {
    if cancelled {
        return PendingState::Cancelled;
    }
    match state {
        Some(LoadState::Loaded) => PendingState::Ready,
        Some(LoadState::Failed(error)) => PendingState::Failed(error.to_string()),
        _ => PendingState::InFlight,
    }
}

/// Intake system: issue exactly one backend load per request.
pub fn begin_model_load(
    mut requests: EventReader<ModelLoadRequest>,
    mut active: ResMut<ActiveLoad>,
    mut outcomes: EventWriter<ModelLoadOutcome>,
    mut progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
) {
    for request in requests.read() {
        // The viewer has one display slot, so a new request replaces any
        // pending one rather than racing it.
        if let Some(previous) = active.0.take() {
            previous.cancel.cancel();
            outcomes.write(ModelLoadOutcome {
                url: previous.url,
                result: Err(LoadError::Cancelled),
            });
        }

        info!("Loading model: {}", request.url);
        let gltf = asset_server.load::<Gltf>(request.url.clone());
        progress.begin_model(&request.url);
        active.0 = Some(PendingLoad {
            url: request.url.clone(),
            gltf,
            cancel: request.cancel.clone().unwrap_or_default(),
            environment_url: request.environment_url.clone(),
        });
    }
}

/// Poll the in-flight load and display the model once the backend resolves.
///
/// A cancelled load is abandoned here: dropping the handle discards
/// whatever the backend still produces (best-effort cancellation).
pub fn poll_model_load(
    mut active: ResMut<ActiveLoad>,
    mut commands: Commands,
    mut outcomes: EventWriter<ModelLoadOutcome>,
    mut progress: ResMut<LoadingProgress>,
    mut environment: ResMut<EnvironmentAssets>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    current: Option<Res<CurrentModel>>,
) {
    let Some(pending) = active.0.take() else {
        return;
    };

    let state = asset_server.get_load_state(&pending.gltf);
    match classify_pending(pending.cancel.is_cancelled(), state.as_ref()) {
        PendingState::InFlight => {
            active.0 = Some(pending);
        }
        PendingState::Cancelled => {
            info!("Model load cancelled: {}", pending.url);
            progress.finish_model();
            outcomes.write(ModelLoadOutcome {
                url: pending.url,
                result: Err(LoadError::Cancelled),
            });
        }
        PendingState::Failed(message) => {
            warn!("Model load failed: {}: {}", pending.url, message);
            progress.finish_model();
            outcomes.write(ModelLoadOutcome {
                url: pending.url,
                result: Err(LoadError::LoadFailed(message)),
            });
        }
        PendingState::Ready => {
            let Some(gltf) = gltf_assets.get(&pending.gltf) else {
                active.0 = Some(pending);
                return;
            };
            let Some(scene) = default_scene(gltf) else {
                warn!("Model has no scenes: {}", pending.url);
                progress.finish_model();
                outcomes.write(ModelLoadOutcome {
                    url: pending.url,
                    result: Err(LoadError::LoadFailed(String::from(
                        "document contains no scenes",
                    ))),
                });
                return;
            };

            // Explicit disposal of the previous display slot before the
            // replacement spawns.
            if let Some(ref current) = current {
                commands.entity(current.root).despawn();
            }

            let variant = variant_index_of(gltf, &scene);
            let root = spawn_model_root(&mut commands, scene);
            commands.insert_resource(CurrentModel {
                url: pending.url.clone(),
                gltf: pending.gltf.clone(),
                root,
                variant,
                variants: variant_names(gltf),
                animations: gltf.animations.clone(),
                materials_configured: false,
                framed: false,
                animations_started: false,
            });

            if let Some(url) = &pending.environment_url {
                start_environment_load(&mut environment, &asset_server, url);
            }

            progress.stage_done("Model");
            info!("✓ Model resolved: {}", pending.url);
            outcomes.write(ModelLoadOutcome {
                url: pending.url,
                result: Ok(()),
            });
        }
    }
}

/// Swap the displayed scene for another of the document's scenes. The new
/// subtree gets a fresh material pass and a fresh framing pass.
pub fn apply_variant_selection(
    mut requests: EventReader<VariantSelectRequest>,
    mut commands: Commands,
    current: Option<ResMut<CurrentModel>>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    let Some(mut current) = current else {
        requests.clear();
        return;
    };

    for request in requests.read() {
        let Some(gltf) = gltf_assets.get(&current.gltf) else {
            continue;
        };
        let Some(scene) = gltf.scenes.get(request.index) else {
            warn!(
                "Variant {} out of range ({} scenes)",
                request.index,
                gltf.scenes.len()
            );
            continue;
        };

        commands.entity(current.root).despawn();
        current.root = spawn_model_root(&mut commands, scene.clone());
        current.variant = request.index;
        current.materials_configured = false;
        current.framed = false;
        current.animations_started = false;
        info!("Variant {} selected", request.index);
    }
}

fn spawn_model_root(commands: &mut Commands, scene: Handle<Scene>) -> Entity {
    commands
        .spawn((
            SceneRoot(scene),
            Transform::default(),
            Visibility::default(),
            DisplayedModel,
        ))
        .id()
}

fn default_scene(gltf: &Gltf) -> Option<Handle<Scene>> {
    gltf.default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
}

fn variant_index_of(gltf: &Gltf, scene: &Handle<Scene>) -> usize {
    gltf.scenes
        .iter()
        .position(|candidate| candidate == scene)
        .unwrap_or(0)
}

/// Display names for the document's scenes, falling back to the index for
/// unnamed ones.
fn variant_names(gltf: &Gltf) -> Vec<String> {
    gltf.scenes
        .iter()
        .enumerate()
        .map(|(index, handle)| {
            gltf.named_scenes
                .iter()
                .find(|(_, named)| **named == *handle)
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| format!("scene {index}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_wins_over_every_backend_state() {
        assert_eq!(
            classify_pending(true, Some(&LoadState::Loaded)),
            PendingState::Cancelled
        );
        assert_eq!(
            classify_pending(true, Some(&LoadState::Loading)),
            PendingState::Cancelled
        );
        assert_eq!(classify_pending(true, None), PendingState::Cancelled);
    }

    #[test]
    fn unresolved_states_stay_in_flight() {
        assert_eq!(classify_pending(false, None), PendingState::InFlight);
        assert_eq!(
            classify_pending(false, Some(&LoadState::NotLoaded)),
            PendingState::InFlight
        );
        assert_eq!(
            classify_pending(false, Some(&LoadState::Loading)),
            PendingState::InFlight
        );
    }

    #[test]
    fn loaded_state_is_ready_when_not_cancelled() {
        assert_eq!(
            classify_pending(false, Some(&LoadState::Loaded)),
            PendingState::Ready
        );
    }
}
