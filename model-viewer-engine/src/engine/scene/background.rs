use bevy::core_pipeline::Skybox;
use bevy::prelude::*;

use constants::render_settings::SKYBOX_BRIGHTNESS;

use crate::engine::assets::viewer_assets::EnvironmentAssets;
use crate::engine::camera::orbit_camera::ViewerCamera;

/// Backdrop toggle: environment skybox when a probe exists and the toggle
/// is on, otherwise the solid clear colour the camera was spawned with.
#[derive(Resource)]
pub struct BackgroundSettings {
    pub skybox_enabled: bool,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            skybox_enabled: true,
        }
    }
}

pub fn apply_background_settings(
    settings: Res<BackgroundSettings>,
    environment: Res<EnvironmentAssets>,
    mut commands: Commands,
    cameras: Query<(Entity, Option<&Skybox>), (With<Camera3d>, With<ViewerCamera>)>,
) {
    if !settings.is_changed() && !environment.is_changed() {
        return;
    }

    for (entity, skybox) in &cameras {
        match (&environment.cubemap, settings.skybox_enabled) {
            (Some(cubemap), true) => {
                if skybox.is_none() {
                    commands.entity(entity).insert(Skybox {
                        image: cubemap.clone(),
                        brightness: SKYBOX_BRIGHTNESS,
                        rotation: Quat::IDENTITY,
                    });
                }
            }
            _ => {
                if skybox.is_some() {
                    commands.entity(entity).remove::<Skybox>();
                }
            }
        }
    }
}
