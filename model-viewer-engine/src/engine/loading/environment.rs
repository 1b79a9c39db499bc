use bevy::asset::LoadState;
use bevy::pbr::environment_map::EnvironmentMapLight;
use bevy::prelude::*;
use bevy::render::render_resource::{TextureViewDescriptor, TextureViewDimension};

use constants::render_settings::ENVIRONMENT_INTENSITY;

use crate::engine::assets::viewer_assets::EnvironmentAssets;
use crate::engine::camera::orbit_camera::ViewerCamera;

/// A failed environment load is reported distinctly and never fails the
/// primary model load.
#[derive(Event, Debug, Clone)]
pub struct EnvironmentFailed {
    pub message: String,
}

/// A probe source must be a vertically stacked strip of six square faces.
pub fn is_cube_strip(width: u32, height: u32) -> bool {
    width > 0 && height == width * 6
}

/// Begin the secondary, independent environment-map load.
pub fn start_environment_load(
    environment: &mut EnvironmentAssets,
    asset_server: &AssetServer,
    url: &str,
) {
    info!("Loading environment map: {url}");
    environment.source = Some(asset_server.load(url.to_string()));
    environment.cubemap = None;
    environment.settled = false;
}

/// Derive a cube probe from the loaded source image and attach it to the
/// view as the environment light.
///
/// The source strip's backing memory is released as soon as the probe
/// exists; keeping it alive would leak GPU memory. Failure leaves the
/// displayed model's materials untouched.
pub fn apply_environment_probe(
    mut environment: ResMut<EnvironmentAssets>,
    mut images: ResMut<Assets<Image>>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    cameras: Query<Entity, (With<Camera3d>, With<ViewerCamera>)>,
    mut failures: EventWriter<EnvironmentFailed>,
) {
    if environment.settled {
        return;
    }
    let Some(source) = environment.source.clone() else {
        return;
    };

    match asset_server.get_load_state(&source) {
        Some(LoadState::Loaded) => {}
        Some(LoadState::Failed(error)) => {
            warn!("Environment map load failed: {error}");
            failures.write(EnvironmentFailed {
                message: error.to_string(),
            });
            environment.source = None;
            environment.settled = true;
            return;
        }
        _ => return,
    }

    let Some(mut probe) = images.get(&source).cloned() else {
        return;
    };

    let size = probe.texture_descriptor.size;
    if !is_cube_strip(size.width, size.height) {
        warn!(
            "Environment map is not a stacked cube strip ({}x{})",
            size.width, size.height
        );
        failures.write(EnvironmentFailed {
            message: format!("unsupported environment layout {}x{}", size.width, size.height),
        });
        images.remove(&source);
        environment.source = None;
        environment.settled = true;
        return;
    }

    probe.reinterpret_stacked_2d_as_array(6);
    probe.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    let cubemap = images.add(probe);

    for camera in &cameras {
        commands.entity(camera).insert(EnvironmentMapLight {
            diffuse_map: cubemap.clone(),
            specular_map: cubemap.clone(),
            intensity: ENVIRONMENT_INTENSITY,
            ..default()
        });
    }

    // The strip is baked into the probe now; holding the source any longer
    // doubles the GPU footprint.
    images.remove(&source);
    environment.source = None;
    environment.cubemap = Some(cubemap);
    environment.settled = true;
    info!("✓ Environment probe applied");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_cube_strips() {
        assert!(is_cube_strip(256, 1536));
        assert!(is_cube_strip(1, 6));
    }

    #[test]
    fn rejects_other_layouts() {
        // Equirectangular panoramas and plain squares are not probes.
        assert!(!is_cube_strip(2048, 1024));
        assert!(!is_cube_strip(512, 512));
        assert!(!is_cube_strip(0, 0));
    }
}
