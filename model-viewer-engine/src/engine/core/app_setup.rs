use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::assets::model_library::ViewerManifest;
use crate::engine::assets::viewer_assets::EnvironmentAssets;
use crate::engine::camera::framing::{FrameRequest, frame_displayed_model};
use crate::engine::camera::orbit_camera::{OrbitCamera, ViewerCamera, orbit_camera_controller};
use crate::engine::core::app_state::{
    AppState, ManifestLoader, start_manifest_load, transition_to_running,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::environment::{EnvironmentFailed, apply_environment_probe};
use crate::engine::loading::material_config::configure_model_materials;
use crate::engine::loading::model_loader::{
    ActiveLoad, ModelLoadOutcome, ModelLoadRequest, VariantSelectRequest, apply_variant_selection,
    begin_model_load, poll_model_load,
};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene::animation::start_model_animations;
use crate::engine::scene::background::{BackgroundSettings, apply_background_settings};
use crate::engine::scene::grid::{GridSettings, GridState, apply_grid_visibility, refresh_ground_grid};
use crate::engine::scene::lighting::spawn_lighting;
use crate::engine::systems::fps_tracking::{FpsNotifyTimer, fps_notification_system};
use crate::engine::systems::shortcuts::viewer_keyboard_shortcuts;
// Web RPC bridge
use crate::rpc::web_rpc::WebRpcPlugin;

use constants::camera::DEFAULT_FOV_DEGREES;
use constants::render_settings::BACKGROUND_COLOUR;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers the viewer configuration as a loadable asset type.
        .add_plugins(JsonAssetPlugin::<ViewerManifest>::new(&["json"]))
        .add_plugins(WebRpcPlugin);

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<ManifestLoader>()
        .init_resource::<ActiveLoad>()
        .init_resource::<EnvironmentAssets>()
        .init_resource::<OrbitCamera>()
        .init_resource::<GridSettings>()
        .init_resource::<GridState>()
        .init_resource::<BackgroundSettings>()
        .init_resource::<FpsNotifyTimer>()
        .add_event::<ModelLoadRequest>()
        .add_event::<ModelLoadOutcome>()
        .add_event::<VariantSelectRequest>()
        .add_event::<FrameRequest>()
        .add_event::<EnvironmentFailed>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_manifest_load).chain())
        .add_systems(
            Update,
            transition_to_running.run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            Update,
            (
                // Load pipeline - ordered so a model resolved this frame is
                // post-processed before it is framed.
                begin_model_load,
                poll_model_load,
                apply_variant_selection,
                configure_model_materials,
                apply_environment_probe,
                frame_displayed_model,
                refresh_ground_grid,
                start_model_animations,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(
            Update,
            (
                orbit_camera_controller,
                apply_background_settings,
                apply_grid_visibility,
                viewer_keyboard_shortcuts,
                fps_notification_system,
            )
                .run_if(in_state(AppState::Running)),
        );

    // Add fps_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        use crate::engine::systems::fps_tracking::fps_text_update_system;
        app.add_systems(Update, fps_text_update_system);
    }

    app
}

/// Startup system that only handles basic scene initialisation; models
/// arrive later through the load pipeline.
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_viewer_camera(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

fn spawn_viewer_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(BACKGROUND_COLOUR),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: DEFAULT_FOV_DEGREES.to_radians(),
            ..default()
        }),
        OrbitCamera::default().transform(),
        ViewerCamera,
    ));
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    use crate::engine::systems::fps_tracking::FpsText;

    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    // Loader accelerators (KTX2 + zstd transcoding, HDR decode) come from
    // the engine feature set and register once here; meta probing is
    // disabled for static web hosting.
    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
