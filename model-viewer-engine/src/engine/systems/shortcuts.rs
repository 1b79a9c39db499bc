use bevy::prelude::*;

use crate::engine::camera::framing::FrameRequest;
use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::scene::background::BackgroundSettings;
use crate::engine::scene::grid::GridSettings;

/// Keyboard mirror of the RPC toggles, mainly for native development
/// builds: G grid, B background, R auto-rotate, F reframe.
pub fn viewer_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut grid: ResMut<GridSettings>,
    mut background: ResMut<BackgroundSettings>,
    mut rig: ResMut<OrbitCamera>,
    mut frames: EventWriter<FrameRequest>,
) {
    if keyboard.just_pressed(KeyCode::KeyG) {
        grid.visible = !grid.visible;
    }
    if keyboard.just_pressed(KeyCode::KeyB) {
        background.skybox_enabled = !background.skybox_enabled;
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        rig.auto_rotate = !rig.auto_rotate;
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        frames.write(FrameRequest::default());
    }
}
