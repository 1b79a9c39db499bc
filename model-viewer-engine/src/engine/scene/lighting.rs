use bevy::prelude::*;

use constants::render_settings::{AMBIENT_BRIGHTNESS, KEY_LIGHT_EULER, KEY_LIGHT_ILLUMINANCE};

/// Key directional light with shadows plus an ambient fill.
pub fn spawn_lighting(commands: &mut Commands) {
    let (z, y, x) = KEY_LIGHT_EULER;
    commands.spawn((
        DirectionalLight {
            illuminance: KEY_LIGHT_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::ZYX, z, y, x)),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    });
}
