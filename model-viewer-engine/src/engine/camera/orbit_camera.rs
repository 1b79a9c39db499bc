use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use constants::camera::{
    AUTO_ROTATE_SPEED, ORBIT_DOLLY_LINE_FACTOR, ORBIT_DOLLY_PIXEL_FACTOR, ORBIT_MAX_DISTANCE_RATIO,
    ORBIT_MIN_DISTANCE_RATIO, ORBIT_PITCH_LIMIT, ORBIT_PITCH_SENSITIVITY, ORBIT_SMOOTHING,
    ORBIT_YAW_SENSITIVITY,
};

/// Marker for the viewer's camera entity.
#[derive(Component)]
pub struct ViewerCamera;

/// Orbit rig state: the camera rotates and dollies around a focus point.
///
/// Framing rewrites focus and distance; interactive input only adjusts
/// angles and distance, so orbiting always pivots around the framed model
/// rather than the world origin.
#[derive(Resource)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub auto_rotate: bool,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            distance: 6.0,
            yaw: 0.78,
            pitch: -0.4,
            auto_rotate: false,
            min_distance: 0.1,
            max_distance: 500.0,
        }
    }
}

impl OrbitCamera {
    /// Re-anchor the rig around a freshly framed model.
    pub fn retarget(&mut self, focus: Vec3, distance: f32) {
        self.focus = focus;
        self.distance = distance;
        self.min_distance = distance * ORBIT_MIN_DISTANCE_RATIO;
        self.max_distance = distance * ORBIT_MAX_DISTANCE_RATIO;
    }

    /// Set angles so the camera sits along `direction` from the focus.
    pub fn set_view_direction(&mut self, direction: Vec3) {
        let dir = direction.normalize();
        self.yaw = dir.x.atan2(dir.z);
        self.pitch = -dir.y.asin();
    }

    /// Camera transform for the current rig state.
    pub fn transform(&self) -> Transform {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        let position = self.focus + rotation * (Vec3::Z * self.distance);
        Transform::from_translation(position).looking_at(self.focus, Vec3::Y)
    }
}

/// Interactive orbit controller: left-drag orbits, wheel dollies, and the
/// rig state is applied to the camera transform with smoothing.
pub fn orbit_camera_controller(
    mut rig: ResMut<OrbitCamera>,
    mut cameras: Query<&mut Transform, (With<Camera3d>, With<ViewerCamera>)>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = cameras.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let dragging = mouse_button.pressed(MouseButton::Left);
    if dragging && mouse_delta != Vec2::ZERO {
        rig.yaw -= mouse_delta.x * ORBIT_YAW_SENSITIVITY;
        rig.pitch -= mouse_delta.y * ORBIT_PITCH_SENSITIVITY;
        rig.pitch = rig.pitch.clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
    }

    // Wheel scroll accumulation (line and pixel scroll units).
    let mut scroll_accum = 0.0;
    for event in scroll_events.read() {
        scroll_accum += match event.unit {
            MouseScrollUnit::Line => event.y * ORBIT_DOLLY_LINE_FACTOR,
            MouseScrollUnit::Pixel => event.y * ORBIT_DOLLY_PIXEL_FACTOR,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        rig.distance =
            (rig.distance * (1.0 - scroll_accum)).clamp(rig.min_distance, rig.max_distance);
    }

    // Auto-rotate yields to active input.
    if rig.auto_rotate && !dragging {
        rig.yaw += AUTO_ROTATE_SPEED * time.delta_secs();
    }

    let target = rig.transform();
    let lerp_speed = (ORBIT_SMOOTHING * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-5;

    #[test]
    fn view_direction_round_trips_through_angles() {
        let mut rig = OrbitCamera::default();
        rig.retarget(Vec3::new(1.0, 2.0, 3.0), 10.0);
        rig.set_view_direction(Vec3::new(1.0, 0.6, 1.0));

        let position = rig.transform().translation;
        let expected = rig.focus + Vec3::new(1.0, 0.6, 1.0).normalize() * 10.0;
        assert!((position - expected).length() < TOLERANCE * 10.0);
    }

    #[test]
    fn retarget_scales_dolly_range() {
        let mut rig = OrbitCamera::default();
        rig.retarget(Vec3::ZERO, 100.0);
        assert!((rig.min_distance - 100.0 * ORBIT_MIN_DISTANCE_RATIO).abs() < TOLERANCE);
        assert!((rig.max_distance - 100.0 * ORBIT_MAX_DISTANCE_RATIO).abs() < TOLERANCE);
    }

    #[test]
    fn transform_looks_at_focus() {
        let mut rig = OrbitCamera::default();
        rig.retarget(Vec3::new(5.0, 0.0, -2.0), 4.0);
        let transform = rig.transform();
        let forward = transform.forward();
        let to_focus = (rig.focus - transform.translation).normalize();
        assert!((Vec3::from(forward) - to_focus).length() < TOLERANCE * 10.0);
    }
}
