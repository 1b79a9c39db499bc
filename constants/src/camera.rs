use bevy::math::Vec3;

/// Padding factor applied to the framing distance. 1.0 fills the vertical
/// extent of the frame exactly with the model's largest dimension; values
/// above 1.0 leave a visual margin.
pub const DEFAULT_FRAMING_PADDING: f32 = 1.25;

/// Fixed oblique viewing direction for the three-quarter framing view.
/// Normalised at use; not configurable per object.
pub const FRAMING_DIRECTION: Vec3 = Vec3::new(1.0, 0.6, 1.0);

/// Near plane is the framing distance divided by this, far plane the
/// framing distance multiplied by [`FAR_PLANE_MULTIPLIER`]. Scale-relative
/// planes keep depth precision adequate at any model size.
pub const NEAR_PLANE_DIVISOR: f32 = 100.0;
pub const FAR_PLANE_MULTIPLIER: f32 = 100.0;

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 60.0;

// Orbit controller tuning.
pub const ORBIT_YAW_SENSITIVITY: f32 = 0.005;
pub const ORBIT_PITCH_SENSITIVITY: f32 = 0.004;
/// Pitch stays short of the poles so the look-at basis never degenerates.
pub const ORBIT_PITCH_LIMIT: f32 = 1.55;
pub const ORBIT_DOLLY_LINE_FACTOR: f32 = 0.1;
pub const ORBIT_DOLLY_PIXEL_FACTOR: f32 = 0.005;
pub const ORBIT_SMOOTHING: f32 = 12.0;

/// Dolly range as fractions of the framing distance.
pub const ORBIT_MIN_DISTANCE_RATIO: f32 = 0.05;
pub const ORBIT_MAX_DISTANCE_RATIO: f32 = 20.0;

/// Auto-rotate angular speed in radians per second.
pub const AUTO_ROTATE_SPEED: f32 = 0.3;
