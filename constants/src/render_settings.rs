use bevy::prelude::*;

/// Solid background used when the environment skybox is disabled.
pub const BACKGROUND_COLOUR: Color = Color::srgb(0.13, 0.14, 0.16);

/// Skybox brightness for the environment backdrop.
pub const SKYBOX_BRIGHTNESS: f32 = 1000.0;

/// Intensity of the view-level environment light probe.
pub const ENVIRONMENT_INTENSITY: f32 = 900.0;

/// Key light illuminance in lux.
pub const KEY_LIGHT_ILLUMINANCE: f32 = 12_000.0;

/// Key light orientation (ZYX euler, radians).
pub const KEY_LIGHT_EULER: (f32, f32, f32) = (0.0, 1.0, -std::f32::consts::FRAC_PI_4);

/// Ambient fill brightness.
pub const AMBIENT_BRIGHTNESS: f32 = 90.0;

/// Grid line colour (unlit, alpha blended).
pub const GRID_COLOUR: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);

/// Number of grid cells along each horizontal axis.
pub const GRID_LINE_COUNT: u32 = 20;

/// The grid extends this factor beyond the model's horizontal extent.
pub const GRID_EXTENT_FACTOR: f32 = 1.5;
