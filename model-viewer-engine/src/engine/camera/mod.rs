/// Padded-distance framing of the displayed model.
pub mod framing;

/// Orbit rig state and interactive controller.
pub mod orbit_camera;
