//! Shared constants for the model viewer workspace.
//!
//! Keeps camera framing, render settings, and asset path values in one
//! crate so the engine and any future tooling agree on them.

/// Camera framing and orbit controller tuning values.
pub mod camera;

/// Relative asset paths resolved by the engine's I/O layer.
pub mod path;

/// Lighting, background, and grid render settings.
pub mod render_settings;
