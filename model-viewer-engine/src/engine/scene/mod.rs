//! Scene furniture around the displayed model.

/// Looped playback of the model's animation clips.
pub mod animation;

/// Solid colour vs environment skybox backdrop.
pub mod background;

/// Ground grid sized from the model's bounds.
pub mod grid;

/// Key light and ambient fill.
pub mod lighting;
