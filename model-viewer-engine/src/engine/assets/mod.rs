//! Asset data for the displayed model and viewer configuration.
//!
//! Holds the world-space bounding volume type, the JSON viewer manifest,
//! and the single display slot tracking the currently shown model.

/// World-space axis-aligned bounds over a model subtree.
pub mod bounds;

/// Viewer configuration manifest loaded from JSON.
pub mod model_library;

/// Resources tracking the displayed model and environment handles.
pub mod viewer_assets;
