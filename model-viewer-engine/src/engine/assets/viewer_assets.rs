use bevy::gltf::Gltf;
use bevy::prelude::*;

/// Marker on the root entity of the displayed model's scene instance.
#[derive(Component)]
pub struct DisplayedModel;

/// The single display slot: the model this viewer currently shows.
///
/// Replaced wholesale when a new load resolves. The previous root entity is
/// despawned before the replacement spawns; GPU resources are reclaimed by
/// the asset system once the old handles drop.
#[derive(Resource)]
pub struct CurrentModel {
    pub url: String,
    pub gltf: Handle<Gltf>,
    pub root: Entity,
    /// Index into the document's scene list.
    pub variant: usize,
    /// Display names for the document's scenes.
    pub variants: Vec<String>,
    pub animations: Vec<Handle<AnimationClip>>,
    // Post-processing passes completed for the current subtree. Reset on
    // variant switches, which spawn a fresh subtree.
    pub materials_configured: bool,
    pub framed: bool,
    pub animations_started: bool,
}

/// Handles for the active environment map, if any.
///
/// `source` holds the raw strip image only until the probe is derived; it
/// is released immediately afterwards.
#[derive(Resource, Default)]
pub struct EnvironmentAssets {
    pub source: Option<Handle<Image>>,
    pub cubemap: Option<Handle<Image>>,
    /// Set once the pending source has been resolved one way or the other.
    pub settled: bool,
}
