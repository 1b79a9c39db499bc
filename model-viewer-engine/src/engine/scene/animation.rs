use bevy::animation::graph::{AnimationGraph, AnimationGraphHandle};
use bevy::animation::AnimationPlayer;
use bevy::prelude::*;

use crate::engine::assets::viewer_assets::CurrentModel;

/// Start looped playback of the document's first clip once the spawned
/// scene's animation players exist. Documents without clips are left
/// static.
pub fn start_model_animations(
    mut commands: Commands,
    current: Option<ResMut<CurrentModel>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    children: Query<&Children>,
    mut players: Query<&mut AnimationPlayer>,
) {
    let Some(mut current) = current else {
        return;
    };
    if current.animations_started || current.animations.is_empty() {
        return;
    }
    let Some(clip) = current.animations.first().cloned() else {
        return;
    };

    let mut started = false;
    for entity in children.iter_descendants(current.root) {
        let Ok(mut player) = players.get_mut(entity) else {
            continue;
        };
        let (graph, index) = AnimationGraph::from_clip(clip.clone());
        commands
            .entity(entity)
            .insert(AnimationGraphHandle(graphs.add(graph)));
        player.play(index).repeat();
        started = true;
    }

    if started {
        info!(
            "Animation playback started ({} clips in document)",
            current.animations.len()
        );
        current.animations_started = true;
    }
}
