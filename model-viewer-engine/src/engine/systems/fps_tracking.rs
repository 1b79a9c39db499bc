use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Component)]
pub struct FpsText;

/// Cadence of the `fps_update` notification to the frontend.
#[derive(Resource)]
pub struct FpsNotifyTimer(pub Timer);

impl Default for FpsNotifyTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(1.0, TimerMode::Repeating))
    }
}

/// Periodic FPS notification for the embedding frontend.
pub fn fps_notification_system(
    time: Res<Time>,
    mut timer: ResMut<FpsNotifyTimer>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|diagnostic| diagnostic.smoothed())
    else {
        return;
    };
    rpc_interface.send_notification("fps_update", serde_json::json!({ "fps": fps }));
}

/// Native overlay text update.
#[cfg(not(target_arch = "wasm32"))]
pub fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}
