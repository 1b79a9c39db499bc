use bevy::prelude::*;
use bevy::window::PresentMode;

/// Platform window configuration: canvas-bound on WASM, plain window on
/// native.
pub fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#viewer".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: String::from("Model Viewer"),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}
