use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::viewer_assets::CurrentModel;
use crate::engine::camera::framing::FrameRequest;
use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::loading::environment::EnvironmentFailed;
use crate::engine::loading::model_loader::{
    ActiveLoad, ModelLoadOutcome, ModelLoadRequest, VariantSelectRequest,
};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene::background::BackgroundSettings;
use crate::engine::scene::grid::GridSettings;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following the specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC traffic between the frontend and
/// the viewer: queued notifications and responses flushed once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send a notification to the frontend without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the RPC layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    notify_load_outcomes,
                    notify_loading_progress,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Shared inbox between the JS event listener and the app schedule.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Cheap pre-filter before JSON parsing on the app side.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    // Transfer closure ownership to JS so it outlives this system.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping the shared inbox for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut active: ResMut<ActiveLoad>,
    mut background: ResMut<BackgroundSettings>,
    mut grid: ResMut<GridSettings>,
    mut rig: ResMut<OrbitCamera>,
    mut load_requests: EventWriter<ModelLoadRequest>,
    mut variant_requests: EventWriter<VariantSelectRequest>,
    mut frame_requests: EventWriter<FrameRequest>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                let response = handle_rpc_request(
                    &request,
                    &diagnostics,
                    &mut active,
                    &mut background,
                    &mut grid,
                    &mut rig,
                    &mut load_requests,
                    &mut variant_requests,
                    &mut frame_requests,
                );
                if let Some(response) = response {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {parse_error}");
            }
        }
    }
}

/// Handle one RPC request and produce a response for calls carrying an id.
fn handle_rpc_request(
    request: &RpcRequest,
    diagnostics: &DiagnosticsStore,
    active: &mut ActiveLoad,
    background: &mut BackgroundSettings,
    grid: &mut GridSettings,
    rig: &mut OrbitCamera,
    load_requests: &mut EventWriter<ModelLoadRequest>,
    variant_requests: &mut EventWriter<VariantSelectRequest>,
    frame_requests: &mut EventWriter<FrameRequest>,
) -> Option<RpcResponse> {
    // Only calls with an id expect a response; notifications have none.
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "load_model" => handle_load_model(&request.params, load_requests),
        "cancel_load" => handle_cancel_load(active),
        "select_variant" => handle_select_variant(&request.params, variant_requests),
        "set_background" => handle_set_background(&request.params, background),
        "set_grid" => handle_set_grid(&request.params, grid),
        "set_auto_rotate" => handle_set_auto_rotate(&request.params, rig),
        "frame_camera" => handle_frame_camera(&request.params, frame_requests),
        "get_fps" => handle_get_fps(diagnostics),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({ "method": request.method })),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_load_model(
    params: &serde_json::Value,
    load_requests: &mut EventWriter<ModelLoadRequest>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct LoadModelParams {
        url: String,
        #[serde(default)]
        environment_url: Option<String>,
    }

    let params = serde_json::from_value::<LoadModelParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'url' parameter"))?;

    load_requests.write(ModelLoadRequest {
        url: params.url.clone(),
        cancel: None,
        environment_url: params.environment_url,
    });

    Ok(serde_json::json!({ "success": true, "url": params.url }))
}

fn handle_cancel_load(active: &mut ActiveLoad) -> Result<serde_json::Value, RpcError> {
    let cancelled = match &active.0 {
        Some(pending) => {
            pending.cancel.cancel();
            true
        }
        None => false,
    };
    Ok(serde_json::json!({ "cancelled": cancelled }))
}

fn handle_select_variant(
    params: &serde_json::Value,
    variant_requests: &mut EventWriter<VariantSelectRequest>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SelectVariantParams {
        index: usize,
    }

    let params = serde_json::from_value::<SelectVariantParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'index' parameter"))?;

    variant_requests.write(VariantSelectRequest {
        index: params.index,
    });
    Ok(serde_json::json!({ "success": true, "index": params.index }))
}

fn handle_set_background(
    params: &serde_json::Value,
    background: &mut BackgroundSettings,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetBackgroundParams {
        skybox: bool,
    }

    let params = serde_json::from_value::<SetBackgroundParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'skybox' parameter"))?;

    background.skybox_enabled = params.skybox;
    Ok(serde_json::json!({ "success": true, "skybox": params.skybox }))
}

fn handle_set_grid(
    params: &serde_json::Value,
    grid: &mut GridSettings,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetGridParams {
        visible: bool,
    }

    let params = serde_json::from_value::<SetGridParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'visible' parameter"))?;

    grid.visible = params.visible;
    Ok(serde_json::json!({ "success": true, "visible": params.visible }))
}

fn handle_set_auto_rotate(
    params: &serde_json::Value,
    rig: &mut OrbitCamera,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetAutoRotateParams {
        enabled: bool,
    }

    let params = serde_json::from_value::<SetAutoRotateParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'enabled' parameter"))?;

    rig.auto_rotate = params.enabled;
    Ok(serde_json::json!({ "success": true, "enabled": params.enabled }))
}

fn handle_frame_camera(
    params: &serde_json::Value,
    frame_requests: &mut EventWriter<FrameRequest>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize, Default)]
    struct FrameCameraParams {
        #[serde(default)]
        padding: Option<f32>,
    }

    let params = serde_json::from_value::<FrameCameraParams>(params.clone()).unwrap_or_default();
    let mut frame = FrameRequest::default();
    if let Some(padding) = params.padding {
        frame.padding = padding;
    }
    frame_requests.write(frame);
    Ok(serde_json::json!({ "success": true, "padding": frame.padding }))
}

fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({ "fps": fps }))
}

/// Forward load pipeline outcomes to the frontend.
fn notify_load_outcomes(
    mut outcomes: EventReader<ModelLoadOutcome>,
    mut environment_failures: EventReader<EnvironmentFailed>,
    current: Option<Res<CurrentModel>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for outcome in outcomes.read() {
        match &outcome.result {
            Ok(()) => {
                let (variants, animations) = current
                    .as_ref()
                    .map(|model| (model.variants.clone(), model.animations.len()))
                    .unwrap_or_default();
                rpc_interface.send_notification(
                    "model_loaded",
                    serde_json::json!({
                        "url": outcome.url,
                        "variants": variants,
                        "animations": animations,
                    }),
                );
            }
            Err(error) => {
                rpc_interface.send_notification(
                    "load_failed",
                    serde_json::json!({
                        "url": outcome.url,
                        "error": error.to_string(),
                        "cancelled": error.is_cancelled(),
                    }),
                );
            }
        }
    }

    for failure in environment_failures.read() {
        rpc_interface.send_notification(
            "environment_failed",
            serde_json::json!({ "message": failure.message }),
        );
    }
}

/// Push loading-stage changes to the frontend overlay.
fn notify_loading_progress(
    mut progress: ResMut<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !progress.dirty {
        return;
    }
    progress.dirty = false;

    let stages: Vec<serde_json::Value> = progress
        .stages
        .iter()
        .map(|(name, done)| serde_json::json!({ "name": name, "done": *done == 1 }))
        .collect();
    rpc_interface.send_notification(
        "loading_progress",
        serde_json::json!({ "url": progress.active_url, "stages": stages }),
    );
}

/// Send queued notifications and responses to the frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Notifications first, responses second, to keep ordering stable.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Create a standard error response with an optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send a serialised message to the parent window (the frontend).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rpc_requests() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"set_grid","params":{"visible":false},"id":7}"#,
        )
        .unwrap();
        assert_eq!(request.method, "set_grid");
        assert_eq!(request.id, Some(serde_json::json!(7)));
        assert_eq!(request.params["visible"], serde_json::json!(false));
    }

    #[test]
    fn notifications_have_no_id() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"set_grid","params":{"visible":true},"id":null}"#,
        )
        .unwrap();
        assert_eq!(request.id, Some(serde_json::Value::Null));
    }

    #[test]
    fn error_responses_follow_the_wire_format() {
        let response = create_error_response(
            serde_json::json!(3),
            -32601,
            "Method not found",
            Some(serde_json::json!({ "method": "bogus" })),
        );
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["jsonrpc"], "2.0");
        assert_eq!(wire["error"]["code"], -32601);
        assert_eq!(wire["error"]["data"]["method"], "bogus");
        assert_eq!(wire["result"], serde_json::Value::Null);
    }

    #[test]
    fn invalid_params_uses_the_reserved_code() {
        assert_eq!(RpcError::invalid_params("missing url").code, -32602);
    }
}
