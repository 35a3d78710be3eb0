use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::geometry::{ClusterId, GraphGeometry};
use crate::engine::lod::LodController;
use crate::engine::systems::fps_tracking::smoothed_fps;
use crate::engine::systems::visibility_sync::{TimeTravelEvent, VisibilityFilterEvent};
use crate::engine::visibility::{ClusterSelection, EdgeClusterPolicy, TimeTravel, VisibilityEngine};

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
    #[serde(default)]
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

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    pub fn pending_notifications(&self) -> usize {
        self.outgoing_notifications.len()
    }

    /// Queue response for transmission to the page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
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

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Only string payloads that look like JSON-RPC are queued.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref()) {
                error!("Failed to register message listener: {:?}", e);
            }
        }
        None => error!("Window object not available; RPC listener not installed"),
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the page.
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

/// Read-only engine state a request may need, plus the events it produces.
/// Filter changes are applied by the visibility systems later in the frame.
pub struct RpcContext<'a> {
    pub fps: Option<f64>,
    pub now: f64,
    pub geometry: &'a GraphGeometry,
    pub visibility: &'a VisibilityEngine,
    pub lod: &'a LodController,
    pub time_travel: &'a TimeTravel,
    pub filter_events: Vec<VisibilityFilterEvent>,
    pub time_travel_events: Vec<TimeTravelEvent>,
}

#[allow(clippy::too_many_arguments)]
fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    diagnostics: Res<DiagnosticsStore>,
    time: Res<Time>,
    geometry: Res<GraphGeometry>,
    visibility: Res<VisibilityEngine>,
    lod: Res<LodController>,
    time_travel: Res<TimeTravel>,
    mut filter_writer: EventWriter<VisibilityFilterEvent>,
    mut time_travel_writer: EventWriter<TimeTravelEvent>,
) {
    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.queue_response(create_error_response(
                    serde_json::Value::Null,
                    -32700,
                    "Parse error",
                    Some(serde_json::json!({ "detail": parse_error.to_string() })),
                ));
                continue;
            }
        };
        debug!("RPC {}", request.method);

        let mut context = RpcContext {
            fps: smoothed_fps(&diagnostics),
            now: time.elapsed_secs_f64(),
            geometry: &geometry,
            visibility: &visibility,
            lod: &lod,
            time_travel: &time_travel,
            filter_events: Vec::new(),
            time_travel_events: Vec::new(),
        };
        let response = handle_rpc_request(&request, &mut context);

        filter_writer.write_batch(context.filter_events);
        time_travel_writer.write_batch(context.time_travel_events);
        if let Some(response) = response {
            rpc_interface.queue_response(response);
        }
    }
}

/// Run one request. Requests without an id are notifications: the method
/// still runs but nothing is sent back.
pub fn handle_rpc_request(request: &RpcRequest, context: &mut RpcContext) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "update_year_visibility" => handle_update_year_visibility(&request.params, context),
        "update_cluster_visibility" => handle_update_cluster_visibility(&request.params, context),
        "set_edge_cluster_policy" => handle_set_edge_cluster_policy(&request.params, context),
        "clear_filters" => {
            context.filter_events.push(VisibilityFilterEvent::Clear);
            Ok(serde_json::json!({ "accepted": true }))
        }
        "get_visibility_stats" => handle_get_visibility_stats(context),
        "get_lod_state" => serde_json::to_value(context.lod.state(context.now))
            .map_err(|e| RpcError::internal_error(&e.to_string())),
        "time_travel" => handle_time_travel(&request.params, context),
        "get_fps" => Ok(serde_json::json!({ "fps": context.fps.unwrap_or(0.0) as f32 })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({ "method": request.method })),
            })
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn handle_update_year_visibility(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct YearParams {
        from: i32,
        to: i32,
    }

    let YearParams { from, to } = serde_json::from_value(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected integer 'from' and 'to' parameters"))?;
    context.filter_events.push(VisibilityFilterEvent::YearRange { from, to });

    Ok(serde_json::json!({ "accepted": true, "from": from, "to": to }))
}

fn handle_update_cluster_visibility(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ClusterParams {
        clusters: Vec<u32>,
    }

    let ClusterParams { clusters } = serde_json::from_value(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'clusters' array of cluster ids"))?;
    let count = clusters.len();
    let selection: ClusterSelection = clusters.into_iter().map(ClusterId).collect();
    context.filter_events.push(VisibilityFilterEvent::Clusters(selection));

    Ok(serde_json::json!({ "accepted": true, "selected_clusters": count }))
}

fn handle_set_edge_cluster_policy(
    params: &serde_json::Value,
    context: &mut RpcContext,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct PolicyParams {
        policy: EdgeClusterPolicy,
    }

    let PolicyParams { policy } = serde_json::from_value(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'policy': \"both_endpoints\" or \"either_endpoint\"")
    })?;
    context.filter_events.push(VisibilityFilterEvent::EdgePolicy(policy));

    Ok(serde_json::json!({ "accepted": true, "policy": policy }))
}

fn handle_get_visibility_stats(context: &RpcContext) -> Result<serde_json::Value, RpcError> {
    let stats = context.visibility.stats(context.geometry);
    let mut clusters: Vec<u32> = context
        .geometry
        .nodes
        .as_ref()
        .map(|nodes| {
            nodes
                .records()
                .iter()
                .filter_map(|r| r.cluster)
                .filter(|c| context.visibility.selection().contains(*c))
                .map(|c| c.0)
                .collect()
        })
        .unwrap_or_default();
    clusters.sort_unstable();
    clusters.dedup();

    Ok(serde_json::json!({
        "initialized": context.visibility.is_initialized(),
        "stats": stats,
        "year_range": context.visibility.year_range(),
        "selected_clusters": clusters,
        "edge_cluster_policy": context.visibility.edge_cluster_policy(),
    }))
}

fn handle_time_travel(params: &serde_json::Value, context: &mut RpcContext) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    #[serde(tag = "action", rename_all = "snake_case")]
    enum TimeTravelParams {
        Play,
        Pause,
        Reset,
        Configure { start_year: i32, end_year: i32 },
        Speed { years_per_second: f32 },
        Status,
    }

    let action = serde_json::from_value::<TimeTravelParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'action': play, pause, reset, configure, speed or status")
    })?;
    let event = match action {
        TimeTravelParams::Play => Some(TimeTravelEvent::Play),
        TimeTravelParams::Pause => Some(TimeTravelEvent::Pause),
        TimeTravelParams::Reset => Some(TimeTravelEvent::Reset),
        TimeTravelParams::Configure { start_year, end_year } => {
            Some(TimeTravelEvent::Configure { start_year, end_year })
        }
        TimeTravelParams::Speed { years_per_second } if years_per_second.is_finite() && years_per_second >= 0.0 => {
            Some(TimeTravelEvent::SetSpeed(years_per_second))
        }
        TimeTravelParams::Speed { .. } => {
            return Err(RpcError::invalid_params("'years_per_second' must be a non-negative number"));
        }
        TimeTravelParams::Status => None,
    };
    let accepted = event.is_some();
    context.time_travel_events.extend(event);

    Ok(serde_json::json!({
        "accepted": accepted,
        "state": context.time_travel.state(),
        "current_year": context.time_travel.current_year(),
    }))
}

/// Create standardized error response with optional data payload.
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

/// Send queued notifications and responses to the page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Notifications first, then responses, to keep ordering stable.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
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
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
