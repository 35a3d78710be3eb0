//! JSON-RPC 2.0 communication layer for the embedding web page.
//!
//! The engine runs inside an iframe and exchanges JSON-RPC messages with the
//! parent window through `postMessage`. Requests carry an id and receive a
//! response; notifications have no id and never do.
//!
//! ```text
//! Page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Filter methods only queue an event. The resulting counts arrive in the
//! `visibility_changed` notification once the visibility systems have run.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Methods
//!
//! ### Visibility
//! - `update_year_visibility`: `{ "from": i32, "to": i32 }`, inclusive window
//! - `update_cluster_visibility`: `{ "clusters": [u32] }`, empty clears the filter
//! - `set_edge_cluster_policy`: `{ "policy": "both_endpoints" | "either_endpoint" }`
//! - `clear_filters`: show every well-formed node and edge again
//! - `get_visibility_stats`: visible counts, active window and selection
//!
//! ### Time Travel
//! - `time_travel`: `{ "action": "play" | "pause" | "reset" | "status" }`,
//!   `{ "action": "configure", "start_year", "end_year" }` or
//!   `{ "action": "speed", "years_per_second" }`
//!
//! ### Level of Detail
//! - `get_lod_state`: current/target tier, blend, sampled screen size, buffers
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications
//!
//! - `loading_progress`: emitted every frame until the graph is running
//! - `visibility_changed`: after any filter change
//! - `lod_changed`: when a tier transition completes
//! - `fps_update`: periodic frame rate

/// JSON-RPC 2.0 bidirectional communication system for the web page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
