//! Stagewire Engine library.
//!
//! This crate contains all server-side code for the installation:
//!
//! - `state` - the single source of truth for the shared installation state
//! - `api/` - HTTP and WebSocket entry points
//! - `heartbeat` - transport-level liveness probing

pub mod api;
pub mod heartbeat;
pub mod state;
