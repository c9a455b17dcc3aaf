//! Stagewire Client - connection manager for the stage and remote front ends.
//!
//! Both surfaces use the same contract: connect, declare a role, receive
//! events through a callback, and reconnect automatically whenever the
//! transport drops. The front ends themselves (rendering, controls) live
//! outside this crate and only consume it.

pub mod client;
pub mod connection;

pub use client::{RealtimeClient, RECONNECT_DELAY};
pub use connection::{ConnectionState, ConnectionStateObserver};
