//! Stagewire Protocol - Shared types for Engine and front-end communication
//!
//! This crate contains all types shared between the Engine (server) and the
//! stage/remote front ends:
//! - WebSocket message types (`RealtimeEvent`)
//! - The shared installation state snapshot (`InstallationState`)
//! - The static scene catalog and the scene-1 auto-play phrase list
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Stable wire format** - snake_case `type` tags, camelCase payload fields

pub mod messages;
pub mod scenes;
pub mod state;

pub use messages::{ClientRole, RealtimeEvent};
pub use scenes::{scene_exists, scenes, Scene, SCENE1_AUTO_PHRASES};
pub use state::InstallationState;
