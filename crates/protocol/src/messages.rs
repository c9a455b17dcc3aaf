//! WebSocket message types for Engine-frontend communication
//!
//! This module contains all message types exchanged over the WebSocket
//! connection. These types are used by both the Engine (sending `state_sync`
//! and relays, receiving everything else) and the front ends (sending control
//! events, receiving relays and `state_sync`).

use serde::{Deserialize, Serialize};

use crate::state::InstallationState;

/// Declared identity of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// A control surface (phone / tablet)
    Remote,
    /// The presentation surface
    Stage,
}

impl ClientRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientRole::Remote => "remote",
            ClientRole::Stage => "stage",
        }
    }
}

/// Messages exchanged over the realtime WebSocket.
///
/// Wire format: `{"type": "<snake_case tag>", ...camelCase fields}`.
/// All variants flow client → server except `StateSync`, which is
/// server → client only (and the first message on every new connection).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RealtimeEvent {
    /// Declare this connection's role. Sent immediately after the socket opens.
    ClientIdentify { role: ClientRole },
    /// Switch the installation to another scene
    #[serde(rename_all = "camelCase")]
    SceneChange { scene_id: u32 },
    /// Fire a one-shot phrase animation on the stage
    #[serde(rename_all = "camelCase")]
    PhraseTrigger { phrase_text: String, scene_id: u32 },
    /// Scene 1's manual phrase sequence is exhausted; auto playback may proceed
    Scene1Complete,
    /// Adjust the installation volume (0.0 to 1.0)
    VolumeChange { volume: f64 },
    /// Application-level liveness ping; the server echoes it back
    Heartbeat,
    /// Full snapshot of the shared installation state (server → client only)
    StateSync { state: InstallationState },

    /// Forward compatibility: any unrecognized `type` tag lands here
    #[serde(other)]
    Unknown,
}

impl RealtimeEvent {
    /// Whether this event mutates the shared installation state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            RealtimeEvent::SceneChange { .. }
                | RealtimeEvent::VolumeChange { .. }
                | RealtimeEvent::Scene1Complete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_change_wire_format_uses_camel_case_fields() {
        let event = RealtimeEvent::SceneChange { scene_id: 3 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "scene_change");
        assert_eq!(json["sceneId"], 3);
    }

    #[test]
    fn phrase_trigger_round_trips() {
        let json = r#"{"type":"phrase_trigger","phraseText":"Hola","sceneId":2}"#;
        let event: RealtimeEvent = serde_json::from_str(json).unwrap();
        match event {
            RealtimeEvent::PhraseTrigger {
                phrase_text,
                scene_id,
            } => {
                assert_eq!(phrase_text, "Hola");
                assert_eq!(scene_id, 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn client_identify_roles_serialize_lowercase() {
        let event = RealtimeEvent::ClientIdentify {
            role: ClientRole::Stage,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "client_identify");
        assert_eq!(json["role"], "stage");

        let back: RealtimeEvent =
            serde_json::from_str(r#"{"type":"client_identify","role":"remote"}"#).unwrap();
        assert!(matches!(
            back,
            RealtimeEvent::ClientIdentify {
                role: ClientRole::Remote
            }
        ));
    }

    #[test]
    fn state_sync_carries_full_snapshot() {
        let json = r#"{"type":"state_sync","state":{"currentScene":2,"volume":0.5,"scene1AutoEnabled":true}}"#;
        let event: RealtimeEvent = serde_json::from_str(json).unwrap();
        match event {
            RealtimeEvent::StateSync { state } => {
                assert_eq!(state.current_scene, 2);
                assert_eq!(state.volume, 0.5);
                assert!(state.scene1_auto_enabled);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_deserializes_to_unknown_variant() {
        let event: RealtimeEvent =
            serde_json::from_str(r#"{"type":"take_photo","payload":{}}"#).unwrap();
        assert!(matches!(event, RealtimeEvent::Unknown));
    }

    #[test]
    fn mutating_classification() {
        assert!(RealtimeEvent::SceneChange { scene_id: 2 }.is_mutating());
        assert!(RealtimeEvent::VolumeChange { volume: 0.3 }.is_mutating());
        assert!(RealtimeEvent::Scene1Complete.is_mutating());
        assert!(!RealtimeEvent::Heartbeat.is_mutating());
        assert!(!RealtimeEvent::PhraseTrigger {
            phrase_text: "x".into(),
            scene_id: 1
        }
        .is_mutating());
    }
}
