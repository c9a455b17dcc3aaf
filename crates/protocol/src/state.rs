//! Shared installation state snapshot.

use serde::{Deserialize, Serialize};

/// The small control state every surface agrees on.
///
/// Exactly one live instance exists per engine process, owned by the
/// engine's state authority. Clients only ever see copies of it inside
/// `state_sync` messages. Not persisted: an engine restart resets it to
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationState {
    /// Id of the currently active scene
    pub current_scene: u32,
    /// Playback volume, 0.0 to 1.0
    pub volume: f64,
    /// Scene 1's manual phrase sequence is exhausted; auto playback may proceed
    pub scene1_auto_enabled: bool,
}

impl Default for InstallationState {
    fn default() -> Self {
        Self {
            current_scene: 1,
            volume: 0.8,
            scene1_auto_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_installation() {
        let state = InstallationState::default();
        assert_eq!(state.current_scene, 1);
        assert_eq!(state.volume, 0.8);
        assert!(!state.scene1_auto_enabled);
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let json = serde_json::to_value(InstallationState::default()).unwrap();
        assert_eq!(json["currentScene"], 1);
        assert_eq!(json["volume"], 0.8);
        assert_eq!(json["scene1AutoEnabled"], false);
    }
}
