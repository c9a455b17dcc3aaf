//! The engine-side single source of truth for the shared installation state.

use tokio::sync::Mutex;

use stagewire_protocol::{InstallationState, RealtimeEvent};

/// Owns the one canonical [`InstallationState`] of the process.
///
/// The event router is the only caller of [`StateAuthority::apply`]; every
/// other consumer gets read-only snapshots. The state is not persisted, so
/// an engine restart resets it to defaults.
pub struct StateAuthority {
    state: Mutex<InstallationState>,
}

impl StateAuthority {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InstallationState::default()),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> InstallationState {
        *self.state.lock().await
    }

    /// Apply a state-mutating event. Non-mutating events are ignored.
    ///
    /// Switching to any scene other than 1 also clears the scene-1 auto
    /// flag: the manual sequence restarts if the show returns to scene 1.
    /// Returns the state after the event.
    pub async fn apply(&self, event: &RealtimeEvent) -> InstallationState {
        let mut state = self.state.lock().await;
        match event {
            RealtimeEvent::SceneChange { scene_id } => {
                state.current_scene = *scene_id;
                if *scene_id != 1 {
                    state.scene1_auto_enabled = false;
                }
            }
            RealtimeEvent::VolumeChange { volume } => {
                state.volume = *volume;
            }
            RealtimeEvent::Scene1Complete => {
                state.scene1_auto_enabled = true;
            }
            _ => {}
        }
        *state
    }
}

impl Default for StateAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_scene_tracks_last_applied_change() {
        let authority = StateAuthority::new();
        for id in [3, 1, 4, 2] {
            authority
                .apply(&RealtimeEvent::SceneChange { scene_id: id })
                .await;
        }
        assert_eq!(authority.snapshot().await.current_scene, 2);
    }

    #[tokio::test]
    async fn leaving_scene_1_clears_auto_flag() {
        let authority = StateAuthority::new();
        authority.apply(&RealtimeEvent::Scene1Complete).await;
        assert!(authority.snapshot().await.scene1_auto_enabled);

        let after = authority
            .apply(&RealtimeEvent::SceneChange { scene_id: 2 })
            .await;
        assert!(!after.scene1_auto_enabled);
    }

    #[tokio::test]
    async fn returning_to_scene_1_keeps_auto_flag_untouched() {
        let authority = StateAuthority::new();
        authority.apply(&RealtimeEvent::Scene1Complete).await;
        let after = authority
            .apply(&RealtimeEvent::SceneChange { scene_id: 1 })
            .await;
        assert!(after.scene1_auto_enabled);
    }

    #[tokio::test]
    async fn scene1_complete_always_enables_auto() {
        let authority = StateAuthority::new();
        assert!(!authority.snapshot().await.scene1_auto_enabled);
        let after = authority.apply(&RealtimeEvent::Scene1Complete).await;
        assert!(after.scene1_auto_enabled);
    }

    #[tokio::test]
    async fn volume_is_last_write_wins() {
        let authority = StateAuthority::new();
        authority
            .apply(&RealtimeEvent::VolumeChange { volume: 0.2 })
            .await;
        authority
            .apply(&RealtimeEvent::VolumeChange { volume: 0.6 })
            .await;
        assert_eq!(authority.snapshot().await.volume, 0.6);
    }

    #[tokio::test]
    async fn non_mutating_events_leave_state_alone() {
        let authority = StateAuthority::new();
        let before = authority.snapshot().await;
        authority.apply(&RealtimeEvent::Heartbeat).await;
        authority
            .apply(&RealtimeEvent::PhraseTrigger {
                phrase_text: "Hola".to_string(),
                scene_id: 2,
            })
            .await;
        assert_eq!(authority.snapshot().await, before);
    }
}
