//! Sound effect routing
//!
//! The mixer decides what to play and at what volume; actually producing
//! audio is behind the [`AudioSink`] trait so the host can plug in whatever
//! backend it has. Playback is fire and forget - a failing sink logs and the
//! game keeps running.

use crate::pause::PauseEvent;
use crate::stage::{GameStage, Rarity, Substate};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSound {
    /// Menu opened or tab switched
    MenuTick,
    /// Menu control activated
    MenuConfirm,
    /// Resume countdown step ("3", "2", "1")
    CountdownTick,
    /// Countdown finished ("GO")
    CountdownGo,
    /// Level-up prompt opened
    LevelUp,
    /// Wave goal reached
    WaveClear,
    /// Epic drop or milestone wave landed
    DropRare,
    /// Environmental event started
    EventSiren,
    /// Player took a hit
    PlayerHit,
    /// Run ended
    GameOver,
}

/// Playback backend. Implementations must not block the caller.
pub trait AudioSink {
    /// Play one effect at the given volume in [0, 1]. Errors are the sink's
    /// own; the mixer logs and drops them.
    fn play(&mut self, sound: GameSound, volume: f32) -> Result<(), String>;
}

/// Sink that discards everything; used headless and in tests
#[derive(Debug, Default)]
pub struct NullSink {
    pub played: Vec<GameSound>,
}

impl AudioSink for NullSink {
    fn play(&mut self, sound: GameSound, _volume: f32) -> Result<(), String> {
        self.played.push(sound);
        Ok(())
    }
}

/// Volume state and event-to-sound mapping
pub struct AudioMixer<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioMixer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, sound: GameSound) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(err) = self.sink.play(sound, vol) {
            log::warn!("audio sink failed to play {sound:?}: {err}");
        }
    }

    /// Route a pause-menu event to its sound, if it has one
    pub fn on_pause_event(&mut self, event: &PauseEvent) {
        let sound = match event {
            PauseEvent::MenuOpened | PauseEvent::MenuClosed | PauseEvent::TabChanged(_) => {
                Some(GameSound::MenuTick)
            }
            PauseEvent::ControlActivated(_) | PauseEvent::LanguageChanged(_) => {
                Some(GameSound::MenuConfirm)
            }
            PauseEvent::CountdownStep("GO") => Some(GameSound::CountdownGo),
            PauseEvent::CountdownStep(_) => Some(GameSound::CountdownTick),
            _ => None,
        };
        if let Some(sound) = sound {
            self.play(sound);
        }
    }

    /// Play transition sounds for a stage change
    pub fn on_stage_change(&mut self, before: &GameStage, after: &GameStage) {
        match (before, after) {
            (GameStage::Gameplay(prev), GameStage::Gameplay(next)) => {
                if prev.substate != Substate::GameOver && next.substate == Substate::GameOver {
                    self.play(GameSound::GameOver);
                    return;
                }
                if prev.level_up.is_none() && next.level_up.is_some() {
                    self.play(GameSound::LevelUp);
                }
                if next.wave.index > prev.wave.index {
                    self.play(GameSound::WaveClear);
                }
                if prev.event.is_none() && next.event.is_some() {
                    self.play(GameSound::EventSiren);
                }
                if next.notifications.len() > prev.notifications.len()
                    && next.notifications.last().map(|n| n.rarity) == Some(Rarity::Epic)
                {
                    self.play(GameSound::DropRare);
                }
                if next.resources.hp < prev.resources.hp {
                    self.play(GameSound::PlayerHit);
                }
            }
            (GameStage::Gameplay(_), GameStage::Results(_)) => {
                self.play(GameSound::MenuConfirm);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{Action, reduce};

    fn mixer() -> AudioMixer<NullSink> {
        AudioMixer::new(NullSink::default())
    }

    #[test]
    fn test_muted_mixer_plays_nothing() {
        let mut m = mixer();
        m.set_muted(true);
        m.play(GameSound::WaveClear);
        assert!(m.sink.played.is_empty());
    }

    #[test]
    fn test_zero_master_volume_plays_nothing() {
        let mut m = mixer();
        m.set_master_volume(0.0);
        m.play(GameSound::WaveClear);
        assert!(m.sink.played.is_empty());
    }

    #[test]
    fn test_countdown_events_map_to_tick_and_go() {
        let mut m = mixer();
        m.on_pause_event(&PauseEvent::CountdownStep("3"));
        m.on_pause_event(&PauseEvent::CountdownStep("GO"));
        assert_eq!(
            m.sink.played,
            vec![GameSound::CountdownTick, GameSound::CountdownGo]
        );
    }

    #[test]
    fn test_game_over_transition_plays_once() {
        let mut m = mixer();
        let menu = GameStage::StartMenu { can_continue: false };
        let before = reduce(reduce(menu, Action::StartNewRun), Action::SkipTutorial);
        let after = reduce(before.clone(), Action::GameOver);
        m.on_stage_change(&before, &after);
        assert_eq!(m.sink.played, vec![GameSound::GameOver]);
    }
}
