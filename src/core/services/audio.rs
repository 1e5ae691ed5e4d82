//=========================================================================
// Audio Manager
//=========================================================================
//
// Fire-and-forget playback on two channels:
// - BGM: looping background music, one track at a time
// - ME:  short music effects layered over the BGM
//
// Output goes through an `AudioBackend`; the manager only tracks which
// track each channel is playing.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;

use log::debug;

//=== Internal Dependencies ===============================================

use super::ResourceHandle;

//=== AudioBackend ========================================================

/// Playback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChannel {
    Bgm,
    Me,
}

/// Sink for playback commands.
///
/// Not `Send`: lives on the logic thread with the rest of the services.
pub trait AudioBackend {
    /// Starts `track` on `channel`, replacing whatever it was playing.
    fn play(&mut self, channel: AudioChannel, track: &ResourceHandle);

    /// Silences `channel`.
    fn stop(&mut self, channel: AudioChannel);
}

/// Backend that only logs. Used when no output device is wired in.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn play(&mut self, channel: AudioChannel, track: &ResourceHandle) {
        debug!("[{:?}] play {}", channel, track.key);
    }

    fn stop(&mut self, channel: AudioChannel) {
        debug!("[{:?}] stop", channel);
    }
}

//=== AudioManager ========================================================

pub struct AudioManager {
    backend: RefCell<Box<dyn AudioBackend>>,
    bgm: RefCell<Option<String>>,
    me: RefCell<Option<String>>,
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend: RefCell::new(backend),
            bgm: RefCell::new(None),
            me: RefCell::new(None),
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentAudio))
    }

    //--- Playback ---------------------------------------------------------

    /// Starts background music. Re-requesting the current track is a no-op.
    pub fn play_bgm(&self, track: &ResourceHandle) {
        if self.bgm.borrow().as_deref() == Some(track.key.as_str()) {
            return;
        }
        self.backend.borrow_mut().play(AudioChannel::Bgm, track);
        *self.bgm.borrow_mut() = Some(track.key.clone());
    }

    /// Starts a music effect, restarting it if already playing.
    pub fn play_me(&self, track: &ResourceHandle) {
        self.backend.borrow_mut().play(AudioChannel::Me, track);
        *self.me.borrow_mut() = Some(track.key.clone());
    }

    pub fn stop_bgm(&self) {
        if self.bgm.borrow_mut().take().is_some() {
            self.backend.borrow_mut().stop(AudioChannel::Bgm);
        }
    }

    pub fn stop_me(&self) {
        if self.me.borrow_mut().take().is_some() {
            self.backend.borrow_mut().stop(AudioChannel::Me);
        }
    }

    //--- Query API --------------------------------------------------------

    pub fn current_bgm(&self) -> Option<String> {
        self.bgm.borrow().clone()
    }

    pub fn current_me(&self) -> Option<String> {
        self.me.borrow().clone()
    }
}

//=========================================================================
// Test Doubles
//=========================================================================


//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::testing::RecordingAudio;
    use super::*;
    use crate::core::services::ResourceKind;

    fn track(key: &str) -> ResourceHandle {
        ResourceHandle { kind: ResourceKind::Sound, key: key.into(), path: key.into() }
    }

    fn manager() -> (AudioManager, RecordingAudio) {
        let recorder = RecordingAudio::default();
        (AudioManager::new(Box::new(recorder.clone())), recorder)
    }

    #[test]
    fn bgm_replays_are_ignored() {
        let (audio, recorder) = manager();
        audio.play_bgm(&track("field.wav"));
        audio.play_bgm(&track("field.wav"));
        audio.play_bgm(&track("battle.wav"));

        assert_eq!(recorder.take(), vec!["Bgm play field.wav", "Bgm play battle.wav"]);
        assert_eq!(audio.current_bgm().as_deref(), Some("battle.wav"));
    }

    #[test]
    fn me_restarts_and_stops_independently() {
        let (audio, recorder) = manager();
        audio.play_bgm(&track("field.wav"));
        audio.play_me(&track("walking.wav"));
        audio.play_me(&track("walking.wav"));
        audio.stop_me();

        assert_eq!(
            recorder.take(),
            vec!["Bgm play field.wav", "Me play walking.wav", "Me play walking.wav", "Me stop"]
        );
        assert_eq!(audio.current_bgm().as_deref(), Some("field.wav"));
        assert!(audio.current_me().is_none());
    }

    #[test]
    fn stopping_idle_channel_sends_nothing() {
        let (audio, recorder) = manager();
        audio.stop_bgm();
        audio.stop_me();
        assert!(recorder.take().is_empty());
    }
}
