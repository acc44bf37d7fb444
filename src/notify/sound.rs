//! Audio cue using rodio.

use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::{Notifier, NotifyError};
use crate::types::FocusSession;

/// Beep frequency in Hz.
const BEEP_FREQUENCY: f32 = 880.0;

/// Beep length.
const BEEP_DURATION: Duration = Duration::from_millis(350);

/// Plays a short beep on the default output device.
///
/// Playback is non-blocking; the tone continues after `session_complete`
/// returns as long as the notifier is alive.
pub struct SoundNotifier {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
}

impl SoundNotifier {
    /// Opens the default audio output device.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::DeviceNotAvailable` if no output device exists.
    pub fn new() -> Result<Self, NotifyError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| NotifyError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
        })
    }
}

impl Notifier for SoundNotifier {
    fn session_complete(&self, _session: &FocusSession) -> Result<(), NotifyError> {
        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| NotifyError::Playback(e.to_string()))?;

        sink.append(
            SineWave::new(BEEP_FREQUENCY)
                .take_duration(BEEP_DURATION)
                .amplify(0.25),
        );
        sink.detach();
        Ok(())
    }
}
