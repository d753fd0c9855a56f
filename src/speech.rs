//! Text-to-speech hand-off for confirmed text and empty-buffer replies.

use crate::engine::EngineEvent;
use crate::ipc::EventSink;
use crate::{log_debug, log_debug_content};
use std::io;
use std::process::{Command, Stdio};
use std::thread;

/// TTS binaries accepted by name; anything else must be an absolute path.
pub const SPEECH_ALLOWLIST: &[&str] = &["espeak", "espeak-ng", "say", "spd-say"];

/// Runs `<command> <text>` detached for every speak request.
#[derive(Debug, Clone)]
pub struct SpeechHook {
    command: String,
}

impl SpeechHook {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Start the speaker and return without waiting for it.
    pub fn speak(&self, text: &str) -> io::Result<()> {
        let mut child = Command::new(&self.command)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        log_debug_content(&format!("speaking via {}: {text}", self.command));
        // Reap in the background so a slow speaker never blocks the engine.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

impl EventSink for SpeechHook {
    fn emit(&mut self, event: &EngineEvent) {
        let EngineEvent::SpeakRequested { text } = event else {
            return;
        };
        if let Err(err) = self.speak(text) {
            tracing::warn!(
                target: "gazekey::speech",
                command = %self.command,
                error = %err,
                "speech command failed"
            );
            log_debug(&format!("speech command '{}' failed: {err}", self.command));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_error() {
        let hook = SpeechHook::new("gazekey-no-such-speaker");
        let err = hook.speak("hello").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn emit_ignores_non_speech_events_and_survives_failures() {
        let mut hook = SpeechHook::new("gazekey-no-such-speaker");
        hook.emit(&EngineEvent::TextCleared);
        hook.emit(&EngineEvent::SpeakRequested {
            text: "Yes".to_string(),
        });
        assert_eq!(hook.command(), "gazekey-no-such-speaker");
    }

    #[cfg(unix)]
    #[test]
    fn speak_runs_detached() {
        let hook = SpeechHook::new("true");
        assert!(hook.speak("hello").is_ok());
    }
}
