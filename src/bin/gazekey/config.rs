use anyhow::{bail, Result};
use clap::Parser;
use gazekey::config::{sanitize_binary, AppConfig};
use gazekey::engine::DEFAULT_MAX_DISPLAY_CHARS;
use gazekey::ipc::{LabelInput, ReceiverOptions, DEFAULT_QUEUE_CAPACITY};
use gazekey::speech::SPEECH_ALLOWLIST;

const MIN_DISPLAY_CHARS: usize = 1;
const MAX_DISPLAY_CHARS: usize = 64;
const MIN_QUEUE_CAPACITY: usize = 8;
const MAX_QUEUE_CAPACITY: usize = 4096;

#[derive(Debug, Parser, Clone)]
#[command(about = "gazekey dwell keyboard display", author, version)]
pub(crate) struct ReceiverConfig {
    #[command(flatten)]
    pub(crate) app: AppConfig,

    /// Address to listen on for the gaze sender
    #[arg(long, default_value = "0.0.0.0")]
    pub(crate) bind: String,

    /// Read labels from stdin instead of TCP
    #[arg(long, default_value_t = false)]
    pub(crate) stdin: bool,

    /// Print engine events as JSON lines instead of the status line
    #[arg(long = "json-events", default_value_t = false)]
    pub(crate) json_events: bool,

    /// Trailing characters of the typed text shown in the status line
    #[arg(long = "max-display-chars", default_value_t = DEFAULT_MAX_DISPLAY_CHARS)]
    pub(crate) max_display_chars: usize,

    /// Text-to-speech command run for confirmed text (e.g. espeak)
    #[arg(long = "speak-cmd", env = "GAZEKEY_SPEAK_CMD")]
    pub(crate) speak_cmd: Option<String>,

    /// Labels buffered between the transport and the engine
    #[arg(long = "queue-capacity", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub(crate) queue_capacity: usize,
}

impl ReceiverConfig {
    pub(crate) fn validate(&mut self) -> Result<()> {
        self.app.validate()?;
        if !(MIN_DISPLAY_CHARS..=MAX_DISPLAY_CHARS).contains(&self.max_display_chars) {
            bail!(
                "--max-display-chars must be between {MIN_DISPLAY_CHARS} and {MAX_DISPLAY_CHARS}"
            );
        }
        if !(MIN_QUEUE_CAPACITY..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            bail!(
                "--queue-capacity must be between {MIN_QUEUE_CAPACITY} and {MAX_QUEUE_CAPACITY}"
            );
        }
        if self.bind.trim().is_empty() {
            bail!("--bind cannot be empty");
        }
        if let Some(cmd) = self.speak_cmd.as_deref() {
            self.speak_cmd = Some(sanitize_binary(cmd, "--speak-cmd", SPEECH_ALLOWLIST)?);
        }
        Ok(())
    }

    pub(crate) fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind.trim(), self.app.port)
    }

    pub(crate) fn receiver_options(&self) -> ReceiverOptions {
        let input = if self.stdin {
            LabelInput::Stdin
        } else {
            LabelInput::Tcp(self.listen_addr())
        };
        ReceiverOptions {
            input,
            queue_capacity: self.queue_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let mut config = ReceiverConfig::parse_from(["gazekey"]);
        config.validate().unwrap();
        let options = config.receiver_options();
        assert_eq!(
            options.input,
            LabelInput::Tcp(format!("0.0.0.0:{}", config.app.port))
        );
        assert_eq!(options.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn stdin_flag_switches_input() {
        let config = ReceiverConfig::parse_from(["gazekey", "--stdin"]);
        assert_eq!(config.receiver_options().input, LabelInput::Stdin);
    }

    #[test]
    fn rejects_out_of_range_display_width() {
        let mut config = ReceiverConfig::parse_from(["gazekey", "--max-display-chars", "0"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--max-display-chars"));
    }

    #[test]
    fn rejects_tiny_queue() {
        let mut config = ReceiverConfig::parse_from(["gazekey", "--queue-capacity", "2"]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--queue-capacity"));
    }

    #[test]
    fn speak_cmd_normalizes_allowlisted_names() {
        let mut config = ReceiverConfig::parse_from(["gazekey", "--speak-cmd", " ESPEAK "]);
        config.validate().unwrap();
        assert_eq!(config.speak_cmd.as_deref(), Some("espeak"));
    }

    #[test]
    fn speak_cmd_rejects_bare_unknown_names() {
        let mut config = ReceiverConfig::parse_from(["gazekey", "--speak-cmd", "rm"]);
        assert!(config.validate().is_err());
    }
}
