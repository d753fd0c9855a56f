use super::panel::{Candidate, Panel};
use crate::calibration::ReferencePoint;
use serde::Serialize;

/// Dwell progress for one candidate, for rendering fill bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateProgress {
    pub candidate: Candidate,
    pub count: u8,
}

/// Everything a renderer needs to redraw after a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelSnapshot {
    pub panel: Panel,
    pub text: String,
    /// Tail of `text` that fits the display.
    pub display_text: String,
    pub threshold: u8,
    pub progress: Vec<CandidateProgress>,
}

/// Events emitted to sinks, one JSON object per line with an `event` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum EngineEvent {
    #[serde(rename = "ready")]
    Ready {
        version: &'static str,
        source: String,
        threshold: u8,
    },
    #[serde(rename = "producer_connected")]
    ProducerConnected { peer: String },
    #[serde(rename = "producer_disconnected")]
    ProducerDisconnected { peer: String },
    #[serde(rename = "dwell_progress")]
    DwellProgress {
        panel: Panel,
        candidate: Candidate,
        count: u8,
        threshold: u8,
    },
    #[serde(rename = "character_committed")]
    CharacterCommitted { character: char, text: String },
    #[serde(rename = "text_deleted")]
    TextDeleted { removed: char, text: String },
    #[serde(rename = "text_cleared")]
    TextCleared,
    #[serde(rename = "panel_changed")]
    PanelChanged { from: Panel, to: Panel },
    #[serde(rename = "speak_requested")]
    SpeakRequested { text: String },
    #[serde(rename = "calibration_cue")]
    CalibrationCue { point: ReferencePoint },
    #[serde(rename = "snapshot")]
    Snapshot(PanelSnapshot),
    #[serde(rename = "shutdown")]
    Shutdown,
}
