//! Dwell-based selection: zone labels in, text edits and panel changes out.
//!
//! A candidate is committed once the same zone has been seen `threshold`
//! times on the active panel. Labels that select nothing on the panel count
//! as noise and bleed one step off the strongest pending candidate.

mod counters;
mod events;
mod layout;
mod panel;
#[cfg(test)]
mod tests;

pub use counters::DwellCounters;
pub use events::{CandidateProgress, EngineEvent, PanelSnapshot};
pub use layout::{Keymap, LayoutError, PanelLayout, SymbolSectors};
pub use panel::{Candidate, Command, Inbound, Panel, Section};

use crate::log_debug_content;
use std::mem;

pub const DEFAULT_THRESHOLD: u8 = 4;
pub const MAX_THRESHOLD: u8 = 20;
pub const DEFAULT_MAX_DISPLAY_CHARS: usize = 7;

const EMPTY_CONFIRM_REPLY: &str = "Yes";
const EMPTY_DELETE_REPLY: &str = "No";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub threshold: u8,
    pub max_display_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_display_chars: DEFAULT_MAX_DISPLAY_CHARS,
        }
    }
}

/// Mutable part of the engine: panel, counters, and the typed text.
#[derive(Debug, Clone)]
pub struct SelectionState {
    panel: Panel,
    counters: DwellCounters,
    text: String,
}

impl SelectionState {
    fn new(threshold: u8) -> Self {
        Self {
            panel: Panel::Main,
            counters: DwellCounters::new(threshold),
            text: String::new(),
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn counters(&self) -> &DwellCounters {
        &self.counters
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

pub struct SelectionEngine {
    keymap: Keymap,
    config: EngineConfig,
    state: SelectionState,
}

impl SelectionEngine {
    /// Engine over a validated custom layout.
    pub fn new(layout: &PanelLayout, config: EngineConfig) -> Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self::with_keymap(layout.keymap(), config))
    }

    /// Engine over the standard layout.
    pub fn standard(config: EngineConfig) -> Self {
        Self::with_keymap(Keymap::default(), config)
    }

    fn with_keymap(keymap: Keymap, config: EngineConfig) -> Self {
        let config = EngineConfig {
            threshold: config.threshold.max(1),
            max_display_chars: config.max_display_chars.max(1),
        };
        Self {
            keymap,
            state: SelectionState::new(config.threshold),
            config,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn panel(&self) -> Panel {
        self.state.panel
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Handle one label off the stream.
    pub fn process(&mut self, label: &str) -> Vec<EngineEvent> {
        match Inbound::parse(label) {
            Inbound::Exit => vec![EngineEvent::Shutdown],
            Inbound::Calibration(point) => vec![EngineEvent::CalibrationCue { point }],
            Inbound::Zone(zone) => match self.keymap.resolve(self.state.panel, zone) {
                Some(candidate) => self.dwell(candidate),
                None => self.decay(),
            },
            Inbound::Unrecognized => self.decay(),
        }
    }

    /// Drop all pending dwell progress without committing anything.
    pub fn cancel(&mut self) {
        self.state.counters.reset();
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        let progress = self
            .state
            .counters
            .active(self.keymap.candidates(self.state.panel))
            .map(|(candidate, count)| CandidateProgress { candidate, count })
            .collect();
        PanelSnapshot {
            panel: self.state.panel,
            text: self.state.text.clone(),
            display_text: display_tail(&self.state.text, self.config.max_display_chars),
            threshold: self.config.threshold,
            progress,
        }
    }

    fn dwell(&mut self, candidate: Candidate) -> Vec<EngineEvent> {
        let count = self.state.counters.increment(candidate);
        if count >= self.config.threshold {
            return self.commit(candidate);
        }
        vec![self.progress(candidate, count)]
    }

    fn decay(&mut self) -> Vec<EngineEvent> {
        let candidates = self.keymap.candidates(self.state.panel);
        match self.state.counters.decay_highest(candidates) {
            Some((candidate, count)) => vec![self.progress(candidate, count)],
            None => Vec::new(),
        }
    }

    fn progress(&self, candidate: Candidate, count: u8) -> EngineEvent {
        EngineEvent::DwellProgress {
            panel: self.state.panel,
            candidate,
            count,
            threshold: self.config.threshold,
        }
    }

    fn commit(&mut self, candidate: Candidate) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        match candidate {
            Candidate::Symbol(symbol) => {
                self.push_char(symbol, &mut events);
                if self.state.panel != Panel::Num {
                    self.switch_panel(Panel::Main, &mut events);
                }
            }
            Candidate::EnterSection(section) => {
                self.switch_panel(Panel::Section(section), &mut events)
            }
            Candidate::EnterNum => self.switch_panel(Panel::Num, &mut events),
            Candidate::Command(Command::Return) => self.switch_panel(Panel::Main, &mut events),
            Candidate::Command(Command::Space) => {
                let symbol = if self.state.panel == Panel::Num { '.' } else { ' ' };
                self.push_char(symbol, &mut events);
            }
            Candidate::Command(Command::Delete) => match self.state.text.pop() {
                Some(removed) => events.push(EngineEvent::TextDeleted {
                    removed,
                    text: self.state.text.clone(),
                }),
                None => events.push(EngineEvent::SpeakRequested {
                    text: EMPTY_DELETE_REPLY.to_string(),
                }),
            },
            Candidate::Command(Command::Confirm) => {
                if self.state.text.is_empty() {
                    events.push(EngineEvent::SpeakRequested {
                        text: EMPTY_CONFIRM_REPLY.to_string(),
                    });
                } else {
                    let text = mem::take(&mut self.state.text);
                    log_debug_content(&format!("speaking: {text}"));
                    events.push(EngineEvent::SpeakRequested { text });
                    events.push(EngineEvent::TextCleared);
                }
            }
        }
        self.state.counters.reset();
        tracing::info!(
            target: "gazekey::engine",
            candidate = %candidate,
            panel = %self.state.panel,
            "selection committed"
        );
        events
    }

    fn push_char(&mut self, symbol: char, events: &mut Vec<EngineEvent>) {
        self.state.text.push(symbol);
        events.push(EngineEvent::CharacterCommitted {
            character: symbol,
            text: self.state.text.clone(),
        });
    }

    fn switch_panel(&mut self, to: Panel, events: &mut Vec<EngineEvent>) {
        let from = self.state.panel;
        if from == to {
            return;
        }
        self.state.panel = to;
        events.push(EngineEvent::PanelChanged { from, to });
    }
}

/// Last `max_chars` characters of `text`.
pub fn display_tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}
