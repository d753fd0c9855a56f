use crate::calibration::ReferencePoint;
use crate::region::Zone;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four letter groups reachable from the main panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Top,
    Right,
    Bottom,
    Left,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Top, Section::Right, Section::Bottom, Section::Left];

    pub fn label(self) -> &'static str {
        match self {
            Section::Top => "TOP",
            Section::Right => "RIGHT",
            Section::Bottom => "BOTTOM",
            Section::Left => "LEFT",
        }
    }
}

/// Which mapping from zone labels to candidates is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Panel {
    #[default]
    Main,
    Section(Section),
    Num,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Main,
        Panel::Section(Section::Top),
        Panel::Section(Section::Right),
        Panel::Section(Section::Bottom),
        Panel::Section(Section::Left),
        Panel::Num,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Panel::Main => "MAIN",
            Panel::Section(section) => section.label(),
            Panel::Num => "NUM",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Panel::Main => 0,
            Panel::Section(Section::Top) => 1,
            Panel::Section(Section::Right) => 2,
            Panel::Section(Section::Bottom) => 3,
            Panel::Section(Section::Left) => 4,
            Panel::Num => 5,
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Panel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Corner and center actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Delete,
    Confirm,
    Return,
    Space,
}

impl Command {
    pub fn label(self) -> &'static str {
        match self {
            Command::Delete => "DELETE",
            Command::Confirm => "CONFIRM",
            Command::Return => "RETURN",
            Command::Space => "SPACE",
        }
    }
}

/// Something a run of matching labels can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candidate {
    Symbol(char),
    EnterSection(Section),
    EnterNum,
    Command(Command),
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Symbol(ch) => write!(f, "{ch}"),
            Candidate::EnterSection(section) => f.write_str(section.label()),
            Candidate::EnterNum => f.write_str("NUM"),
            Candidate::Command(command) => f.write_str(command.label()),
        }
    }
}

impl Serialize for Candidate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How the engine reads one line off the label stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    Zone(Zone),
    Calibration(ReferencePoint),
    Exit,
    Unrecognized,
}

impl Inbound {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("exit") {
            return Inbound::Exit;
        }
        if let Some(zone) = Zone::parse(label) {
            return Inbound::Zone(zone);
        }
        if let Some(point) = ReferencePoint::parse(label) {
            return Inbound::Calibration(point);
        }
        Inbound::Unrecognized
    }
}
