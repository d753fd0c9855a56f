use super::panel::{Candidate, Command, Panel, Section};
use crate::region::{Corner, Zone, SECTOR_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

/// Zone slots: 1-20 ring sectors, 21-24 corners, 25 center.
const SLOT_COUNT: usize = 26;

/// One output symbol and the ring sectors that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSectors {
    pub symbol: char,
    pub sectors: Vec<u8>,
}

impl SymbolSectors {
    fn new(symbol: char, sectors: impl IntoIterator<Item = u8>) -> Self {
        Self {
            symbol,
            sectors: sectors.into_iter().collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("{panel}: sector {sector} is outside 1-20")]
    SectorOutOfRange { panel: Panel, sector: u8 },

    #[error("{panel}: sector {sector} is mapped more than once")]
    DuplicateSector { panel: Panel, sector: u8 },

    #[error("{panel}: symbol '{symbol}' appears more than once")]
    DuplicateSymbol { panel: Panel, symbol: char },

    #[error("{0} has nothing to select")]
    EmptyPanel(Panel),

    #[error("failed to read layout file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid layout YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Sector assignments for every panel. Corner and center commands are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelLayout {
    pub main: BTreeMap<Section, Vec<u8>>,
    pub sections: BTreeMap<Section, Vec<SymbolSectors>>,
    pub numbers: Vec<SymbolSectors>,
}

/// What a layout file may contain; anything left out keeps the standard layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    #[serde(default)]
    main: BTreeMap<Section, Vec<u8>>,
    #[serde(default)]
    sections: BTreeMap<Section, Vec<SymbolSectors>>,
    numbers: Option<Vec<SymbolSectors>>,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl PanelLayout {
    pub fn standard() -> Self {
        let main = BTreeMap::from([
            (Section::Top, (3..=7).collect()),
            (Section::Right, vec![19, 20, 1, 2]),
            (Section::Bottom, (14..=18).collect()),
            (Section::Left, (8..=13).collect()),
        ]);
        let sections = BTreeMap::from([
            (
                Section::Top,
                vec![
                    SymbolSectors::new('s', 1..=3),
                    SymbolSectors::new('t', 4..=6),
                    SymbolSectors::new('n', 7..=9),
                    SymbolSectors::new('r', 10..=11),
                    SymbolSectors::new('d', 12..=15),
                    SymbolSectors::new('l', 16..=17),
                    SymbolSectors::new('h', 18..=20),
                ],
            ),
            (
                Section::Right,
                vec![
                    SymbolSectors::new('a', 1..=4),
                    SymbolSectors::new('e', 5..=8),
                    SymbolSectors::new('i', 9..=12),
                    SymbolSectors::new('o', 13..=16),
                    SymbolSectors::new('u', 17..=20),
                ],
            ),
            (
                Section::Bottom,
                vec![
                    SymbolSectors::new('j', 1..=3),
                    SymbolSectors::new('b', 4..=6),
                    SymbolSectors::new('q', 7..=9),
                    SymbolSectors::new('k', 10..=12),
                    SymbolSectors::new('v', 13..=15),
                    SymbolSectors::new('z', 16..=18),
                    SymbolSectors::new('x', 19..=20),
                ],
            ),
            (
                Section::Left,
                vec![
                    SymbolSectors::new('c', 1..=3),
                    SymbolSectors::new('w', 4..=6),
                    SymbolSectors::new('m', 7..=9),
                    SymbolSectors::new('g', 10..=12),
                    SymbolSectors::new('y', 13..=15),
                    SymbolSectors::new('p', 16..=18),
                    SymbolSectors::new('f', 19..=20),
                ],
            ),
        ]);
        let numbers = vec![
            SymbolSectors::new('1', [1]),
            SymbolSectors::new('2', 2..=4),
            SymbolSectors::new('3', 5..=6),
            SymbolSectors::new('4', 7..=8),
            SymbolSectors::new('5', 9..=10),
            SymbolSectors::new('6', 11..=12),
            SymbolSectors::new('7', 13..=14),
            SymbolSectors::new('8', 15..=16),
            SymbolSectors::new('9', 17..=19),
            SymbolSectors::new('0', [20]),
        ];
        Self {
            main,
            sections,
            numbers,
        }
    }

    /// Parse a YAML overlay on top of the standard layout and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, LayoutError> {
        let file: LayoutFile = if text.trim().is_empty() {
            LayoutFile::default()
        } else {
            serde_yaml::from_str(text)?
        };
        let mut layout = Self::standard();
        layout.main.extend(file.main);
        layout.sections.extend(file.sections);
        if let Some(numbers) = file.numbers {
            layout.numbers = numbers;
        }
        layout.validate()?;
        Ok(layout)
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let main_groups = self
            .main
            .values()
            .map(|sectors| sectors.as_slice());
        check_sectors(Panel::Main, main_groups)?;

        for section in Section::ALL {
            let panel = Panel::Section(section);
            let entries = self
                .sections
                .get(&section)
                .map(Vec::as_slice)
                .unwrap_or_default();
            check_symbols(panel, entries)?;
        }
        check_symbols(Panel::Num, &self.numbers)
    }

    /// Build lookup tables. Call `validate` first; out-of-range sectors are
    /// skipped here and a repeated sector keeps its last assignment.
    pub fn keymap(&self) -> Keymap {
        let mut panels: [PanelTable; 6] = Default::default();

        let main = &mut panels[Panel::Main.index()];
        for (&section, sectors) in &self.main {
            main.assign(Candidate::EnterSection(section), sectors);
        }
        main.bind(Zone::Corner(Corner::TopLeft), Candidate::EnterNum);

        for section in Section::ALL {
            let table = &mut panels[Panel::Section(section).index()];
            for entry in self.sections.get(&section).into_iter().flatten() {
                table.assign(Candidate::Symbol(entry.symbol), &entry.sectors);
            }
        }
        let num = &mut panels[Panel::Num.index()];
        for entry in &self.numbers {
            num.assign(Candidate::Symbol(entry.symbol), &entry.sectors);
        }

        for panel in Panel::ALL {
            let table = &mut panels[panel.index()];
            table.bind(Zone::Corner(Corner::TopRight), Candidate::Command(Command::Return));
            // Editing commands stay off while a letter group is open.
            if !matches!(panel, Panel::Section(_)) {
                table.bind(Zone::Corner(Corner::BottomLeft), Candidate::Command(Command::Delete));
                table.bind(Zone::Corner(Corner::BottomRight), Candidate::Command(Command::Confirm));
            }
            table.bind(Zone::Center, Candidate::Command(Command::Space));
        }
        Keymap { panels }
    }
}

fn check_sectors<'a>(
    panel: Panel,
    groups: impl IntoIterator<Item = &'a [u8]>,
) -> Result<(), LayoutError> {
    let mut seen = HashSet::new();
    let mut any = false;
    for sectors in groups {
        for &sector in sectors {
            any = true;
            if sector == 0 || usize::from(sector) > SECTOR_COUNT {
                return Err(LayoutError::SectorOutOfRange { panel, sector });
            }
            if !seen.insert(sector) {
                return Err(LayoutError::DuplicateSector { panel, sector });
            }
        }
    }
    if any {
        Ok(())
    } else {
        Err(LayoutError::EmptyPanel(panel))
    }
}

fn check_symbols(panel: Panel, entries: &[SymbolSectors]) -> Result<(), LayoutError> {
    let mut symbols = HashSet::new();
    for entry in entries {
        if !symbols.insert(entry.symbol) {
            return Err(LayoutError::DuplicateSymbol {
                panel,
                symbol: entry.symbol,
            });
        }
    }
    check_sectors(panel, entries.iter().map(|entry| entry.sectors.as_slice()))
}

#[derive(Debug, Clone)]
struct PanelTable {
    by_slot: [Option<Candidate>; SLOT_COUNT],
    order: Vec<Candidate>,
}

impl Default for PanelTable {
    fn default() -> Self {
        Self {
            by_slot: [None; SLOT_COUNT],
            order: Vec::new(),
        }
    }
}

impl PanelTable {
    fn assign(&mut self, candidate: Candidate, sectors: &[u8]) {
        for &sector in sectors {
            if (1..=SECTOR_COUNT).contains(&usize::from(sector)) {
                self.by_slot[usize::from(sector)] = Some(candidate);
            }
        }
        self.remember(candidate);
    }

    fn bind(&mut self, zone: Zone, candidate: Candidate) {
        self.by_slot[slot(zone)] = Some(candidate);
        self.remember(candidate);
    }

    fn remember(&mut self, candidate: Candidate) {
        if !self.order.contains(&candidate) {
            self.order.push(candidate);
        }
    }
}

fn slot(zone: Zone) -> usize {
    match zone {
        Zone::Sector(sector) => usize::from(sector),
        Zone::Corner(Corner::TopLeft) => 21,
        Zone::Corner(Corner::TopRight) => 22,
        Zone::Corner(Corner::BottomLeft) => 23,
        Zone::Corner(Corner::BottomRight) => 24,
        Zone::Center => 25,
    }
}

/// Immutable per-panel lookup built from a `PanelLayout`.
#[derive(Debug, Clone)]
pub struct Keymap {
    panels: [PanelTable; 6],
}

impl Default for Keymap {
    fn default() -> Self {
        PanelLayout::standard().keymap()
    }
}

impl Keymap {
    /// `None` means the zone selects nothing on this panel.
    pub fn resolve(&self, panel: Panel, zone: Zone) -> Option<Candidate> {
        self.panels[panel.index()]
            .by_slot
            .get(slot(zone))
            .copied()
            .flatten()
    }

    /// Everything selectable on `panel`, in layout order.
    pub fn candidates(&self, panel: Panel) -> &[Candidate] {
        &self.panels[panel.index()].order
    }
}
