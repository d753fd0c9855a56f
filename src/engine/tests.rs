use super::*;
use crate::calibration::{CalibrationProfile, ReferencePoint};
use crate::gaze::Point;
use crate::region::{Corner, RegionTable, Zone};

fn engine() -> SelectionEngine {
    SelectionEngine::standard(EngineConfig::default())
}

fn feed(engine: &mut SelectionEngine, label: &str, times: usize) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    for _ in 0..times {
        events.extend(engine.process(label));
    }
    events
}

fn count(engine: &SelectionEngine, candidate: Candidate) -> u8 {
    engine.state().counters().get(candidate)
}

const TOP: Candidate = Candidate::EnterSection(Section::Top);
const LEFT: Candidate = Candidate::EnterSection(Section::Left);
const RIGHT: Candidate = Candidate::EnterSection(Section::Right);

#[test]
fn standard_layout_resolves_main_panel() {
    let keymap = Keymap::default();
    assert_eq!(keymap.resolve(Panel::Main, Zone::Sector(3)), Some(TOP));
    assert_eq!(keymap.resolve(Panel::Main, Zone::Sector(13)), Some(LEFT));
    assert_eq!(keymap.resolve(Panel::Main, Zone::Sector(1)), Some(RIGHT));
    assert_eq!(
        keymap.resolve(Panel::Main, Zone::Corner(Corner::TopLeft)),
        Some(Candidate::EnterNum)
    );
    assert_eq!(
        keymap.resolve(Panel::Main, Zone::Center),
        Some(Candidate::Command(Command::Space))
    );
}

#[test]
fn top_left_corner_is_unmapped_off_main() {
    let keymap = Keymap::default();
    for panel in Panel::ALL.into_iter().skip(1) {
        assert_eq!(keymap.resolve(panel, Zone::Corner(Corner::TopLeft)), None);
        assert_eq!(
            keymap.resolve(panel, Zone::Corner(Corner::TopRight)),
            Some(Candidate::Command(Command::Return))
        );
    }
}

#[test]
fn standard_layout_covers_every_sector_on_every_panel() {
    let keymap = Keymap::default();
    for panel in Panel::ALL {
        for sector in 1..=20u8 {
            assert!(
                keymap.resolve(panel, Zone::Sector(sector)).is_some(),
                "{panel} sector {sector}"
            );
        }
    }
    assert!(PanelLayout::standard().validate().is_ok());
}

#[test]
fn threshold_matches_enter_section_once_and_clear_counters() {
    let mut engine = engine();
    let events = feed(&mut engine, "3", 3);
    assert_eq!(events.len(), 3);
    assert_eq!(count(&engine, TOP), 3);
    assert_eq!(engine.panel(), Panel::Main);

    let events = engine.process("3");
    assert_eq!(
        events,
        vec![EngineEvent::PanelChanged {
            from: Panel::Main,
            to: Panel::Section(Section::Top)
        }]
    );
    assert!(engine.state().counters().is_empty());
    assert_eq!(engine.text(), "");
}

#[test]
fn counters_never_exceed_threshold() {
    let mut engine = SelectionEngine::standard(EngineConfig {
        threshold: 3,
        ..EngineConfig::default()
    });
    for label in ["3", "8", "3", "8", "99", "3"] {
        engine.process(label);
        for &candidate in engine.keymap().candidates(engine.panel()) {
            assert!(count(&engine, candidate) <= 3);
        }
    }
}

#[test]
fn noise_decrements_only_the_strongest_candidate() {
    let mut engine = engine();
    feed(&mut engine, "3", 2);
    feed(&mut engine, "8", 1);
    let events = engine.process("garbage");
    assert_eq!(
        events,
        vec![EngineEvent::DwellProgress {
            panel: Panel::Main,
            candidate: TOP,
            count: 1,
            threshold: 4
        }]
    );
    assert_eq!(count(&engine, TOP), 1);
    assert_eq!(count(&engine, LEFT), 1);
}

#[test]
fn noise_ties_go_to_earliest_candidate_in_layout_order() {
    let mut engine = engine();
    engine.process("8");
    engine.process("3");
    engine.process("not-a-zone");
    assert_eq!(count(&engine, TOP), 0);
    assert_eq!(count(&engine, LEFT), 1);
}

#[test]
fn noise_with_no_pending_progress_emits_nothing() {
    let mut engine = engine();
    assert!(engine.process("99").is_empty());
    assert!(engine.process("").is_empty());
}

#[test]
fn unmapped_corner_in_section_counts_as_noise() {
    let mut engine = engine();
    feed(&mut engine, "3", 4);
    feed(&mut engine, "2", 2);
    let s = Candidate::Symbol('s');
    assert_eq!(count(&engine, s), 2);
    engine.process("21");
    assert_eq!(count(&engine, s), 1);
    assert_eq!(engine.panel(), Panel::Section(Section::Top));
}

#[test]
fn letter_commit_returns_to_main() {
    let mut engine = engine();
    feed(&mut engine, "3", 4);
    let events = feed(&mut engine, "1", 4);
    assert_eq!(
        &events[3..],
        &[
            EngineEvent::CharacterCommitted {
                character: 's',
                text: "s".to_string()
            },
            EngineEvent::PanelChanged {
                from: Panel::Section(Section::Top),
                to: Panel::Main
            }
        ]
    );
    assert_eq!(engine.text(), "s");
    assert_eq!(engine.panel(), Panel::Main);
}

#[test]
fn sections_are_entered_only_from_main() {
    let mut engine = engine();
    feed(&mut engine, "19", 4);
    assert_eq!(engine.panel(), Panel::Section(Section::Right));
    // Sector 3 is TOP on the main panel but 'a' here.
    feed(&mut engine, "3", 4);
    assert_eq!(engine.text(), "a");
    assert_eq!(engine.panel(), Panel::Main);
}

#[test]
fn digits_stay_on_number_panel() {
    let mut engine = engine();
    feed(&mut engine, "21", 4);
    assert_eq!(engine.panel(), Panel::Num);
    feed(&mut engine, "1", 4);
    feed(&mut engine, "25", 4);
    feed(&mut engine, "3", 4);
    assert_eq!(engine.text(), "1.2");
    assert_eq!(engine.panel(), Panel::Num);
    feed(&mut engine, "22", 4);
    assert_eq!(engine.panel(), Panel::Main);
}

#[test]
fn center_inserts_space_outside_number_panel() {
    let mut engine = engine();
    feed(&mut engine, "25", 4);
    assert_eq!(engine.text(), " ");
}

#[test]
fn return_forces_main_and_clears_progress() {
    let mut engine = engine();
    feed(&mut engine, "14", 4);
    assert_eq!(engine.panel(), Panel::Section(Section::Bottom));
    feed(&mut engine, "1", 2);
    let events = feed(&mut engine, "22", 4);
    assert!(events.contains(&EngineEvent::PanelChanged {
        from: Panel::Section(Section::Bottom),
        to: Panel::Main
    }));
    assert!(engine.state().counters().is_empty());
    assert_eq!(engine.text(), "");
}

#[test]
fn return_on_main_only_resets_counters() {
    let mut engine = engine();
    feed(&mut engine, "3", 2);
    let events = feed(&mut engine, "22", 4);
    assert!(!events
        .iter()
        .any(|event| matches!(event, EngineEvent::PanelChanged { .. })));
    assert_eq!(count(&engine, TOP), 0);
}

#[test]
fn letter_groups_start_at_sector_one() {
    let keymap = Keymap::default();
    let first = |section| keymap.resolve(Panel::Section(section), Zone::Sector(1));
    assert_eq!(first(Section::Top), Some(Candidate::Symbol('s')));
    assert_eq!(first(Section::Right), Some(Candidate::Symbol('a')));
    assert_eq!(first(Section::Bottom), Some(Candidate::Symbol('j')));
    assert_eq!(first(Section::Left), Some(Candidate::Symbol('c')));
    assert_eq!(
        keymap.resolve(Panel::Section(Section::Top), Zone::Sector(20)),
        Some(Candidate::Symbol('h'))
    );
    assert_eq!(
        keymap.resolve(Panel::Section(Section::Right), Zone::Sector(20)),
        Some(Candidate::Symbol('u'))
    );

    let mut engine = engine();
    for label in ["3", "1", "19", "1"] {
        feed(&mut engine, label, 4);
    }
    assert_eq!(engine.text(), "sa");
}

#[test]
fn delete_and_confirm_are_inert_in_letter_groups() {
    let keymap = Keymap::default();
    for section in Section::ALL {
        let panel = Panel::Section(section);
        assert_eq!(keymap.resolve(panel, Zone::Corner(Corner::BottomLeft)), None);
        assert_eq!(keymap.resolve(panel, Zone::Corner(Corner::BottomRight)), None);
    }
    assert_eq!(
        keymap.resolve(Panel::Num, Zone::Corner(Corner::BottomLeft)),
        Some(Candidate::Command(Command::Delete))
    );

    let mut engine = engine();
    feed(&mut engine, "25", 4);
    feed(&mut engine, "3", 4);
    let events = feed(&mut engine, "23", 4);
    let events_confirm = feed(&mut engine, "24", 4);
    assert_eq!(engine.text(), " ");
    assert_eq!(engine.panel(), Panel::Section(Section::Top));
    assert!(!events
        .iter()
        .chain(&events_confirm)
        .any(|event| matches!(
            event,
            EngineEvent::TextDeleted { .. } | EngineEvent::SpeakRequested { .. }
        )));
}

#[test]
fn delete_on_empty_buffer_speaks_no() {
    let mut engine = engine();
    let events = feed(&mut engine, "23", 4);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::SpeakRequested {
            text: "No".to_string()
        })
    );
    assert_eq!(engine.text(), "");
}

#[test]
fn delete_removes_last_character() {
    let mut engine = engine();
    feed(&mut engine, "21", 4);
    feed(&mut engine, "1", 4);
    feed(&mut engine, "20", 4);
    let events = feed(&mut engine, "23", 4);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::TextDeleted {
            removed: '0',
            text: "1".to_string()
        })
    );
}

#[test]
fn confirm_on_empty_buffer_speaks_yes_and_appends_nothing() {
    let mut engine = engine();
    let events = feed(&mut engine, "24", 4);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::SpeakRequested {
            text: "Yes".to_string()
        })
    );
    assert_eq!(engine.text(), "");
}

#[test]
fn confirm_speaks_and_clears_text() {
    let mut engine = engine();
    feed(&mut engine, "3", 4);
    feed(&mut engine, "1", 4);
    feed(&mut engine, "19", 4);
    feed(&mut engine, "1", 4);
    assert_eq!(engine.text(), "sa");
    let events = feed(&mut engine, "24", 4);
    assert_eq!(
        &events[3..],
        &[
            EngineEvent::SpeakRequested {
                text: "sa".to_string()
            },
            EngineEvent::TextCleared
        ]
    );
    assert_eq!(engine.text(), "");
    assert_eq!(engine.panel(), Panel::Main);
}

#[test]
fn calibration_markers_cue_without_touching_counters() {
    let mut engine = engine();
    feed(&mut engine, "3", 2);
    let events = engine.process("top_mid");
    assert_eq!(
        events,
        vec![EngineEvent::CalibrationCue {
            point: ReferencePoint::TopMid
        }]
    );
    assert_eq!(count(&engine, TOP), 2);
}

#[test]
fn exit_requests_shutdown() {
    let mut engine = engine();
    assert_eq!(engine.process("exit"), vec![EngineEvent::Shutdown]);
    assert_eq!(engine.process(" EXIT "), vec![EngineEvent::Shutdown]);
}

#[test]
fn threshold_of_one_commits_immediately() {
    let mut engine = SelectionEngine::standard(EngineConfig {
        threshold: 1,
        ..EngineConfig::default()
    });
    engine.process("8");
    assert_eq!(engine.panel(), Panel::Section(Section::Left));
}

#[test]
fn cancel_drops_pending_progress() {
    let mut engine = engine();
    feed(&mut engine, "3", 3);
    engine.cancel();
    assert!(engine.state().counters().is_empty());
    engine.process("3");
    assert_eq!(engine.panel(), Panel::Main);
}

#[test]
fn snapshot_shows_text_tail_and_progress() {
    let mut engine = SelectionEngine::standard(EngineConfig {
        threshold: 4,
        max_display_chars: 3,
    });
    feed(&mut engine, "21", 4);
    for label in ["1", "3", "5", "7", "9"] {
        feed(&mut engine, label, 4);
    }
    feed(&mut engine, "11", 2);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.panel, Panel::Num);
    assert_eq!(snapshot.text, "12345");
    assert_eq!(snapshot.display_text, "345");
    assert_eq!(
        snapshot.progress,
        vec![CandidateProgress {
            candidate: Candidate::Symbol('6'),
            count: 2
        }]
    );
}

#[test]
fn display_tail_counts_characters_not_bytes() {
    assert_eq!(display_tail("héllo", 3), "llo");
    assert_eq!(display_tail("ab", 7), "ab");
}

#[test]
fn events_serialize_with_event_tag() {
    let json = serde_json::to_string(&EngineEvent::PanelChanged {
        from: Panel::Main,
        to: Panel::Num,
    })
    .unwrap();
    assert_eq!(json, r#"{"event":"panel_changed","from":"MAIN","to":"NUM"}"#);

    let json = serde_json::to_string(&EngineEvent::DwellProgress {
        panel: Panel::Main,
        candidate: Candidate::Command(Command::Confirm),
        count: 2,
        threshold: 4,
    })
    .unwrap();
    assert!(json.contains(r#""candidate":"CONFIRM""#));
}

#[test]
fn layout_yaml_overrides_only_named_parts() {
    let layout = PanelLayout::from_yaml_str(
        "main:\n  top: [1]\n  right: [19, 20, 2]\nnumbers:\n  - { symbol: '7', sectors: [1, 2] }\n",
    )
    .unwrap();
    assert_eq!(layout.main[&Section::Top], vec![1]);
    assert_eq!(layout.main[&Section::Left], (8..=13).collect::<Vec<u8>>());
    assert_eq!(layout.numbers.len(), 1);
    assert_eq!(
        layout.sections[&Section::Right],
        PanelLayout::standard().sections[&Section::Right]
    );
}

#[test]
fn empty_layout_yaml_is_standard() {
    assert_eq!(
        PanelLayout::from_yaml_str("").unwrap(),
        PanelLayout::standard()
    );
}

#[test]
fn layout_rejects_duplicate_sector() {
    let err = PanelLayout::from_yaml_str("main:\n  top: [1, 2]\n").unwrap_err();
    assert!(matches!(
        err,
        LayoutError::DuplicateSector {
            panel: Panel::Main,
            ..
        }
    ));
}

#[test]
fn layout_rejects_sector_out_of_range() {
    let err = PanelLayout::from_yaml_str(
        "sections:\n  top:\n    - { symbol: h, sectors: [0] }\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::SectorOutOfRange {
            panel: Panel::Section(Section::Top),
            sector: 0
        }
    ));
}

#[test]
fn layout_rejects_duplicate_symbol() {
    let err = PanelLayout::from_yaml_str(
        "numbers:\n  - { symbol: '1', sectors: [1] }\n  - { symbol: '1', sectors: [2] }\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::DuplicateSymbol { symbol: '1', .. }
    ));
}

#[test]
fn layout_rejects_empty_panel_and_unknown_keys() {
    let err = PanelLayout::from_yaml_str("numbers: []\n").unwrap_err();
    assert!(matches!(err, LayoutError::EmptyPanel(Panel::Num)));
    let err = PanelLayout::from_yaml_str("keys: {}\n").unwrap_err();
    assert!(matches!(err, LayoutError::Yaml(_)));
}

#[test]
fn raw_sample_right_of_center_enters_mapped_section() {
    let profile = CalibrationProfile::from_points([
        (ReferencePoint::Center, Point::new(0.5, 0.5)),
        (ReferencePoint::TopMid, Point::new(0.5, 0.9)),
        (ReferencePoint::LeftMid, Point::new(0.1, 0.5)),
        (ReferencePoint::BottomMid, Point::new(0.5, 0.1)),
        (ReferencePoint::RightMid, Point::new(0.9, 0.5)),
    ])
    .unwrap();
    let canonical = profile.transform(Point::new(0.78, 0.5));
    let zone = RegionTable::default().classify(canonical.x, canonical.y);
    assert_eq!(zone.label(), "1");

    let layout =
        PanelLayout::from_yaml_str("main:\n  top: [1]\n  right: [19, 20, 2]\n").unwrap();
    let mut engine = SelectionEngine::new(&layout, EngineConfig::default()).unwrap();
    let events = feed(&mut engine, zone.label(), usize::from(DEFAULT_THRESHOLD));
    assert_eq!(engine.panel(), Panel::Section(Section::Top));
    assert_eq!(engine.text(), "");
    assert!(events.contains(&EngineEvent::PanelChanged {
        from: Panel::Main,
        to: Panel::Section(Section::Top)
    }));
}
