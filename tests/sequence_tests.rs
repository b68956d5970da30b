use kantanplay::sequence::DEFAULT_VELOCITY;
use kantanplay::*;

fn test_config() -> MidiConfig {
    MidiConfig::new(
        (24..32).collect(),
        (60..72).collect(),
        (36..44).collect(),
        (44..52).collect(),
        (52..60).collect(),
    )
    .unwrap()
}

fn build(slot: u8, tempo: u16, notes: Vec<NoteEntry>) -> Sequence {
    let config = test_config();
    let performance = Performance::new(slot, tempo, notes).unwrap();
    SequenceBuilder::new(&config).build(&performance).unwrap()
}

fn note(degree: &str, m1: u8, m2: u8, m3: u8) -> NoteEntry {
    NoteEntry::new(degree, m1, m2, m3).unwrap()
}

#[test]
fn test_single_note_at_60_bpm() {
    let sequence = build(1, 60, vec![note("1", 0, 0, 0)]);

    assert_eq!(sequence.total_duration(), 8.0);
    assert_eq!(sequence.len(), 17);
    assert_eq!(sequence.slot(), 1);
    assert_eq!(sequence.tempo(), 60);

    let slot_events: Vec<_> = sequence
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EventKind::SlotPress { .. }))
        .collect();
    assert_eq!(slot_events.len(), 1);
    assert_eq!(slot_events[0].timestamp, 0.0);
    assert_eq!(slot_events[0].note(), 24);
    assert_eq!(slot_events[0].duration_hint(), Some(0.05));
    assert_eq!(slot_events[0].label, "Slot 1 selection");

    let presses: Vec<f64> = sequence
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EventKind::NoteOn { note: 60, .. }))
        .map(|e| e.timestamp)
        .collect();
    assert_eq!(presses, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

    let releases: Vec<f64> = sequence
        .events()
        .iter()
        .filter(|e| matches!(e.kind, EventKind::NoteOff { note: 60 }))
        .map(|e| e.timestamp)
        .collect();
    assert_eq!(releases.len(), 8);
    for (press, release) in presses.iter().zip(&releases) {
        assert!((release - press - 0.05).abs() < 1e-9);
    }
}

#[test]
fn test_simultaneous_events_ordered_by_kind_name() {
    let sequence = build(1, 60, vec![note("1", 0, 0, 0)]);
    let first_two: Vec<&str> = sequence.events()[..2]
        .iter()
        .map(|e| e.kind.name())
        .collect();
    assert_eq!(first_two, vec!["note_on", "slot_press"]);
}

#[test]
fn test_events_sorted_for_playback() {
    let sequence = build(
        4,
        133,
        vec![note("3", 1, 0, 2), note("5b", 0, 8, 0), note("7", 3, 3, 3)],
    );
    for pair in sequence.events().windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
        if pair[0].timestamp == pair[1].timestamp {
            assert!(pair[0].kind.name() <= pair[1].kind.name());
        }
    }
}

#[test]
fn test_modifiers_held_for_whole_note() {
    let sequence = build(2, 120, vec![note("3", 1, 0, 2)]);

    // slot + 8 presses + 8 releases + 2 modifiers on and off
    assert_eq!(sequence.len(), 21);
    assert_eq!(sequence.total_duration(), 4.0);

    let first = &sequence.events()[0];
    assert_eq!(
        first.kind,
        EventKind::NoteOn {
            note: 36,
            velocity: DEFAULT_VELOCITY
        }
    );
    assert_eq!(first.label, "Note 1: Modifier1 press");

    let mod3_off = sequence
        .events()
        .iter()
        .find(|e| e.kind == EventKind::NoteOff { note: 53 })
        .unwrap();
    assert_eq!(mod3_off.timestamp, 4.0);
    assert_eq!(mod3_off.label, "Note 1: Modifier3 release");
}

#[test]
fn test_releases_precede_presses_at_note_boundary() {
    let sequence = build(1, 120, vec![note("1", 2, 0, 0), note("2", 2, 0, 0)]);
    let boundary = sequence.events_at(4.0, 1e-9);
    let kinds: Vec<&str> = boundary.iter().map(|e| e.kind.name()).collect();
    assert_eq!(kinds, vec!["note_off", "note_on", "note_on"]);
    assert_eq!(boundary[0].label, "Note 1: Modifier1 release");
    assert_eq!(boundary[1].label, "Note 2: Modifier1 press");
    assert_eq!(boundary[2].label, "Note 2: Degree '2' press 1/8");
}

#[test]
fn test_event_count_scales_with_modifiers() {
    let notes = vec![
        note("1", 0, 0, 0),
        note("2b", 1, 0, 0),
        note("4", 1, 1, 0),
        note("6", 1, 1, 1),
    ];
    let sequence = build(8, 200, notes);
    let active = 6;
    assert_eq!(sequence.len(), 1 + 4 * 16 + 2 * active);

    let counts = sequence.count_by_kind();
    assert_eq!(counts["slot_press"], 1);
    assert_eq!(counts["note_on"], 4 * 8 + active);
    assert_eq!(counts["note_off"], 4 * 8 + active);
}

#[test]
fn test_total_duration_matches_tempo() {
    let sequence = build(1, 90, vec![note("1", 0, 0, 0); 3]);
    assert_eq!(sequence.total_duration(), 3.0 * 8.0 * (60.0 / 90.0));
    let last = sequence.events().last().unwrap();
    assert!(last.timestamp < sequence.total_duration());
}

#[test]
fn test_build_is_deterministic() {
    let notes = vec![note("3b", 4, 0, 1), note("6b", 0, 7, 0)];
    let first = build(5, 97, notes.clone());
    let second = build(5, 97, notes);
    assert_eq!(first, second);
}

#[test]
fn test_invalid_slot_rejected() {
    let result = Performance::new(9, 120, vec![note("1", 0, 0, 0)]);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    let result = Performance::new(0, 120, vec![note("1", 0, 0, 0)]);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_range_queries() {
    let sequence = build(1, 60, vec![note("1", 0, 0, 0)]);
    // 0.0 press and slot, 0.05 release, 1.0 press
    assert_eq!(sequence.events_in_range(0.0, 1.0).len(), 4);
    let at_two = sequence.events_at(2.0, 0.001);
    assert_eq!(at_two.len(), 1);
    assert_eq!(at_two[0].label, "Note 1: Degree '1' press 3/8");
    assert_eq!(at_two[0].velocity(), DEFAULT_VELOCITY);
}

#[test]
fn test_summary() {
    let sequence = build(3, 120, vec![note("5", 0, 0, 0)]);
    let summary = sequence.summary();
    assert!(summary.starts_with("Sequence summary:"));
    assert!(summary.contains("Slot: 3"));
    assert!(summary.contains("Tempo: 120 BPM"));
    assert!(summary.contains("Total duration: 4.00s"));
    assert!(summary.contains("Total events: 17"));
    assert!(summary.contains("note_on: 8"));
    assert!(summary.contains("slot_press: 1"));
}

#[test]
fn test_estimated_minutes_match_playback_length() {
    let config = test_config();
    for tempo in [60u16, 90, 120, 333] {
        let performance = Performance::new(1, tempo, vec![note("2", 0, 0, 0); 7]).unwrap();
        let sequence = SequenceBuilder::new(&config).build(&performance).unwrap();
        assert!((performance.estimated_minutes() * 60.0 - sequence.total_duration()).abs() < 1e-9);
    }
}
