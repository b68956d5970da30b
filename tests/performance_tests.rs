use kantanplay::performance::Advisory;
use kantanplay::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn invalid_input_message(result: Result<Performance>) -> String {
    match result {
        Err(Error::InvalidInput(message)) => message,
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_load_from_file() {
    let file = write_temp(
        r#"{
            "slot": 2,
            "tempo": 96,
            "notes": [
                {"degree": "1"},
                {"degree": "3b", "modifier1": 2, "modifier3": 8}
            ]
        }"#,
    );
    let performance = Performance::from_file(file.path()).unwrap();
    assert_eq!(performance.slot(), 2);
    assert_eq!(performance.tempo(), 96);
    assert_eq!(performance.notes().len(), 2);

    let second = &performance.notes()[1];
    assert_eq!(second.degree(), Degree::FlatThree);
    assert_eq!(second.modifier(1), 2);
    assert_eq!(second.modifier(2), 0);
    assert_eq!(second.modifier(3), 8);
    assert_eq!(second.active_modifiers().collect::<Vec<_>>(), vec![(1, 2), (3, 8)]);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Performance::from_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::Read { .. })));
}

#[test]
fn test_malformed_json() {
    let message = invalid_input_message(Performance::from_json_str("{\"slot\": 1,"));
    assert!(message.starts_with("malformed JSON"));
}

#[test]
fn test_missing_fields_listed() {
    let message = invalid_input_message(Performance::from_json_str(r#"{"tempo": 120}"#));
    assert_eq!(message, "missing required fields: [slot, notes]");
}

#[test]
fn test_out_of_range_values() {
    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 9, "tempo": 120, "notes": [{"degree": "1"}]}"#,
    ));
    assert_eq!(message, "slot must be between 1 and 8, got 9");

    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": 601, "notes": [{"degree": "1"}]}"#,
    ));
    assert_eq!(message, "tempo must be between 20 and 600, got 601");

    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": 19, "notes": [{"degree": "1"}]}"#,
    ));
    assert_eq!(message, "tempo must be between 20 and 600, got 19");
}

#[test]
fn test_boundary_values_accepted() {
    for json in [
        r#"{"slot": 1, "tempo": 20, "notes": [{"degree": "7"}]}"#,
        r#"{"slot": 8, "tempo": 600, "notes": [{"degree": "2b", "modifier2": 8}]}"#,
    ] {
        assert!(Performance::from_json_str(json).is_ok(), "{}", json);
    }
}

#[test]
fn test_non_integer_tempo() {
    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": "fast", "notes": [{"degree": "1"}]}"#,
    ));
    assert!(message.starts_with("tempo must be an integer"));
}

#[test]
fn test_empty_notes() {
    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": 120, "notes": []}"#,
    ));
    assert_eq!(message, "notes list cannot be empty");
}

#[test]
fn test_bad_note_entries() {
    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": 120, "notes": [{"degree": "1"}, {"modifier1": 1}]}"#,
    ));
    assert_eq!(message, "note at index 1 is missing 'degree' field");

    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": 120, "notes": [{"degree": "1", "modifier2": 9}]}"#,
    ));
    assert_eq!(
        message,
        "note at index 0: modifier2 must be between 0 and 8, got 9"
    );

    let message = invalid_input_message(Performance::from_json_str(
        r#"{"slot": 1, "tempo": 120, "notes": [{"degree": "8"}]}"#,
    ));
    assert!(message.starts_with("invalid degree: '8'"));
}

#[test]
fn test_estimated_minutes() {
    let notes = vec![NoteEntry::plain(Degree::One); 30];
    let performance = Performance::new(1, 120, notes).unwrap();
    assert_eq!(performance.estimated_minutes(), 2.0);
    assert!(performance.advisories().is_empty());
}

#[test]
fn test_long_performance_advisory() {
    // 80 notes * 8 beats at 60 BPM is 10.67 minutes
    let notes = vec![NoteEntry::plain(Degree::Five); 80];
    let performance = Performance::new(1, 60, notes).unwrap();
    let advisories = performance.advisories();
    assert_eq!(advisories.len(), 1);
    match &advisories[0] {
        Advisory::LongPerformance { minutes } => assert!((minutes - 10.0 - 2.0 / 3.0).abs() < 1e-9),
    }
    assert!(advisories[0].to_string().contains("10.7 minutes"));
}

#[test]
fn test_config_from_file() {
    let file = write_temp(
        r#"{
            "slot": [24, 25, 26, 27, 28, 29, 30, 31],
            "notes": [60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71],
            "modifier1": [36, 37, 38, 39, 40, 41, 42, 43],
            "modifier2": [44, 45, 46, 47, 48, 49, 50, 51],
            "modifier3": [52, 53, 54, 55, 56, 57, 58, 59]
        }"#,
    );
    let config = MidiConfig::load(file.path()).unwrap();
    assert_eq!(config.slot_notes()[0], 24);
    assert_eq!(config.degree_notes()[11], 71);
    assert_eq!(config.modifier_notes(2).unwrap()[7], 51);
    assert_eq!(config.modifier_notes(4), None);
}
