use crate::mapper::NoteMapper;
use crate::performance::Performance;
use std::fmt::Write;

/// Notes listed individually by the conversion report
const REPORTED_NOTES: usize = 5;

pub fn performance_info(performance: &Performance) -> String {
    format!(
        "Slot: {}\nTempo: {} BPM\nNotes: {}\nEstimated duration: {:.1} min",
        performance.slot(),
        performance.tempo(),
        performance.notes().len(),
        performance.estimated_minutes()
    )
}

fn note_or_missing(note: Option<u8>) -> String {
    note.map_or_else(|| "unmapped".to_string(), |n| n.to_string())
}

/// Slot and per-note MIDI mapping, for the first few notes
pub fn conversion_report(performance: &Performance, mapper: &NoteMapper<'_>) -> String {
    let mut report = String::new();
    let _ = writeln!(
        report,
        "Slot {} -> MIDI note {}",
        performance.slot(),
        note_or_missing(mapper.map_slot(performance.slot()))
    );
    let _ = write!(report, "Notes:");

    for (i, note) in performance.notes().iter().take(REPORTED_NOTES).enumerate() {
        let _ = write!(
            report,
            "\n  {}. degree '{}' -> MIDI note {}",
            i + 1,
            note.degree(),
            note_or_missing(mapper.map_degree(note.degree()))
        );

        let modifiers: Vec<String> = note
            .active_modifiers()
            .map(|(index, value)| {
                format!(
                    "Mod{}({})->{}",
                    index,
                    value,
                    note_or_missing(mapper.map_modifier(index, value))
                )
            })
            .collect();
        if !modifiers.is_empty() {
            let _ = write!(report, "\n     modifiers: {}", modifiers.join(", "));
        }
    }

    let remaining = performance.notes().len().saturating_sub(REPORTED_NOTES);
    if remaining > 0 {
        let _ = write!(report, "\n     ... {} more notes", remaining);
    }
    report
}
