//! Time-ordered MIDI event lists and the builder that derives them from a performance

use crate::config::MidiConfig;
use crate::error::{Error, Result};
use crate::mapper::NoteMapper;
use crate::performance::{NoteEntry, Performance};
use crate::timing::{TimingCalculator, PRESS_DURATION};
use log::debug;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

pub const DEFAULT_VELOCITY: u8 = 127;

/// What an event does when it comes due
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    /// A self-contained press: note-on, hold for `duration` seconds, note-off
    SlotPress { note: u8, duration: f64 },
}

impl EventKind {
    /// Canonical name; also the tie-break key for simultaneous events
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::NoteOn { .. } => "note_on",
            EventKind::NoteOff { .. } => "note_off",
            EventKind::SlotPress { .. } => "slot_press",
        }
    }

    pub fn note(&self) -> u8 {
        match *self {
            EventKind::NoteOn { note, .. }
            | EventKind::NoteOff { note }
            | EventKind::SlotPress { note, .. } => note,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub timestamp: f64,
    pub kind: EventKind,
    pub label: String,
}

impl ScheduledEvent {
    pub fn new(timestamp: f64, kind: EventKind, label: impl Into<String>) -> Self {
        ScheduledEvent {
            timestamp,
            kind,
            label: label.into(),
        }
    }

    pub fn note(&self) -> u8 {
        self.kind.note()
    }

    pub fn velocity(&self) -> u8 {
        match self.kind {
            EventKind::NoteOn { velocity, .. } => velocity,
            EventKind::NoteOff { .. } => 0,
            EventKind::SlotPress { .. } => DEFAULT_VELOCITY,
        }
    }

    /// Press width, only meaningful for slot presses
    pub fn duration_hint(&self) -> Option<f64> {
        match self.kind {
            EventKind::SlotPress { duration, .. } => Some(duration),
            _ => None,
        }
    }
}

fn playback_order(a: &ScheduledEvent, b: &ScheduledEvent) -> Ordering {
    a.timestamp
        .total_cmp(&b.timestamp)
        .then_with(|| a.kind.name().cmp(b.kind.name()))
}

/// A fully resolved performance, sorted for playback
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    events: Vec<ScheduledEvent>,
    total_duration: f64,
    slot: u8,
    tempo: u16,
}

impl Sequence {
    /// Sorts `events` by timestamp, then kind name, keeping insertion order for full ties
    pub fn new(mut events: Vec<ScheduledEvent>, total_duration: f64, slot: u8, tempo: u16) -> Self {
        events.sort_by(playback_order);
        Sequence {
            events,
            total_duration,
            slot,
            tempo,
        }
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    pub fn events_at(&self, timestamp: f64, tolerance: f64) -> Vec<&ScheduledEvent> {
        self.events
            .iter()
            .filter(|event| (event.timestamp - timestamp).abs() <= tolerance)
            .collect()
    }

    /// Events with `start <= timestamp <= end`
    pub fn events_in_range(&self, start: f64, end: f64) -> Vec<&ScheduledEvent> {
        self.events
            .iter()
            .filter(|event| (start..=end).contains(&event.timestamp))
            .collect()
    }

    pub fn count_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.kind.name()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();
        let _ = writeln!(summary, "Sequence summary:");
        let _ = writeln!(summary, "  Slot: {}", self.slot);
        let _ = writeln!(summary, "  Tempo: {} BPM", self.tempo);
        let _ = writeln!(summary, "  Total duration: {:.2}s", self.total_duration);
        let _ = writeln!(summary, "  Total events: {}", self.events.len());
        let _ = writeln!(summary);
        let _ = write!(summary, "Event breakdown:");
        for (kind, count) in self.count_by_kind() {
            let _ = write!(summary, "\n  {}: {}", kind, count);
        }
        summary
    }
}

/// Turns a [`Performance`] into a [`Sequence`] using one set of lookup tables
#[derive(Debug, Clone, Copy)]
pub struct SequenceBuilder<'a> {
    mapper: NoteMapper<'a>,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(config: &'a MidiConfig) -> Self {
        SequenceBuilder {
            mapper: NoteMapper::new(config),
        }
    }

    pub fn mapper(&self) -> &NoteMapper<'a> {
        &self.mapper
    }

    pub fn build(&self, performance: &Performance) -> Result<Sequence> {
        let timing = TimingCalculator::new(performance.tempo());
        let mut events = vec![self.slot_event(performance.slot(), &timing)?];

        let notes = performance.notes();
        let starts = timing.note_start_times(notes.len());
        for (i, (note, start)) in notes.iter().zip(starts).enumerate() {
            self.note_events(note, start, &timing, i + 1, &mut events)?;
        }

        let sequence = Sequence::new(
            events,
            timing.total_duration(notes.len()),
            performance.slot(),
            performance.tempo(),
        );
        debug!(
            "Built sequence: {} events over {:.3}s",
            sequence.len(),
            sequence.total_duration()
        );
        Ok(sequence)
    }

    fn slot_event(&self, slot: u8, timing: &TimingCalculator) -> Result<ScheduledEvent> {
        let note = self
            .mapper
            .map_slot(slot)
            .ok_or_else(|| Error::InvalidInput(format!("invalid slot: {}", slot)))?;
        Ok(ScheduledEvent::new(
            timing.slot_time(),
            EventKind::SlotPress {
                note,
                duration: PRESS_DURATION,
            },
            format!("Slot {} selection", slot),
        ))
    }

    fn note_events(
        &self,
        entry: &NoteEntry,
        start: f64,
        timing: &TimingCalculator,
        number: usize,
        events: &mut Vec<ScheduledEvent>,
    ) -> Result<()> {
        let modifiers = entry
            .active_modifiers()
            .map(|(index, value)| {
                self.mapper
                    .map_modifier(index, value)
                    .map(|note| (index, note))
                    .ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "note {}: invalid modifier{} value: {}",
                            number, index, value
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        for &(index, note) in &modifiers {
            events.push(ScheduledEvent::new(
                timing.modifier_press_time(start),
                EventKind::NoteOn {
                    note,
                    velocity: DEFAULT_VELOCITY,
                },
                format!("Note {}: Modifier{} press", number, index),
            ));
        }

        let degree = entry.degree();
        let degree_note = self
            .mapper
            .map_degree(degree)
            .ok_or_else(|| Error::InvalidInput(format!("invalid degree: {}", degree)))?;
        let presses = timing.degree_press_times(start);
        let press_count = presses.len();
        for (i, press) in presses.into_iter().enumerate() {
            events.push(ScheduledEvent::new(
                press,
                EventKind::NoteOn {
                    note: degree_note,
                    velocity: DEFAULT_VELOCITY,
                },
                format!(
                    "Note {}: Degree '{}' press {}/{}",
                    number,
                    degree,
                    i + 1,
                    press_count
                ),
            ));
            events.push(ScheduledEvent::new(
                timing.release_time(press),
                EventKind::NoteOff { note: degree_note },
                format!(
                    "Note {}: Degree '{}' release {}/{}",
                    number,
                    degree,
                    i + 1,
                    press_count
                ),
            ));
        }

        for &(index, note) in &modifiers {
            events.push(ScheduledEvent::new(
                timing.modifier_release_time(start),
                EventKind::NoteOff { note },
                format!("Note {}: Modifier{} release", number, index),
            ));
        }
        Ok(())
    }
}
