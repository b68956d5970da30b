//! Tempo-derived timestamps for every structural event of a performance.
//!
//! All values are absolute seconds from the start of the performance.

/// Every note occupies this many beats, whatever its modifiers
pub const BEATS_PER_NOTE: u32 = 8;

/// Number of degree button presses inside one note, one per beat
pub const DEGREE_PRESSES_PER_NOTE: u32 = 8;

/// Width of a single button press in seconds, independent of tempo
pub const PRESS_DURATION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingCalculator {
    tempo: u16,
    seconds_per_beat: f64,
}

impl TimingCalculator {
    /// `tempo` in beats per minute, must be non-zero
    pub fn new(tempo: u16) -> Self {
        TimingCalculator {
            tempo,
            seconds_per_beat: 60.0 / f64::from(tempo),
        }
    }

    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    pub fn seconds_per_beat(&self) -> f64 {
        self.seconds_per_beat
    }

    pub fn note_duration(&self) -> f64 {
        self.seconds_per_beat * f64::from(BEATS_PER_NOTE)
    }

    /// Start time of each of `count` back-to-back notes
    pub fn note_start_times(&self, count: usize) -> Vec<f64> {
        let note_duration = self.note_duration();
        (0..count).map(|i| i as f64 * note_duration).collect()
    }

    /// Degree press instants inside a note starting at `note_start`
    pub fn degree_press_times(&self, note_start: f64) -> Vec<f64> {
        (0..DEGREE_PRESSES_PER_NOTE)
            .map(|i| note_start + f64::from(i) * self.seconds_per_beat)
            .collect()
    }

    /// Release instant of a press that started at `press_time`
    pub fn release_time(&self, press_time: f64) -> f64 {
        press_time + PRESS_DURATION
    }

    /// The slot is selected before anything else plays
    pub fn slot_time(&self) -> f64 {
        0.0
    }

    pub fn modifier_press_time(&self, note_start: f64) -> f64 {
        note_start
    }

    pub fn modifier_release_time(&self, note_start: f64) -> f64 {
        note_start + self.note_duration()
    }

    pub fn total_duration(&self, count: usize) -> f64 {
        count as f64 * self.note_duration()
    }
}
