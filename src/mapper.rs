use crate::config::MidiConfig;
use crate::performance::Degree;

/// Resolves slots, degrees and modifier values to MIDI note numbers.
///
/// Every lookup returns `None` rather than panicking when its input falls
/// outside the configured tables.
#[derive(Debug, Clone, Copy)]
pub struct NoteMapper<'a> {
    config: &'a MidiConfig,
}

impl<'a> NoteMapper<'a> {
    pub fn new(config: &'a MidiConfig) -> Self {
        NoteMapper { config }
    }

    /// Slot 1-8
    pub fn map_slot(&self, slot: u8) -> Option<u8> {
        let index = usize::from(slot).checked_sub(1)?;
        self.config.slot_notes().get(index).copied()
    }

    pub fn map_degree(&self, degree: Degree) -> Option<u8> {
        self.config.degree_notes().get(degree.index()).copied()
    }

    /// Same as [`NoteMapper::map_degree`] for a symbolic name such as `"3b"`
    pub fn map_degree_name(&self, name: &str) -> Option<u8> {
        name.parse::<Degree>()
            .ok()
            .and_then(|degree| self.map_degree(degree))
    }

    /// Modifier slot 1-3 with value 1-8; value 0 means the modifier is inactive
    pub fn map_modifier(&self, index: u8, value: u8) -> Option<u8> {
        if value == 0 {
            return None;
        }
        let table = self.config.modifier_notes(index)?;
        table.get(usize::from(value) - 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> MidiConfig {
        MidiConfig::new(
            vec![24, 25, 26, 27, 28, 29, 30, 31],
            vec![60, 61, 62, 63, 64, 65, 66, 67, 68, 69, 70, 71],
            vec![52, 53, 54, 55, 56, 57, 58, 59],
            vec![52, 53, 54, 55, 56, 57, 58, 59],
            vec![40, 41, 42, 43, 44, 45, 46, 47],
        )
        .unwrap()
    }

    #[test]
    fn test_map_slot() {
        let config = sample_config();
        let mapper = NoteMapper::new(&config);
        assert_eq!(mapper.map_slot(1), Some(24));
        assert_eq!(mapper.map_slot(5), Some(28));
        assert_eq!(mapper.map_slot(8), Some(31));
        assert_eq!(mapper.map_slot(0), None);
        assert_eq!(mapper.map_slot(9), None);
    }

    #[test]
    fn test_map_degree_names() {
        let config = sample_config();
        let mapper = NoteMapper::new(&config);
        let expected = [
            ("1", 60),
            ("2b", 61),
            ("2", 62),
            ("3b", 63),
            ("3", 64),
            ("4", 65),
            ("5b", 66),
            ("5", 67),
            ("6b", 68),
            ("6", 69),
            ("7b", 70),
            ("7", 71),
        ];
        for (name, note) in expected {
            assert_eq!(mapper.map_degree_name(name), Some(note), "degree {}", name);
        }
        assert_eq!(mapper.map_degree_name("8"), None);
        assert_eq!(mapper.map_degree_name("1b"), None);
    }

    #[test]
    fn test_map_modifier() {
        let config = sample_config();
        let mapper = NoteMapper::new(&config);
        assert_eq!(mapper.map_modifier(1, 0), None);
        assert_eq!(mapper.map_modifier(1, 1), Some(52));
        assert_eq!(mapper.map_modifier(2, 3), Some(54));
        assert_eq!(mapper.map_modifier(3, 8), Some(47));
        assert_eq!(mapper.map_modifier(3, 9), None);
        assert_eq!(mapper.map_modifier(4, 1), None);
        assert_eq!(mapper.map_modifier(0, 1), None);
    }
}
