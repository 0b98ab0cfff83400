//! Pattern cell decoding

use crate::song::{Note, NoteName};
use crate::tables::{period_index, NOTE_BASE_OCTAVE, NOTE_NAMES};

/// Bytes per pattern cell.
pub const NOTE_SIZE: usize = 4;

/// Decode one 4-byte pattern cell.
///
/// ```text
/// byte 0: ssss pppp   sample high nibble, period bits 11-8
/// byte 1: pppp pppp   period bits 7-0
/// byte 2: ssss eeee   sample low nibble, effect code
/// byte 3: aaaa aaaa   effect argument
/// ```
pub fn decode_note(cell: [u8; NOTE_SIZE]) -> Note {
    let sample_number = (cell[0] & 0xF0) | (cell[2] >> 4);
    let period = u16::from(cell[0] & 0x0F) * 256 + u16::from(cell[1]);

    Note {
        sample_number,
        period,
        effect: cell[2] & 0x0F,
        effect_argument: cell[3],
        name: note_name(period),
    }
}

/// Display name for a period.
///
/// Uses the first period table entry at or above `period`; periods above the
/// table (or 0) have no name.
pub fn note_name(period: u16) -> Option<NoteName> {
    if period == 0 {
        return None;
    }
    let idx = period_index(period)?;
    Some(NoteName {
        letter: NOTE_NAMES[idx % NOTE_NAMES.len()],
        octave: NOTE_BASE_OCTAVE - (idx / NOTE_NAMES.len()) as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        // sample 0x1A, period 0x1AC (428), effect C, argument 0x40
        let note = decode_note([0x11, 0xAC, 0xAC, 0x40]);
        assert_eq!(note.sample_number, 0x1A);
        assert_eq!(note.period, 428);
        assert_eq!(note.effect, 0x0C);
        assert_eq!(note.effect_argument, 0x40);
        assert_eq!(note.name_label(), "C-3");
    }

    #[test]
    fn test_empty_cell() {
        let note = decode_note([0, 0, 0, 0]);
        assert_eq!(note, Note::default());
        assert!(note.name.is_none());
    }

    #[test]
    fn test_note_names_across_octaves() {
        assert_eq!(note_name(113).unwrap().to_string(), "B-4");
        assert_eq!(note_name(214).unwrap().to_string(), "C-4");
        assert_eq!(note_name(226).unwrap().to_string(), "B-3");
        assert_eq!(note_name(856).unwrap().to_string(), "C-2");
    }

    #[test]
    fn test_off_table_periods() {
        // between entries: next greater period names the note
        assert_eq!(note_name(425).unwrap().to_string(), "C-3");
        // below the table still maps onto the highest note
        assert_eq!(note_name(60).unwrap().to_string(), "B-4");
        // above the table has no name
        assert!(note_name(1000).is_none());
        assert!(note_name(0).is_none());
    }

    #[test]
    fn test_decoding_is_total() {
        for b0 in [0x00u8, 0x0F, 0xF0, 0xFF] {
            for b2 in [0x00u8, 0x0F, 0xF0, 0xFF] {
                let note = decode_note([b0, 0xFF, b2, 0xFF]);
                assert!(note.effect <= 15);
                assert!(note.period <= 0x0FFF);
                if note.period == 0 {
                    assert!(note.name.is_none());
                }
            }
        }
    }
}
