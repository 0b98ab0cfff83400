//! MOD module decoder
//!
//! Layout (all multi-byte fields big-endian):
//! - Song name: 20 bytes
//! - Sample headers: 15 or 31 × 30 bytes
//! - Positions used: 1 byte
//! - Restart position: 1 byte
//! - Position table: 128 bytes
//! - Format tag: 4 bytes (tagged modules only)
//! - Patterns: channels × 64 rows × 4 bytes each
//! - Sample PCM, in header order, anchored at the end of the file

use super::format::{detect_format, TAG_LEN};
use super::note::{decode_note, NOTE_SIZE};
use super::DecodeError;
use crate::song::{
    FormatDescription, Pattern, Sample, Song, POSITION_TABLE_LEN, ROWS_PER_PATTERN,
};
use crate::tables::is_standard_period;
use nom::bytes::complete::take;
use nom::multi::count;
use nom::number::complete::{be_u16, u8 as byte};
use nom::IResult;

const SONG_NAME_LEN: usize = 20;
const SAMPLE_NAME_LEN: usize = 22;
const SAMPLE_HEADER_LEN: usize = 30;

/// Raw 30-byte sample header, lengths still in words.
#[derive(Debug, Clone)]
struct SampleHeader {
    name: String,
    length_words: u16,
    fine_tune: u8,
    volume: u8,
    loop_offset_words: u16,
    loop_length_words: u16,
}

impl SampleHeader {
    /// Convert word counts to bytes and clamp the loop into the sample.
    fn into_sample(self) -> Sample {
        let length = u32::from(self.length_words) << 1;
        let (loop_offset, loop_length) = clamp_loop(
            length,
            u32::from(self.loop_offset_words) << 1,
            u32::from(self.loop_length_words) << 1,
        );

        Sample {
            name: self.name,
            fine_tune: self.fine_tune & 0x0F,
            volume: self.volume,
            data: Vec::new(),
            length,
            loop_offset,
            loop_length,
        }
    }
}

/// Song-level fields that follow the sample headers.
struct SongHeader {
    name: String,
    samples: Vec<SampleHeader>,
    num_positions: u8,
    restart_position: u8,
    positions: Vec<u8>,
}

/// Pull a loop region back inside the sample.
///
/// Many modules store loops that overrun the sample end; the region is moved
/// back first and shortened only if it is longer than the sample itself.
pub(crate) fn clamp_loop(length: u32, offset: u32, loop_length: u32) -> (u32, u32) {
    let excess = (offset + loop_length).saturating_sub(length);
    let offset = offset.saturating_sub(excess).min(length);
    let loop_length = loop_length.min(length - offset);
    (offset, loop_length)
}

fn text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

fn sample_header(input: &[u8]) -> IResult<&[u8], SampleHeader> {
    let (input, name) = take(SAMPLE_NAME_LEN)(input)?;
    let (input, length_words) = be_u16(input)?;
    let (input, fine_tune) = byte(input)?;
    let (input, volume) = byte(input)?;
    let (input, loop_offset_words) = be_u16(input)?;
    let (input, loop_length_words) = be_u16(input)?;

    Ok((
        input,
        SampleHeader {
            name: text(name),
            length_words,
            fine_tune,
            volume,
            loop_offset_words,
            loop_length_words,
        },
    ))
}

fn song_header(num_samples: usize) -> impl Fn(&[u8]) -> IResult<&[u8], SongHeader> {
    move |input| {
        let (input, name) = take(SONG_NAME_LEN)(input)?;
        let (input, samples) = count(sample_header, num_samples)(input)?;
        let (input, num_positions) = byte(input)?;
        let (input, restart_position) = byte(input)?;
        let (input, positions) = take(POSITION_TABLE_LEN)(input)?;

        Ok((
            input,
            SongHeader {
                name: text(name),
                samples,
                num_positions,
                restart_position,
                positions: positions.to_vec(),
            },
        ))
    }
}

/// Size of everything before the first pattern.
fn header_len(format: &FormatDescription) -> usize {
    let tag_len = if format.tag.is_some() { TAG_LEN } else { 0 };
    SONG_NAME_LEN
        + format.num_samples as usize * SAMPLE_HEADER_LEN
        + 2
        + POSITION_TABLE_LEN
        + tag_len
}

fn decode_pattern(bytes: &[u8], num_channels: usize) -> Pattern {
    let rows = bytes
        .chunks_exact(num_channels * NOTE_SIZE)
        .take(ROWS_PER_PATTERN)
        .map(|row| {
            row.chunks_exact(NOTE_SIZE)
                .map(|cell| decode_note([cell[0], cell[1], cell[2], cell[3]]))
                .collect()
        })
        .collect();
    Pattern { rows }
}

/// True when every note in the played patterns sits exactly on the standard
/// period table.
pub(crate) fn has_standard_notes_only(patterns: &[Pattern], positions: &[u8]) -> bool {
    positions
        .iter()
        .filter_map(|&idx| patterns.get(idx as usize))
        .flat_map(|pattern| pattern.rows.iter())
        .flat_map(|row| row.iter())
        .all(|note| is_standard_period(note.period))
}

/// Decode a complete module from a byte buffer.
pub fn parse_module(data: &[u8]) -> Result<Song, DecodeError> {
    let format = detect_format(data)?;
    let header_end = header_len(&format);
    if data.len() < header_end {
        return Err(DecodeError::Truncated {
            what: "module header",
            offset: 0,
            needed: header_end,
            len: data.len(),
        });
    }

    let (_, header) = song_header(format.num_samples as usize)(data).map_err(|_| {
        DecodeError::Truncated {
            what: "module header",
            offset: 0,
            needed: header_end,
            len: data.len(),
        }
    })?;

    let mut samples: Vec<Sample> = header
        .samples
        .into_iter()
        .map(SampleHeader::into_sample)
        .collect();

    let num_positions = if header.num_positions as usize > POSITION_TABLE_LEN {
        log::warn!(
            "Song length {} exceeds position table, clamping to {}",
            header.num_positions,
            POSITION_TABLE_LEN
        );
        POSITION_TABLE_LEN as u8
    } else {
        header.num_positions
    };

    let pcm_total: usize = samples.iter().map(|s| s.length as usize).sum();
    let pattern_bytes = data
        .len()
        .checked_sub(pcm_total)
        .and_then(|rest| rest.checked_sub(header_end))
        .ok_or(DecodeError::Truncated {
            what: "sample data",
            offset: header_end,
            needed: pcm_total,
            len: data.len(),
        })?;

    let num_channels = format.num_channels as usize;
    let pattern_size = num_channels * ROWS_PER_PATTERN * NOTE_SIZE;
    let mut num_patterns = pattern_bytes / pattern_size;

    let required = header.positions[..num_positions as usize]
        .iter()
        .copied()
        .max()
        .unwrap_or(0) as usize
        + 1;
    if required > num_patterns {
        log::warn!(
            "Position table references {} patterns but file holds {}, widening",
            required,
            num_patterns
        );
        num_patterns = required;
    }

    let patterns_end = header_end + num_patterns * pattern_size;
    let pattern_data = data.get(header_end..patterns_end).ok_or_else(|| {
        DecodeError::Inconsistent(format!(
            "{} patterns need {} bytes after offset {}, file is {} bytes",
            num_patterns,
            num_patterns * pattern_size,
            header_end,
            data.len()
        ))
    })?;

    let patterns: Vec<Pattern> = pattern_data
        .chunks_exact(pattern_size)
        .map(|bytes| decode_pattern(bytes, num_channels))
        .collect();

    let mut offset = data.len() - pcm_total;
    for sample in samples.iter_mut() {
        let end = offset + sample.length as usize;
        let pcm = data.get(offset..end).ok_or(DecodeError::Truncated {
            what: "sample data",
            offset,
            needed: sample.length as usize,
            len: data.len(),
        })?;
        sample.data = pcm.iter().map(|&b| b as i8).collect();
        offset = end;
    }

    let has_standard_notes =
        has_standard_notes_only(&patterns, &header.positions[..num_positions as usize]);

    log::debug!(
        "Decoded module '{}': format {}, {} channels, {} patterns, {} positions",
        header.name,
        format.tag_label(),
        num_channels,
        patterns.len(),
        num_positions
    );

    Ok(Song {
        name: header.name,
        format,
        samples,
        patterns,
        positions: header.positions,
        num_positions,
        restart_position: header.restart_position,
        has_standard_notes,
    })
}
