//! Format tag detection
//!
//! The 4 bytes at offset 1080 identify the module flavour. Modules without a
//! recognized tag use the older 15-sample layout, where those bytes are
//! already pattern data.

use super::DecodeError;
use crate::song::FormatDescription;

/// Offset of the format tag in 31-sample modules.
pub const TAG_OFFSET: usize = 1080;

/// Length of the format tag.
pub const TAG_LEN: usize = 4;

/// Classify a format tag.
///
/// Unknown tags fall back to the legacy 4-channel/15-sample layout. `CD61` is
/// recognized but not supported.
pub fn parse_format(tag: &[u8]) -> Result<FormatDescription, DecodeError> {
    let (num_channels, num_samples) = match tag {
        b"M.K." | b"FLT4" | b"M!K!" | b"4CHN" => (4, 31),
        b"6CHN" => (6, 31),
        b"8CHN" | b"CD81" => (8, 31),
        b"12CH" => (12, 31),
        b"CD61" => {
            return Err(DecodeError::UnsupportedFormat(
                String::from_utf8_lossy(tag).into_owned(),
            ))
        }
        _ => return Ok(legacy_format()),
    };

    Ok(FormatDescription {
        tag: Some(String::from_utf8_lossy(tag).into_owned()),
        num_channels,
        num_samples,
    })
}

/// Descriptor for untagged (Ultimate Soundtracker style) modules.
pub fn legacy_format() -> FormatDescription {
    FormatDescription {
        tag: None,
        num_channels: 4,
        num_samples: 15,
    }
}

/// Detect the format of a whole module buffer.
pub fn detect_format(data: &[u8]) -> Result<FormatDescription, DecodeError> {
    match data.get(TAG_OFFSET..TAG_OFFSET + TAG_LEN) {
        Some(tag) => parse_format(tag),
        None => Ok(legacy_format()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels_and_samples(tag: &[u8]) -> (u8, u8) {
        let fd = parse_format(tag).unwrap();
        (fd.num_channels, fd.num_samples)
    }

    #[test]
    fn test_recognized_tags() {
        for tag in [b"M.K.", b"FLT4", b"M!K!", b"4CHN"] {
            assert_eq!(channels_and_samples(tag), (4, 31));
        }
        assert_eq!(channels_and_samples(b"6CHN"), (6, 31));
        assert_eq!(channels_and_samples(b"8CHN"), (8, 31));
        assert_eq!(channels_and_samples(b"CD81"), (8, 31));
        assert_eq!(channels_and_samples(b"12CH"), (12, 31));
    }

    #[test]
    fn test_tag_is_kept_for_display() {
        let fd = parse_format(b"M.K.").unwrap();
        assert_eq!(fd.tag.as_deref(), Some("M.K."));
        assert_eq!(fd.tag_label(), "M.K.");
    }

    #[test]
    fn test_unknown_tag_is_legacy() {
        let fd = parse_format(&[0x10, 0x20, 0x00, 0x7f]).unwrap();
        assert_eq!(fd, legacy_format());
        assert_eq!(fd.tag_label(), "-");
    }

    #[test]
    fn test_cd61_is_rejected() {
        assert!(matches!(
            parse_format(b"CD61"),
            Err(DecodeError::UnsupportedFormat(tag)) if tag == "CD61"
        ));
    }

    #[test]
    fn test_short_buffer_is_legacy() {
        assert_eq!(detect_format(&[0u8; 100]).unwrap(), legacy_format());
    }
}
