//! Amiga lookup tables
//!
//! Period, note-name, fine-tune and waveform tables shared by the decoder and
//! the replayer. Everything here is constant data.

/// Lowest period the replayer will produce (B-3).
pub const PERIOD_MIN: u16 = 113;

/// Highest period the replayer will produce (C-1).
pub const PERIOD_MAX: u16 = 856;

/// Number of entries in each period table (three octaves).
pub const PERIOD_COUNT: usize = 36;

/// Standard Amiga note periods, ascending (highest pitch first).
pub const PERIOD_TABLE: [u16; PERIOD_COUNT] = [
    113, 120, 127, 135, 143, 151, 160, 170, 180, 190, 202, 214,
    226, 240, 254, 269, 285, 302, 320, 339, 360, 381, 404, 428,
    453, 480, 508, 538, 570, 604, 640, 678, 720, 762, 808, 856,
];

/// Note letters matching `PERIOD_TABLE` positions modulo 12.
pub const NOTE_NAMES: [&str; 12] = [
    "B-", "A#", "A-", "G#", "G-", "F#", "F-", "E-", "D#", "D-", "C#", "C-",
];

/// Octave of the first twelve `PERIOD_TABLE` entries; each following group
/// of twelve is one octave lower.
pub const NOTE_BASE_OCTAVE: u8 = 4;

/// Period tables for each fine-tune value, in the same ascending layout as
/// `PERIOD_TABLE`. Indexed by the raw fine-tune nibble (8..=15 are -8..=-1).
pub const FINE_TUNE_PERIODS: [[u16; PERIOD_COUNT]; 16] = [
    // 0
    [
        113, 120, 127, 135, 143, 151, 160, 170, 180, 190, 202, 214,
        226, 240, 254, 269, 285, 302, 320, 339, 360, 381, 404, 428,
        453, 480, 508, 538, 570, 604, 640, 678, 720, 762, 808, 856,
    ],
    // +1
    [
        113, 119, 126, 134, 142, 150, 159, 169, 179, 189, 201, 213,
        225, 239, 253, 268, 284, 300, 318, 337, 357, 379, 401, 425,
        450, 477, 505, 535, 567, 601, 637, 674, 715, 757, 802, 850,
    ],
    // +2
    [
        112, 118, 125, 133, 141, 149, 158, 167, 177, 188, 199, 211,
        224, 237, 251, 266, 282, 298, 316, 335, 355, 376, 398, 422,
        447, 474, 502, 532, 563, 597, 632, 670, 709, 752, 796, 844,
    ],
    // +3
    [
        111, 118, 125, 132, 140, 148, 157, 166, 176, 187, 198, 209,
        222, 235, 249, 264, 280, 296, 314, 332, 352, 373, 395, 419,
        444, 470, 498, 528, 559, 592, 628, 665, 704, 746, 791, 838,
    ],
    // +4
    [
        110, 117, 124, 131, 139, 147, 156, 165, 175, 185, 196, 208,
        220, 233, 247, 262, 278, 294, 312, 330, 350, 370, 392, 416,
        441, 467, 495, 524, 555, 588, 623, 660, 699, 741, 785, 832,
    ],
    // +5
    [
        109, 116, 123, 130, 138, 146, 155, 164, 174, 184, 195, 206,
        219, 232, 245, 260, 276, 292, 309, 328, 347, 368, 390, 413,
        437, 463, 491, 520, 551, 584, 619, 655, 694, 736, 779, 826,
    ],
    // +6
    [
        109, 115, 122, 129, 137, 145, 154, 163, 172, 183, 193, 205,
        217, 230, 244, 258, 274, 290, 307, 325, 345, 365, 387, 410,
        434, 460, 487, 516, 547, 580, 614, 651, 689, 730, 774, 820,
    ],
    // +7
    [
        108, 114, 121, 128, 136, 144, 152, 161, 171, 181, 192, 204,
        216, 228, 242, 256, 272, 288, 305, 323, 342, 363, 384, 407,
        431, 457, 484, 513, 543, 575, 610, 646, 684, 725, 768, 814,
    ],
    // -8
    [
        120, 127, 135, 143, 151, 160, 170, 180, 190, 202, 214, 226,
        240, 254, 269, 285, 302, 320, 339, 360, 381, 404, 428, 453,
        480, 508, 538, 570, 604, 640, 678, 720, 762, 808, 856, 907,
    ],
    // -7
    [
        119, 126, 134, 142, 150, 159, 169, 179, 189, 200, 212, 225,
        238, 253, 268, 284, 300, 318, 337, 357, 379, 401, 425, 450,
        477, 505, 535, 567, 601, 636, 675, 715, 757, 802, 850, 900,
    ],
    // -6
    [
        118, 125, 133, 141, 149, 158, 167, 177, 188, 199, 211, 223,
        237, 251, 266, 282, 298, 316, 335, 355, 376, 398, 422, 447,
        474, 502, 532, 563, 597, 632, 670, 709, 752, 796, 844, 894,
    ],
    // -5
    [
        118, 125, 132, 140, 148, 157, 166, 176, 187, 198, 209, 222,
        235, 249, 264, 280, 296, 314, 332, 352, 373, 395, 419, 444,
        470, 498, 528, 559, 592, 628, 665, 704, 746, 791, 838, 887,
    ],
    // -4
    [
        117, 123, 131, 139, 147, 156, 165, 175, 185, 196, 208, 220,
        233, 247, 262, 278, 294, 312, 330, 350, 370, 392, 416, 441,
        467, 494, 524, 555, 588, 623, 660, 699, 741, 785, 832, 881,
    ],
    // -3
    [
        116, 123, 130, 138, 146, 155, 164, 174, 184, 195, 206, 219,
        232, 245, 260, 276, 292, 309, 328, 347, 368, 390, 413, 437,
        463, 491, 520, 551, 584, 619, 655, 694, 736, 779, 826, 875,
    ],
    // -2
    [
        115, 122, 129, 137, 145, 154, 163, 172, 183, 193, 205, 217,
        230, 244, 258, 274, 290, 307, 325, 345, 365, 387, 410, 434,
        460, 487, 516, 547, 580, 614, 651, 689, 730, 774, 820, 868,
    ],
    // -1
    [
        114, 121, 128, 136, 144, 152, 161, 171, 181, 192, 203, 216,
        228, 242, 256, 272, 288, 305, 323, 342, 363, 384, 407, 431,
        457, 484, 513, 543, 575, 610, 646, 684, 725, 768, 814, 862,
    ],
];

/// Linear period scale per fine-tune nibble (`2^(-ft/96)`), used when a song
/// contains periods that are not on the standard table.
pub const FINE_TUNE_SCALE: [f32; 16] = [
    1.0, 0.992806, 0.985663, 0.978572, 0.971532, 0.964542, 0.957603, 0.950714,
    1.059463, 1.051841, 1.044274, 1.036761, 1.029302, 1.021897, 1.014545, 1.007246,
];

/// Sine waveform shared by vibrato and tremolo (64 steps, amplitude 255).
pub const VIBRATO_TABLE: [i16; 64] = [
    0, 24, 49, 74, 97, 120, 141, 161, 180, 197, 212, 224, 235, 244, 250, 253,
    255, 253, 250, 244, 235, 224, 212, 197, 180, 161, 141, 120, 97, 74, 49, 24,
    0, -24, -49, -74, -97, -120, -141, -161, -180, -197, -212, -224, -235, -244, -250, -253,
    -255, -253, -250, -244, -235, -224, -212, -197, -180, -161, -141, -120, -97, -74, -49, -24,
];

/// Index of the first table entry greater than or equal to `period`.
///
/// Returns `None` when `period` is above `PERIOD_MAX`.
pub fn period_index(period: u16) -> Option<usize> {
    let idx = PERIOD_TABLE.partition_point(|&p| p < period);
    (idx < PERIOD_COUNT).then_some(idx)
}

/// Whether `period` is exactly one of the standard note periods (0 counts as
/// "no note" and is accepted).
pub fn is_standard_period(period: u16) -> bool {
    period == 0 || PERIOD_TABLE.binary_search(&period).is_ok()
}

/// Clamp a period into the playable range.
pub fn clamp_period(period: i32) -> u16 {
    period.clamp(PERIOD_MIN as i32, PERIOD_MAX as i32) as u16
}

/// Waveform value for a vibrato/tremolo phase.
#[inline]
pub fn waveform(pos: u8) -> i16 {
    VIBRATO_TABLE[(pos & 63) as usize]
}
