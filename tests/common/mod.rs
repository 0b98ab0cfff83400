//! Byte-level module builder shared by the integration tests

#![allow(dead_code)]

/// One sample slot: name, volume, loop (in bytes) and PCM.
pub struct SampleSpec {
    pub name: &'static str,
    pub volume: u8,
    pub fine_tune: u8,
    pub loop_offset: usize,
    pub loop_length: usize,
    pub pcm: Vec<i8>,
}

impl SampleSpec {
    pub fn one_shot(name: &'static str, pcm: Vec<i8>) -> Self {
        SampleSpec {
            name,
            volume: 64,
            fine_tune: 0,
            loop_offset: 0,
            loop_length: 0,
            pcm,
        }
    }
}

/// A note cell at `(pattern, row, channel)`.
pub struct Cell {
    pub pattern: usize,
    pub row: usize,
    pub channel: usize,
    pub sample: u8,
    pub period: u16,
    pub effect: u8,
    pub argument: u8,
}

pub fn cell(pattern: usize, row: usize, channel: usize, sample: u8, period: u16) -> Cell {
    Cell {
        pattern,
        row,
        channel,
        sample,
        period,
        effect: 0,
        argument: 0,
    }
}

impl Cell {
    pub fn effect(mut self, effect: u8, argument: u8) -> Self {
        self.effect = effect;
        self.argument = argument;
        self
    }
}

/// Builds module files in the 31-sample tagged layout or the untagged
/// 15-sample layout.
pub struct ModuleBuilder {
    name: &'static str,
    tag: Option<[u8; 4]>,
    channels: usize,
    samples: Vec<SampleSpec>,
    positions: Vec<u8>,
    restart: u8,
    num_patterns: usize,
    cells: Vec<Cell>,
}

impl ModuleBuilder {
    pub fn new(tag: &[u8; 4], channels: usize) -> Self {
        ModuleBuilder {
            name: "integration",
            tag: Some(*tag),
            channels,
            samples: Vec::new(),
            positions: vec![0],
            restart: 127,
            num_patterns: 1,
            cells: Vec::new(),
        }
    }

    pub fn legacy() -> Self {
        ModuleBuilder {
            tag: None,
            ..Self::new(b"M.K.", 4)
        }
    }

    pub fn sample(mut self, sample: SampleSpec) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn positions(mut self, positions: &[u8], patterns: usize) -> Self {
        self.positions = positions.to_vec();
        self.num_patterns = patterns;
        self
    }

    pub fn restart(mut self, restart: u8) -> Self {
        self.restart = restart;
        self
    }

    pub fn cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let num_samples = if self.tag.is_some() { 31 } else { 15 };
        let mut data = vec![0u8; 20];
        data[..self.name.len()].copy_from_slice(self.name.as_bytes());

        for idx in 0..num_samples {
            let mut header = [0u8; 30];
            if let Some(sample) = self.samples.get(idx) {
                header[..sample.name.len()].copy_from_slice(sample.name.as_bytes());
                header[22..24].copy_from_slice(&((sample.pcm.len() / 2) as u16).to_be_bytes());
                header[24] = sample.fine_tune;
                header[25] = sample.volume;
                header[26..28].copy_from_slice(&((sample.loop_offset / 2) as u16).to_be_bytes());
                header[28..30].copy_from_slice(&((sample.loop_length / 2) as u16).to_be_bytes());
            }
            data.extend_from_slice(&header);
        }

        data.push(self.positions.len() as u8);
        data.push(self.restart);
        let mut table = [0u8; 128];
        table[..self.positions.len()].copy_from_slice(&self.positions);
        data.extend_from_slice(&table);
        if let Some(tag) = self.tag {
            data.extend_from_slice(&tag);
        }

        let pattern_size = self.channels * 64 * 4;
        let patterns_start = data.len();
        data.resize(patterns_start + pattern_size * self.num_patterns, 0);
        for cell in &self.cells {
            let offset = patterns_start
                + cell.pattern * pattern_size
                + (cell.row * self.channels + cell.channel) * 4;
            data[offset] = (cell.sample & 0xF0) | ((cell.period >> 8) as u8 & 0x0F);
            data[offset + 1] = (cell.period & 0xFF) as u8;
            data[offset + 2] = ((cell.sample & 0x0F) << 4) | (cell.effect & 0x0F);
            data[offset + 3] = cell.argument;
        }

        for sample in self.samples.iter().take(num_samples) {
            data.extend(sample.pcm.iter().map(|&s| s as u8));
        }
        data
    }
}
