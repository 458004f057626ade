//! Channel-voice message decoding.
//!
//! Dispatch is keyed on the high nibble of the status byte only; the
//! channel nibble is ignored and data bytes are passed through unmasked.

use serde::{Deserialize, Serialize};

/// Center value of the 14-bit pitch bend range.
pub const PITCH_BEND_CENTER: i32 = 8192;

/// Decoded MIDI message, in the shape a module's control entry points consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MidiMessage {
    NoteOff { note: u8, velocity: u8 },
    NoteOn { note: u8, velocity: u8 },
    ProgramChange { program: u8 },
    ControlChange { controller: u8, value: u8 },
    /// Signed bend, `0` = center, range `-8192..=8191` for well-formed input.
    PitchBend { value: i32 },
}

impl MidiMessage {
    /// Decode raw bytes.
    ///
    /// | nibble | message |
    /// |---|---|
    /// | 8 | note off |
    /// | 9 | note on, velocity 0 becomes note off with velocity 0 |
    /// | 10 | program change (program in the first data byte) |
    /// | 11 | control change |
    /// | 14 | pitch bend, `byte1 + 128 * byte2 - 8192` |
    ///
    /// Any other status returns `None`. Missing data bytes read as zero.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        let data1 = bytes.get(1).copied().unwrap_or(0);
        let data2 = bytes.get(2).copied().unwrap_or(0);

        match status >> 4 {
            8 => Some(Self::NoteOff {
                note: data1,
                velocity: data2,
            }),
            9 if data2 == 0 => Some(Self::NoteOff {
                note: data1,
                velocity: 0,
            }),
            9 => Some(Self::NoteOn {
                note: data1,
                velocity: data2,
            }),
            10 => Some(Self::ProgramChange { program: data1 }),
            11 => Some(Self::ControlChange {
                controller: data1,
                value: data2,
            }),
            14 => Some(Self::PitchBend {
                value: data1 as i32 + 128 * data2 as i32 - PITCH_BEND_CENTER,
            }),
            _ => None,
        }
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(self, Self::NoteOn { .. })
    }

    #[inline]
    pub fn is_note_off(&self) -> bool {
        matches!(self, Self::NoteOff { .. })
    }
}
