//! Timestamped raw MIDI events.

use crate::MidiMessage;

/// Raw MIDI event with a sample offset into the current block.
///
/// Borrowed from the driver's MIDI buffer and only valid during the
/// callback that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMidiEvent<'a> {
    /// Offset within the current block (0 = first sample).
    pub time: u32,
    pub bytes: &'a [u8],
}

impl<'a> RawMidiEvent<'a> {
    #[inline]
    pub fn new(time: u32, bytes: &'a [u8]) -> Self {
        Self { time, bytes }
    }

    /// High nibble of the status byte, if any.
    #[inline]
    pub fn status_nibble(&self) -> Option<u8> {
        self.bytes.first().map(|status| status >> 4)
    }

    #[inline]
    pub fn message(&self) -> Option<MidiMessage> {
        MidiMessage::decode(self.bytes)
    }
}
