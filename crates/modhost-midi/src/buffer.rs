//! Per-block MIDI event buffer.

use crate::error::{Error, Result};
use crate::RawMidiEvent;
use smallvec::SmallVec;

/// Channel voice messages fit inline; longer messages spill to the heap.
type EventBytes = SmallVec<[u8; 4]>;

#[derive(Debug, Clone)]
struct StoredEvent {
    time: u32,
    bytes: EventBytes,
}

/// Time-ordered list of MIDI events for one block.
///
/// Capacity is fixed at construction. Writing happens on the driver side
/// before the callback; the host only reads.
#[derive(Debug, Clone)]
pub struct MidiBuffer {
    events: Vec<StoredEvent>,
    capacity: usize,
}

impl MidiBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an event.
    ///
    /// Times must be non-decreasing within a block.
    pub fn push(&mut self, time: u32, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(Error::EmptyEvent);
        }
        if self.events.len() >= self.capacity {
            return Err(Error::BufferFull {
                capacity: self.capacity,
            });
        }
        if let Some(last) = self.events.last() {
            if time < last.time {
                return Err(Error::OutOfOrder {
                    time,
                    last: last.time,
                });
            }
        }
        self.events.push(StoredEvent {
            time,
            bytes: EventBytes::from_slice(bytes),
        });
        Ok(())
    }

    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn event(&self, index: usize) -> Option<RawMidiEvent<'_>> {
        self.events
            .get(index)
            .map(|e| RawMidiEvent::new(e.time, &e.bytes))
    }

    pub fn iter(&self) -> impl Iterator<Item = RawMidiEvent<'_>> + '_ {
        self.events
            .iter()
            .map(|e| RawMidiEvent::new(e.time, &e.bytes))
    }
}

impl Default for MidiBuffer {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}
