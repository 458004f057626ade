//! Sample-accurate splitting of a block around MIDI event times.
//!
//! A block of `nframes` samples with events at `t0 <= t1 <= ...` is
//! processed as `[0, t0)`, event 0, `[t0, t1)`, event 1, ..., `[tn, nframes)`.
//! Empty ranges are skipped, so coincident events dispatch back to back.

use modhost_midi::RawMidiEvent;

/// Receives the ranges and events produced by [`EventSplitter`].
pub trait SplitHandler {
    /// A non-empty range `[offset, offset + len)` of the block.
    fn process_range(&mut self, offset: usize, len: usize);

    /// An event, delivered after all samples before its time.
    fn handle_event(&mut self, event: RawMidiEvent<'_>);
}

/// Walks one block's events in time order.
#[derive(Debug, Clone, Copy)]
pub struct EventSplitter {
    nframes: usize,
    cursor: usize,
}

impl EventSplitter {
    pub fn new(nframes: usize) -> Self {
        Self { nframes, cursor: 0 }
    }

    /// Drive `handler` across the whole block. Returns the number of
    /// non-empty ranges processed.
    ///
    /// Event times past the end of the block are treated as `nframes`;
    /// times before the previous event's are treated as the previous time.
    pub fn run<'e, I, H>(mut self, events: I, handler: &mut H) -> usize
    where
        I: IntoIterator<Item = RawMidiEvent<'e>>,
        H: SplitHandler + ?Sized,
    {
        let mut ranges = 0;
        for event in events {
            let time = (event.time as usize).clamp(self.cursor, self.nframes);
            ranges += self.advance_to(time, handler);
            handler.handle_event(event);
        }
        ranges + self.advance_to(self.nframes, handler)
    }

    #[inline]
    fn advance_to<H: SplitHandler + ?Sized>(&mut self, time: usize, handler: &mut H) -> usize {
        let len = time - self.cursor;
        if len == 0 {
            return 0;
        }
        handler.process_range(self.cursor, len);
        self.cursor = time;
        1
    }
}
