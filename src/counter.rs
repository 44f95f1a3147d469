use std::sync::atomic::{AtomicU32, Ordering};

use tracing::trace;

use crate::models::{
    edge_event::EdgeEvent,
    pin::{Pin, HEADER_PIN_COUNT},
};

/// Rising-edge counters, one slot per header pin.
///
/// Increments and resets are single atomic operations, so an edge recorded
/// while the sampler resets a slot lands either in the closing window or the
/// next one.
pub struct EdgeCounter {
    slots: [AtomicU32; HEADER_PIN_COUNT],
}

impl Default for EdgeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeCounter {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    /// Count the event if the wave went up. Falling edges are ignored.
    pub fn record(&self, event: EdgeEvent) {
        if !event.is_rising() {
            return;
        }
        // NOTE: Wraps on overflow. The sampler resets the slot every interval.
        self.slots[event.pin.index()].fetch_add(1, Ordering::AcqRel);
        trace!("Counted rising edge on pin {}.", event.pin);
    }

    /// Read the count for a pin and reset it to zero.
    pub fn take(&self, pin: Pin) -> u32 {
        self.slots[pin.index()].swap(0, Ordering::AcqRel)
    }

    /// Read the count for a pin without resetting it.
    pub fn peek(&self, pin: Pin) -> u32 {
        self.slots[pin.index()].load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn pin(n: u8) -> Pin {
        Pin::try_from(n).unwrap()
    }

    #[test]
    fn test_counts_only_rising_edges() {
        let counter = EdgeCounter::new();
        for _ in 0..3 {
            counter.record(EdgeEvent::rising(pin(11)));
            counter.record(EdgeEvent::falling(pin(11)));
        }
        assert_eq!(counter.peek(pin(11)), 3);
    }

    #[test]
    fn test_take_resets() {
        let counter = EdgeCounter::new();
        counter.record(EdgeEvent::rising(pin(11)));
        counter.record(EdgeEvent::rising(pin(11)));

        assert_eq!(counter.take(pin(11)), 2);
        assert_eq!(counter.peek(pin(11)), 0);
        assert_eq!(counter.take(pin(11)), 0);
    }

    #[test]
    fn test_pins_are_independent() {
        let counter = EdgeCounter::new();
        counter.record(EdgeEvent::rising(pin(11)));
        counter.record(EdgeEvent::rising(pin(40)));
        counter.record(EdgeEvent::rising(pin(1)));

        assert_eq!(counter.take(pin(11)), 1);
        assert_eq!(counter.peek(pin(40)), 1);
        assert_eq!(counter.peek(pin(1)), 1);
        assert_eq!(counter.peek(pin(12)), 0);
    }

    #[test]
    fn test_no_edge_lost_during_concurrent_resets() {
        const EDGES_PER_WRITER: u32 = 50_000;
        const WRITERS: u32 = 4;

        let counter = Arc::new(EdgeCounter::new());
        let writers: Vec<_> = (0..WRITERS)
            .map(|_| {
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..EDGES_PER_WRITER {
                        counter.record(EdgeEvent::rising(pin(11)));
                    }
                })
            })
            .collect();

        let mut sampled = 0u32;
        while writers.iter().any(|w| !w.is_finished()) {
            sampled += counter.take(pin(11));
        }
        for writer in writers {
            writer.join().unwrap();
        }
        sampled += counter.take(pin(11));

        assert_eq!(sampled, EDGES_PER_WRITER * WRITERS);
    }
}
