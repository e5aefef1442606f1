use super::color::Rgb;

/// Fixed-capacity ring of the most recent column colors.
///
/// One slot per displayed column. `head` is the next slot to overwrite and
/// `tail` tracks the oldest retained entry; once the ring has wrapped, every
/// push evicts the oldest color first. Capacity never changes after
/// construction.
#[derive(Debug)]
pub struct ColumnHistory {
    slots: Vec<Rgb>,
    head: usize,
    tail: usize,
    full: bool,
}

impl ColumnHistory {
    /// Create a history with `capacity` slots, all black.
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "history capacity must be at least 1");
        Self {
            slots: vec![Rgb::BLACK; capacity],
            head: 0,
            tail: 0,
            full: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Record one color, evicting the oldest entry once the ring is full.
    ///
    /// The tail moves before the head and the full flag is recomputed last;
    /// reordering these steps shifts when eviction starts by one push.
    pub fn push(&mut self, color: Rgb) {
        let capacity = self.slots.len();

        self.slots[self.head] = color;
        if self.full {
            self.tail = (self.tail + 1) % capacity;
        }
        self.head = (self.head + 1) % capacity;
        self.full = self.head == self.tail;
    }

    /// Iterate over all `capacity` slots, newest first.
    ///
    /// Starts at the slot before `head` and walks backward with wraparound.
    /// Slots never written still hold black, so the view always yields
    /// exactly `capacity` colors.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = Rgb> + '_ {
        let capacity = self.slots.len();
        let newest = (self.head + capacity - 1) % capacity;
        (0..capacity).map(move |offset| self.slots[(newest + capacity - offset) % capacity])
    }
}
