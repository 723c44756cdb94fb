/// Fixed-capacity FIFO used as the device-side capture store.
///
/// Single-owner; wrap in `Arc<parking_lot::Mutex<RingBuffer<T>>>` to share
/// it between a device callback and the polling side.
///
/// When a write does not fit, the oldest elements are overwritten. Nothing
/// records that a drop happened.
#[derive(Debug)]
pub struct RingBuffer<T> {
    storage: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![T::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    /// Append `items`, overwriting the oldest elements on overflow.
    ///
    /// A write longer than the capacity keeps only its last `capacity`
    /// elements.
    pub fn write(&mut self, items: &[T]) {
        let capacity = self.capacity();
        if items.is_empty() || capacity == 0 {
            return;
        }
        let items = &items[items.len().saturating_sub(capacity)..];

        let overflow = (self.len + items.len()).saturating_sub(capacity);
        self.head = (self.head + overflow) % capacity;
        self.len -= overflow;

        let tail = (self.head + self.len) % capacity;
        let first = items.len().min(capacity - tail);
        self.storage[tail..tail + first].copy_from_slice(&items[..first]);
        self.storage[..items.len() - first].copy_from_slice(&items[first..]);
        self.len += items.len();
    }

    /// Remove and return up to `count` of the oldest elements.
    pub fn read(&mut self, count: usize) -> Vec<T> {
        let mut out = vec![T::default(); count.min(self.len)];
        self.read_into(&mut out);
        out
    }

    /// Move up to `out.len()` of the oldest elements into the front of
    /// `out`. Returns how many were moved.
    pub fn read_into(&mut self, out: &mut [T]) -> usize {
        let taken = out.len().min(self.len);
        if taken == 0 {
            return 0;
        }
        let capacity = self.capacity();
        let first = taken.min(capacity - self.head);
        out[..first].copy_from_slice(&self.storage[self.head..self.head + first]);
        out[first..taken].copy_from_slice(&self.storage[..taken - first]);
        self.head = (self.head + taken) % capacity;
        self.len -= taken;
        taken
    }

    /// Elements waiting to be read.
    pub fn count(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard everything buffered.
    pub fn reset(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }
}
