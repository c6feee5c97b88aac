use heapless::Deque;

/// Fixed-capacity, insertion-ordered sequence of `(value, timestamp)` pairs.
/// Pushing into a full buffer evicts the oldest entry first.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T, const N: usize> {
    entries: Deque<(T, f64), N>,
}

impl<T, const N: usize> HistoryBuffer<T, N> {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Returns the evicted entry, if any.
    pub fn push(&mut self, value: T, timestamp: f64) -> Option<(T, f64)> {
        let evicted = if self.entries.is_full() {
            self.entries.pop_front()
        } else {
            None
        };

        // there is always room after the eviction above
        let _ = self.entries.push_back((value, timestamp));
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn latest(&self) -> Option<&(T, f64)> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &(T, f64)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(value, _)| value)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, timestamp)| *timestamp)
    }
}

impl<T, const N: usize> Default for HistoryBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_most_recent_entries_in_order() {
        let mut buffer = HistoryBuffer::<u32, 4>::new();

        for i in 0..4 {
            assert_eq!(buffer.push(i, i as f64), None);
        }
        assert_eq!(buffer.len(), 4);

        // k = 3 pushes past capacity
        assert_eq!(buffer.push(4, 4.0), Some((0, 0.0)));
        assert_eq!(buffer.push(5, 5.0), Some((1, 1.0)));
        assert_eq!(buffer.push(6, 6.0), Some((2, 2.0)));

        assert_eq!(buffer.len(), buffer.capacity());
        assert_eq!(buffer.values().copied().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(buffer.timestamps().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buffer.latest(), Some(&(6, 6.0)));
    }

    #[test]
    fn long_run_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::<usize, 100>::new();
        for i in 0..1000 {
            buffer.push(i, i as f64);
            assert!(buffer.len() <= 100);
        }
        assert_eq!(buffer.iter().next(), Some(&(900, 900.0)));
    }

    #[test]
    fn clear_empties() {
        let mut buffer = HistoryBuffer::<u8, 2>::default();
        buffer.push(1, 0.0);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.latest(), None);
    }
}
