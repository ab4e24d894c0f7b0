/// Append-only collection of recycled records.
///
/// `clear` only resets the logical length, so records (and whatever buffers
/// they own) survive to be overwritten by the next round of `add` calls.
/// A record is default-constructed only the first time its slot is used.
/// Handles returned by `add` borrow the pool mutably, so none can survive a
/// `clear`.
#[derive(Debug)]
pub struct ReusablePool<T> {
    slots: Vec<T>,
    len: usize,
}

impl<T> Default for ReusablePool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Default> ReusablePool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Hands out the next slot, reusing its previous occupant when there is one.
    pub fn add(&mut self) -> &mut T {
        if self.len == self.slots.len() {
            if self.slots.len() == self.slots.capacity() {
                // 2 * capacity + 1
                let additional = self.slots.capacity() + 1;
                self.slots.reserve_exact(additional);
            }
            self.slots.push(T::default());
        }
        self.len += 1;
        &mut self.slots[self.len - 1]
    }
}

impl<T> ReusablePool<T> {
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_records() {
        let mut pool: ReusablePool<Vec<u32>> = ReusablePool::with_capacity(2);
        pool.add().extend([1, 2, 3]);
        pool.add().push(4);
        assert_eq!(pool.len(), 2);

        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.get(0), None);

        // The recycled record still holds its old contents; callers overwrite.
        let first = pool.add();
        assert_eq!(*first, vec![1, 2, 3]);
        first.clear();
        assert_eq!(pool.get(0), Some(&vec![]));
        assert_eq!(pool.get(1), None);
    }

    #[test]
    fn test_growth_is_geometric() {
        let mut pool: ReusablePool<u64> = ReusablePool::default();
        let mut growth_events = 0;
        let mut last_capacity = pool.capacity();
        for _ in 0..10 {
            pool.add();
            if pool.capacity() != last_capacity {
                growth_events += 1;
                last_capacity = pool.capacity();
            }
        }
        assert!(pool.capacity() >= 10);
        // 0 -> 1 -> 3 -> 7 -> 15
        assert!(growth_events <= 4, "grew {} times", growth_events);

        // Refilling to the same size never grows again.
        pool.clear();
        for _ in 0..10 {
            pool.add();
        }
        assert_eq!(pool.capacity(), last_capacity);
    }

    #[test]
    fn test_mutation_through_iter_mut() {
        let mut pool: ReusablePool<u32> = ReusablePool::with_capacity(4);
        for value in 0..4 {
            *pool.add() = value;
        }
        pool.iter_mut().for_each(|x| *x *= 10);
        assert_eq!(pool.as_slice(), &[0, 10, 20, 30]);
        *pool.get_mut(1).unwrap() = 7;
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![0, 7, 20, 30]);
    }
}
