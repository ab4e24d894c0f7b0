use arrayvec::ArrayVec;
use std::cmp::Ordering;

const INSERTION_SORT_THRESHOLD: usize = 7;
const STACK_FRAMES: usize = 32;

#[derive(Debug, Clone, Copy)]
struct Frame {
    low: usize,
    high: usize,
}

/// In-place hybrid quicksort that keeps its partition stack between calls.
///
/// The stack lives inside the sorter so sorting a buffer never allocates.
/// Pushing the larger partition first keeps the depth logarithmic, which
/// 32 frames cover for any slice that fits in memory. One sorter per thread.
#[derive(Debug, Default)]
pub struct QuickSorter {
    stack: ArrayVec<Frame, STACK_FRAMES>,
}

impl QuickSorter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts `array[index..index + length]` ascending according to `compare`.
    pub fn sort_by<T, F>(&mut self, array: &mut [T], index: usize, length: usize, mut compare: F)
    where
        T: Copy,
        F: FnMut(&T, &T) -> Ordering,
    {
        if length < 2 {
            return;
        }
        self.stack.clear();
        self.stack.push(Frame {
            low: index,
            high: index + length - 1,
        });

        while let Some(Frame { low, high }) = self.stack.pop() {
            if low + INSERTION_SORT_THRESHOLD > high {
                insertion_sort(array, low, high, &mut compare);
                continue;
            }

            // Median of three lands in the middle slot.
            let mid = low + (high - low) / 2;
            arrange(array, low, mid, &mut compare);
            if arrange(array, mid, high, &mut compare) {
                arrange(array, low, mid, &mut compare);
            }

            let key = array[mid];
            let mut i = low + 1;
            let mut k = high - 1;
            loop {
                while i < k && compare(&key, &array[i]) == Ordering::Greater {
                    i += 1;
                }
                while k > i && compare(&key, &array[k]) == Ordering::Less {
                    k -= 1;
                }
                if k <= i {
                    break;
                }
                array.swap(i, k);
                i += 1;
                k -= 1;
            }

            if (high - k) >= (k - low) {
                if k + 1 < high {
                    self.stack.push(Frame { low: k, high });
                }
                if k - 1 > low {
                    self.stack.push(Frame { low, high: k });
                }
            } else {
                if k - 1 > low {
                    self.stack.push(Frame { low, high: k });
                }
                if k + 1 < high {
                    self.stack.push(Frame { low: k, high });
                }
            }
        }
    }

    /// Sorts a range of finite floats. Panics on NaN.
    pub fn sort_f64(&mut self, array: &mut [f64], index: usize, length: usize) {
        self.sort_by(array, index, length, fast_f64_cmp);
    }
}

/// Float comparison for values known to be comparable.
///
/// NaN here means an upstream mass computation is broken, so this panics
/// rather than inventing an order.
#[inline]
pub fn fast_f64_cmp(x: &f64, y: &f64) -> Ordering {
    if x < y {
        Ordering::Less
    } else if x > y {
        Ordering::Greater
    } else if x == y {
        Ordering::Equal
    } else {
        panic!("incomparable floating point values: {} and {}", x, y)
    }
}

#[inline]
fn arrange<T, F>(array: &mut [T], low: usize, high: usize, compare: &mut F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    if compare(&array[high], &array[low]) == Ordering::Less {
        array.swap(low, high);
        true
    } else {
        false
    }
}

fn insertion_sort<T, F>(array: &mut [T], low: usize, high: usize, compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in (low + 1)..=high {
        let mut k = i;
        while k > low && compare(&array[k], &array[k - 1]) == Ordering::Less {
            array.swap(k - 1, k);
            k -= 1;
        }
    }
}
