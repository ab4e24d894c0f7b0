use std::fmt;
use std::ops::Index;

/// Read-only window over a residue string.
///
/// Views are `Copy` and never allocate: building one, indexing it and
/// taking a sub-window are all pointer arithmetic over the backing text.
/// Residues are ASCII single-letter codes, so positions are byte offsets.
#[derive(Debug, Clone, Copy)]
pub struct SeqView<'a> {
    backing: &'a str,
    start: usize,
    len: usize,
}

impl Default for SeqView<'_> {
    fn default() -> Self {
        Self {
            backing: "",
            start: 0,
            len: 0,
        }
    }
}

impl<'a> SeqView<'a> {
    pub fn new(backing: &'a str, start: usize, len: usize) -> Self {
        assert!(
            start + len <= backing.len(),
            "view [{}, {}) out of bounds for a sequence of length {}",
            start,
            start + len,
            backing.len()
        );
        Self {
            backing,
            start,
            len,
        }
    }

    pub fn whole(backing: &'a str) -> Self {
        Self::new(backing, 0, backing.len())
    }

    /// Sub-window relative to this view.
    pub fn sub(&self, start: usize, len: usize) -> SeqView<'a> {
        assert!(start + len <= self.len);
        Self {
            backing: self.backing,
            start: self.start + start,
            len,
        }
    }

    #[inline]
    pub fn at(&self, index: usize) -> u8 {
        debug_assert!(index < self.len);
        self.backing.as_bytes()[self.start + index]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<u8> {
        self.as_bytes().first().copied()
    }

    pub fn last(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    pub fn as_str(&self) -> &'a str {
        &self.backing[self.start..self.start + self.len]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.as_str().as_bytes()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + 'a {
        self.as_bytes().iter().copied()
    }

    /// Copies the residues into a new `String`. This allocates.
    pub fn to_owned_string(&self) -> String {
        self.as_str().to_string()
    }
}

impl Index<usize> for SeqView<'_> {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.as_bytes()[index]
    }
}

impl PartialEq for SeqView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for SeqView<'_> {}

impl PartialEq<str> for SeqView<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for SeqView<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for SeqView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
