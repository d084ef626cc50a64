// ABOUTME: Generic set over a closed flag enumeration, resolved from an octet by value/mask matching
// ABOUTME: Several non-exclusive flags may match a single octet, so the set is a small bitset

use std::fmt;
use std::marker::PhantomData;

/// A flag that is present in an octet when `octet & mask == value`.
pub trait BinaryFlag: Copy + Eq + fmt::Debug + 'static {
    /// Every variant, in declaration order
    const ALL: &'static [Self];

    fn value(self) -> u8;

    fn mask(self) -> u8;

    /// Whether the flag matches `octet`
    fn matches(self, octet: u8) -> bool {
        octet & self.mask() == self.value()
    }

    /// Position within [`BinaryFlag::ALL`], used as the bit index in a [`FlagSet`]
    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|&flag| flag == self)
            .unwrap_or_default()
    }
}

/// Set of flags over the enumeration `F`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FlagSet<F> {
    bits: u64,
    _flags: PhantomData<F>,
}

impl<F: BinaryFlag> FlagSet<F> {
    pub fn empty() -> Self {
        Self {
            bits: 0,
            _flags: PhantomData,
        }
    }

    /// Every flag whose value/mask pair matches `octet`
    pub fn from_octet(octet: u8) -> Self {
        F::ALL
            .iter()
            .copied()
            .filter(|flag| flag.matches(octet))
            .collect()
    }

    /// OR of the bit patterns of every contained flag
    pub fn to_octet(&self) -> u8 {
        self.iter().fold(0, |octet, flag| octet | flag.value())
    }

    pub fn insert(&mut self, flag: F) {
        self.bits |= 1 << flag.index();
    }

    pub fn remove(&mut self, flag: F) {
        self.bits &= !(1 << flag.index());
    }

    /// Chained [`FlagSet::insert`]
    pub fn with(mut self, flag: F) -> Self {
        self.insert(flag);
        self
    }

    pub fn contains(&self, flag: F) -> bool {
        self.bits & (1 << flag.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Flags in declaration order
    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        F::ALL.iter().copied().filter(|&flag| self.contains(flag))
    }

    /// Only the flags also accepted by `keep`
    pub fn filtered(&self, keep: impl Fn(F) -> bool) -> Self {
        self.iter().filter(|&flag| keep(flag)).collect()
    }
}

impl<F: BinaryFlag> Default for FlagSet<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F: BinaryFlag> FromIterator<F> for FlagSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        let mut set = Self::empty();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl<F: BinaryFlag, const N: usize> From<[F; N]> for FlagSet<F> {
    fn from(flags: [F; N]) -> Self {
        flags.into_iter().collect()
    }
}

impl<F: BinaryFlag> fmt::Debug for FlagSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
