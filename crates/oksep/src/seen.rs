//! Sets of already tested color pairs.
//!
//! The search must not test the same pair of colors twice at the same
//! distance. It tracks tested pairs with a [`SeenSet`], which may produce
//! false positives but never false negatives. A false positive merely skips
//! an untested pair, costing a draw but never approving an unsafe distance.
//!
//! [`BloomSet`] is the space-efficient implementation for production runs and
//! [`ExactSet`] the exact implementation for deterministic tests.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::catalog::Color;
use crate::Float;

/// The canonical key for an unordered pair of colors.
///
/// The key concatenates the two colors' coordinates, ordered by their
/// [`Color::code`]. Hence it is the same for either order of the two colors.
/// Since the key only captures coordinates, it assumes that coordinates
/// identify catalog colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey([u8; 6]);

impl PairKey {
    /// Create the key for the two colors.
    pub fn new(color1: &Color, color2: &Color) -> Self {
        let (first, second) = if color2.code() < color1.code() {
            (color2, color1)
        } else {
            (color1, color2)
        };

        let [r1, g1, b1] = first.rgb();
        let [r2, g2, b2] = second.rgb();
        Self([r1, g1, b1, r2, g2, b2])
    }

    /// Get the key's bytes.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r1, g1, b1, r2, g2, b2] = self.0;
        write!(f, "{},{},{},{},{},{}", r1, g1, b1, r2, g2, b2)
    }
}

// ====================================================================================================================

/// A set of tested pairs.
///
/// Implementations must never report an inserted key as absent. They may
/// report an absent key as present.
pub trait SeenSet {
    /// Add the key to this set.
    fn insert(&mut self, key: &PairKey);

    /// Determine whether the key has been added to this set.
    fn contains(&self, key: &PairKey) -> bool;

    /// Create a new, empty set with the same capacity as this one.
    #[must_use = "method returns a new set and does not clear this one"]
    fn renewed(&self) -> Self
    where
        Self: Sized;
}

// ====================================================================================================================

/// An exact set of tested pairs.
#[derive(Clone, Debug, Default)]
pub struct ExactSet {
    keys: HashSet<PairKey>,
}

impl ExactSet {
    /// Create a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Determine whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl SeenSet for ExactSet {
    fn insert(&mut self, key: &PairKey) {
        self.keys.insert(*key);
    }

    fn contains(&self, key: &PairKey) -> bool {
        self.keys.contains(key)
    }

    fn renewed(&self) -> Self {
        Self::new()
    }
}

// ====================================================================================================================

/// The salt distinguishing the second hash from the first.
const SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// A Bloom filter of tested pairs.
///
/// The filter is sized for an expected number of keys and a target false
/// positive rate `p`. For `n` expected keys, it uses `m = ⌈-n ln p / (ln 2)²⌉`
/// bits and `k = round(m / n ln 2)` probes, which are derived from two hashes
/// by double hashing. Once more than `n` keys have been added, the false
/// positive rate exceeds its target.
#[derive(Clone, Debug)]
pub struct BloomSet {
    words: Vec<u64>,
    bits: u64,
    probes: u32,
    expected_items: u64,
    false_positive_rate: Float,
}

impl BloomSet {
    /// Create a new Bloom filter for the given number of keys and false
    /// positive rate.
    pub fn new(expected_items: u64, false_positive_rate: Float) -> Self {
        let items = expected_items.max(1) as f64;
        let rate = (false_positive_rate as f64).clamp(1e-12, 0.5);
        let ln2 = std::f64::consts::LN_2;

        let bits = ((-items * rate.ln() / (ln2 * ln2)).ceil() as u64).max(64);
        let probes = ((bits as f64 / items * ln2).round() as u32).clamp(1, 32);
        let words = vec![0; bits.div_ceil(64) as usize];

        Self {
            words,
            bits,
            probes,
            expected_items,
            false_positive_rate,
        }
    }

    /// Get the number of bits.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Get the number of probes per key.
    pub fn probes(&self) -> u32 {
        self.probes
    }

    /// Compute the two hashes for the key.
    fn hashes(key: &PairKey) -> (u64, u64) {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let h1 = hasher.finish();

        hasher.write_u64(SALT);
        // An odd stride visits distinct bits for many probes.
        let h2 = hasher.finish() | 1;

        (h1, h2)
    }

    /// Get the word index and bit mask for the probe with the given index.
    #[inline]
    fn locate(&self, h1: u64, h2: u64, index: u64) -> (usize, u64) {
        let position = h1.wrapping_add(index.wrapping_mul(h2)) % self.bits;
        ((position / 64) as usize, 1 << (position % 64))
    }
}

impl SeenSet for BloomSet {
    fn insert(&mut self, key: &PairKey) {
        let (h1, h2) = Self::hashes(key);
        for index in 0..self.probes as u64 {
            let (word, mask) = self.locate(h1, h2, index);
            self.words[word] |= mask;
        }
    }

    fn contains(&self, key: &PairKey) -> bool {
        let (h1, h2) = Self::hashes(key);
        (0..self.probes as u64).all(|index| {
            let (word, mask) = self.locate(h1, h2, index);
            self.words[word] & mask != 0
        })
    }

    fn renewed(&self) -> Self {
        Self::new(self.expected_items, self.false_positive_rate)
    }
}

#[cfg(test)]
mod test {
    use super::{BloomSet, ExactSet, PairKey, SeenSet};
    use crate::catalog::Color;

    fn key(c1: (u8, u8, u8), c2: (u8, u8, u8)) -> PairKey {
        PairKey::new(
            &Color::from_rgb(c1.0, c1.1, c1.2),
            &Color::from_rgb(c2.0, c2.1, c2.2),
        )
    }

    #[test]
    fn test_pair_key() {
        let k1 = key((240, 240, 240), (10, 10, 10));
        let k2 = key((10, 10, 10), (240, 240, 240));
        assert_eq!(k1, k2);
        assert_eq!(k1.to_string(), "10,10,10,240,240,240");

        // Ordering is by code, i.e., red dominates.
        let k3 = key((1, 0, 0), (0, 255, 255));
        assert_eq!(k3.as_bytes(), &[0, 255, 255, 1, 0, 0]);
        assert_ne!(k3, key((1, 0, 0), (0, 255, 254)));
    }

    #[test]
    fn test_exact_set() {
        let mut set = ExactSet::new();
        let k1 = key((1, 2, 3), (4, 5, 6));
        let k2 = key((1, 2, 3), (4, 5, 7));

        assert!(!set.contains(&k1));
        set.insert(&k1);
        assert!(set.contains(&k1));
        assert!(set.contains(&key((4, 5, 6), (1, 2, 3))));
        assert!(!set.contains(&k2));
        assert_eq!(set.len(), 1);

        let set = set.renewed();
        assert!(set.is_empty());
        assert!(!set.contains(&k1));
    }

    #[test]
    fn test_bloom_sizing() {
        // 1,000 items at 1% need 9,586 bits and 7 probes.
        let set = BloomSet::new(1_000, 0.01);
        assert_eq!(set.bits(), 9_586);
        assert_eq!(set.probes(), 7);

        let tiny = BloomSet::new(0, 0.01);
        assert_eq!(tiny.bits(), 64);
    }

    #[test]
    fn test_bloom_set() {
        let mut set = BloomSet::new(5_000, 0.01);
        let keys = (0..5_000_u32)
            .map(|n| {
                let [_, r, g, b] = n.to_be_bytes();
                key((r, g, b), (255 - r, 255 - g, 255 - b))
            })
            .collect::<Vec<_>>();

        for key in keys.iter() {
            set.insert(key);
        }

        // No false negatives.
        assert!(keys.iter().all(|key| set.contains(key)));

        // Few false positives.
        let false_positives = (0..5_000_u32)
            .filter(|n| {
                let [_, r, g, b] = (n + 100_000).to_be_bytes();
                set.contains(&key((r, g, b), (r, g, b)))
            })
            .count();
        assert!(false_positives < 150, "{} false positives", false_positives);

        let fresh = set.renewed();
        assert_eq!(fresh.bits(), set.bits());
        assert!(!fresh.contains(&keys[0]));
    }
}
