use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies piece kinds using the 7-bag randomizer.
///
/// # 7-Bag System
///
/// 1. The bag is filled with one of each of the 7 piece kinds
/// 2. The bag is shuffled uniformly (Fisher–Yates)
/// 3. Kinds are dealt one at a time until the bag is empty
/// 4. An empty bag is refilled and reshuffled on the next draw
///
/// Every run of 7 draws that starts at a bag boundary therefore deals each
/// kind exactly once.
///
/// # Example
///
/// ```
/// use chromatris_engine::{PieceBag, PieceKind};
///
/// let mut bag = PieceBag::new();
/// let mut dealt: Vec<PieceKind> = (0..7).map(|_| bag.draw()).collect();
/// dealt.sort_by_key(|kind| *kind as u8);
/// assert_eq!(dealt, PieceKind::ALL);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceBag {
    /// Creates a new piece bag with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    ///
    /// The bag starts empty, so the first draw performs the first shuffle.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: ArrayVec::new(),
        }
    }

    fn refill(&mut self) {
        self.bag.extend(PieceKind::ALL);
        self.bag.shuffle(&mut self.rng);
    }

    /// Deals the next piece kind, refilling the bag first if it is empty.
    pub fn draw(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.refill();
        }
        self.bag
            .pop()
            .expect("piece bag should never be empty after a refill")
    }

    /// Number of kinds left in the current shuffle cycle (0 to 6 between draws).
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }

    /// Kinds left in the current cycle, in the order they will be dealt.
    #[cfg(test)]
    fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().rev().copied()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the bag's random number generator. The same seed
/// produces the same sequence of pieces, which enables reproducible
/// sessions, replays and tests.
///
/// Seeds serialize and parse as 32 hexadecimal digits.
///
/// # Example
///
/// ```
/// use chromatris_engine::{PieceBag, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut bag1 = PieceBag::with_seed(seed);
/// let mut bag2 = PieceBag::with_seed(seed);
/// assert_eq!(bag1.draw(), bag2.draw());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Creates a generator seeded with this seed.
    pub(crate) fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

/// Error returned when a seed is not exactly 32 hexadecimal digits.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed `{input}`: expected 32 hexadecimal characters")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseSeedError { input: s.to_owned() };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
///
/// This implementation enables idiomatic seed generation with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: PieceSeed = PieceSeed::from_bytes([
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
        0x88,
    ]);

    fn sorted(mut kinds: Vec<PieceKind>) -> Vec<PieceKind> {
        kinds.sort_by_key(|kind| *kind as u8);
        kinds
    }

    #[test]
    fn test_each_cycle_is_a_permutation() {
        let mut bag = PieceBag::with_seed(SEED);
        for cycle in 0..10 {
            let dealt: Vec<_> = (0..PieceKind::LEN).map(|_| bag.draw()).collect();
            assert_eq!(sorted(dealt), PieceKind::ALL, "cycle {cycle}");
            assert_eq!(bag.remaining(), 0);
        }
    }

    #[test]
    fn test_remaining_stays_below_seven() {
        let mut bag = PieceBag::with_seed(SEED);
        assert_eq!(bag.remaining(), 0);
        for i in 0..30 {
            bag.draw();
            assert_eq!(bag.remaining(), 6 - i % 7);
        }
    }

    #[test]
    fn test_upcoming_matches_draw_order() {
        let mut bag = PieceBag::with_seed(SEED);
        bag.draw();
        let upcoming: Vec<_> = bag.upcoming().collect();
        let drawn: Vec<_> = (0..upcoming.len()).map(|_| bag.draw()).collect();
        assert_eq!(upcoming, drawn);
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let mut bag1 = PieceBag::with_seed(SEED);
        let mut bag2 = PieceBag::with_seed(SEED);
        for _ in 0..20 {
            assert_eq!(bag1.draw(), bag2.draw());
        }
    }

    #[test]
    fn test_known_seed_formats() {
        assert_eq!(
            serde_json::to_string(&PieceSeed::from_bytes([0; 16])).unwrap(),
            "\"00000000000000000000000000000000\""
        );
        assert_eq!(SEED.to_string(), "123456789abcdef01122334455667788");
    }

    #[test]
    fn test_seed_roundtrip_preserves_piece_generation() {
        let original: PieceSeed = rand::rng().random();
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, original);

        let mut bag1 = PieceBag::with_seed(original);
        let mut bag2 = PieceBag::with_seed(deserialized);
        for _ in 0..20 {
            assert_eq!(bag1.draw(), bag2.draw());
        }
    }

    #[test]
    fn test_seed_parse_accepts_uppercase() {
        let seed: PieceSeed = "123456789ABCDEF01122334455667788".parse().unwrap();
        assert_eq!(seed, SEED);
    }

    #[test]
    fn test_seed_parse_errors() {
        for input in [
            "",
            "0123456789abcdef0123456789abcde",
            "0123456789abcdef0123456789abcdef0",
            "ghijklmnopqrstuvwxyzghijklmnopqr",
            "+123456789abcdef0123456789abcdef",
        ] {
            let err = input.parse::<PieceSeed>().unwrap_err();
            assert!(err.to_string().contains("invalid hex"), "{input:?}");
        }
    }
}
