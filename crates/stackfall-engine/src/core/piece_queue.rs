use std::{collections::VecDeque, fmt};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{PieceKind, config::BagConfig};

/// Fixed-length lookahead of upcoming pieces, refilled from a shuffled bag.
///
/// # Bag randomizer
///
/// Each bag holds every piece kind `copies` times (two by default, a
/// "14-bag"). With probability `bias_chance` one extra copy of a random kind
/// is added before shuffling, so a kind can occasionally cluster. Droughts
/// stay bounded: no kind can be absent for more than two bags in a row.
///
/// # Example
///
/// ```
/// use stackfall_engine::{PieceQueue, PieceSeed, config::BagConfig};
///
/// let mut queue = PieceQueue::with_seed(3, BagConfig::default(), PieceSeed::from_u128(7));
/// let upcoming: Vec<_> = queue.upcoming().collect();
/// assert_eq!(upcoming.len(), 3);
/// assert_eq!(queue.pop_next(), upcoming[0]);
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    bag_config: BagConfig,
    bag: Vec<PieceKind>,
    lookahead: VecDeque<PieceKind>,
    length: usize,
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed serialized as 32 hex characters. The same seed yields the
/// same piece sequence, label order, and bot cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    /// Derives an independent generator for non-piece randomness (labels, cadence, particles).
    #[must_use]
    pub fn effects_rng(self) -> Pcg32 {
        let mut bytes = self.0;
        bytes.reverse();
        Pcg32::from_seed(bytes)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
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

impl std::str::FromStr for PieceSeed {
    type Err = String;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self::from_u128(num))
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceQueue {
    #[must_use]
    pub fn with_seed(length: usize, bag_config: BagConfig, seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            bag_config,
            bag: Vec::with_capacity(PieceKind::LEN * 3),
            lookahead: VecDeque::with_capacity(length),
            length: length.max(1),
        };
        this.fill_lookahead();
        this
    }

    fn refill_bag(&mut self) {
        let copies = self.bag_config.copies.max(1);
        self.bag.clear();
        for kind in PieceKind::ALL {
            self.bag.extend(std::iter::repeat_n(kind, copies));
        }
        if self.rng.random_bool(self.bag_config.bias_chance.clamp(0.0, 1.0)) {
            let favored: PieceKind = self.rng.random();
            self.bag.push(favored);
        }
        self.bag.shuffle(&mut self.rng);
    }

    fn draw_from_bag(&mut self) -> PieceKind {
        loop {
            if let Some(kind) = self.bag.pop() {
                return kind;
            }
            self.refill_bag();
        }
    }

    fn fill_lookahead(&mut self) {
        while self.lookahead.len() < self.length {
            let kind = self.draw_from_bag();
            self.lookahead.push_back(kind);
        }
    }

    /// Takes the front of the lookahead and tops it up from the bag.
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_lookahead();
        let next = self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| self.draw_from_bag());
        self.fill_lookahead();
        next
    }

    /// Upcoming pieces, nearest first. Always exactly the configured length.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.lookahead.iter().copied()
    }

    /// Discards the lookahead and the current bag, then refills.
    ///
    /// The random stream continues, so a reset game does not replay the last one.
    pub fn refill(&mut self) {
        self.lookahead.clear();
        self.bag.clear();
        self.fill_lookahead();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn unbiased() -> BagConfig {
        BagConfig {
            copies: 2,
            bias_chance: 0.0,
        }
    }

    #[test]
    fn test_lookahead_has_fixed_length() {
        let mut queue = PieceQueue::with_seed(3, unbiased(), PieceSeed::from_u128(1));
        for _ in 0..50 {
            assert_eq!(queue.upcoming().count(), 3);
            let front = queue.upcoming().next();
            assert_eq!(Some(queue.pop_next()), front);
        }
    }

    #[test]
    fn test_unbiased_bag_holds_each_kind_twice() {
        let mut queue = PieceQueue::with_seed(1, unbiased(), PieceSeed::from_u128(99));
        // the first bag is drawn by the initial lookahead fill; read 14 from there on
        let mut counts = HashMap::new();
        let mut drawn = vec![queue.upcoming().next().unwrap()];
        queue.pop_next();
        for _ in 0..13 {
            drawn.push(queue.pop_next());
        }
        for kind in drawn {
            *counts.entry(kind).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), PieceKind::LEN);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn test_biased_bag_adds_one_copy() {
        let config = BagConfig {
            copies: 2,
            bias_chance: 1.0,
        };
        let mut queue = PieceQueue::with_seed(1, config, PieceSeed::from_u128(5));
        queue.bag.clear();
        queue.refill_bag();
        assert_eq!(queue.bag.len(), PieceKind::LEN * 2 + 1);
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = PieceSeed::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788);
        let mut q1 = PieceQueue::with_seed(3, BagConfig::default(), seed);
        let mut q2 = PieceQueue::with_seed(3, BagConfig::default(), seed);
        for _ in 0..40 {
            assert_eq!(q1.pop_next(), q2.pop_next());
        }
    }

    #[test]
    fn test_seed_hex_roundtrip() {
        let seed = PieceSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);
    }

    #[test]
    fn test_seed_rejects_bad_hex() {
        let too_short: Result<PieceSeed, _> = serde_json::from_str("\"0123\"");
        assert!(too_short.unwrap_err().to_string().contains("invalid hex"));
        let not_hex: Result<PieceSeed, _> = "ghijklmnopqrstuvwxyzghijklmnopqr".parse::<PieceSeed>();
        assert!(not_hex.is_err());
    }
}
