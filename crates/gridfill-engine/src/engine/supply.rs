use std::{fmt, ops::Range, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::IndexedRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{Occupancy, Offset, PieceId, ShapeColor, ShapeId, has_legal_anchor};

/// Number of pieces offered per wave.
pub const SUPPLY_SLOTS: usize = 3;

/// Shapes considered for the follow-up slots of a wave.
const COMPATIBLE_CANDIDATES: Range<u8> = 0..10;

/// Seed for deterministic supply generation.
///
/// A 128-bit seed for the supply PRNG. The same seed and the same sequence of
/// placements produce the same sequence of waves.
///
/// Serialized and displayed as 32 lowercase hex characters.
///
/// # Example
///
/// ```
/// use gridfill_engine::{GameSession, SupplySeed};
/// use rand::Rng as _;
///
/// let seed: SupplySeed = rand::rng().random();
///
/// let mut a = GameSession::with_seed(60, seed);
/// let mut b = GameSession::with_seed(60, seed);
/// a.start().unwrap();
/// b.start().unwrap();
/// assert_eq!(a.supply_shapes(), b.supply_shapes());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupplySeed([u8; 16]);

impl SupplySeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl fmt::Display for SupplySeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.to_u128())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid supply seed {input:?}: expected 32 hex characters")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for SupplySeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for SupplySeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SupplySeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<SupplySeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SupplySeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SupplySeed(seed)
    }
}

/// Random shape selection for supply waves.
///
/// # Slot 0
///
/// Weighted draw over the catalog:
///
/// | chance | shapes |
/// |---|---|
/// | 65% | standard: 60% base shapes, else rotated tetrominoes or the R family |
/// | 15% | plus or 3×3 |
/// | 15% | vertical lines |
/// | 5%  | small: 70% small L, then 85% a rotated small L, else the single cell |
///
/// # Slots 1 and 2
///
/// Uniform over the first ten shapes that fit somewhere on the current board.
/// When none fits the single cell is offered instead.
#[derive(Debug, Clone)]
pub struct SupplyGenerator {
    rng: Pcg32,
}

impl Default for SupplyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SupplyGenerator {
    /// Creates a generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: SupplySeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Draws the shapes of a full wave against the current board.
    pub fn generate_wave<O>(&mut self, grid: &O) -> [ShapeId; SUPPLY_SLOTS]
    where
        O: Occupancy + ?Sized,
    {
        [
            self.draw_weighted(),
            self.draw_compatible(grid),
            self.draw_compatible(grid),
        ]
    }

    /// Weighted draw used for the first slot of a wave.
    pub fn draw_weighted(&mut self) -> ShapeId {
        let tier = self.rng.random::<f32>();
        if tier < 0.65 {
            if self.rng.random::<f32>() < 0.6 {
                self.pick(0..7)
            } else if self.rng.random::<f32>() < 0.5 {
                self.pick(14..22)
            } else {
                self.pick(24..28)
            }
        } else if tier < 0.80 {
            self.pick(9..11)
        } else if tier < 0.95 {
            self.pick(11..14)
        } else if self.rng.random::<f32>() < 0.7 {
            ShapeId::SMALL_L
        } else if self.rng.random::<f32>() < 0.85 {
            self.pick(22..24)
        } else {
            ShapeId::SINGLE
        }
    }

    /// Draws a shape that has at least one legal anchor on `grid`.
    pub fn draw_compatible<O>(&mut self, grid: &O) -> ShapeId
    where
        O: Occupancy + ?Sized,
    {
        let candidates = COMPATIBLE_CANDIDATES
            .map(ShapeId::from_raw)
            .filter(|&shape| has_legal_anchor(shape, grid))
            .collect::<ArrayVec<_, 10>>();
        if let Some(&shape) = candidates.choose(&mut self.rng) {
            shape
        } else {
            tracing::trace!("no compatible shape fits, falling back to single cell");
            ShapeId::SINGLE
        }
    }

    fn pick(&mut self, range: Range<u8>) -> ShapeId {
        ShapeId::from_raw(self.rng.random_range(range))
    }
}

/// A not-yet-placed piece waiting in a supply slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPiece {
    pub id: PieceId,
    pub shape: ShapeId,
}

/// What the presentation layer needs to show a supply slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceDescriptor {
    pub slot: usize,
    pub id: PieceId,
    pub shape: ShapeId,
    pub offsets: &'static [Offset],
    pub color: ShapeColor,
}

impl PieceDescriptor {
    #[must_use]
    pub fn new(slot: usize, piece: SupplyPiece) -> Self {
        Self {
            slot,
            id: piece.id,
            shape: piece.shape,
            offsets: piece.shape.offsets(),
            color: piece.shape.color(),
        }
    }
}

/// The three supply slots of the current wave.
///
/// A slot is emptied when its piece is placed and refilled only when the
/// whole wave has been consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyQueue {
    slots: [Option<SupplyPiece>; SUPPLY_SLOTS],
}

impl SupplyQueue {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; SUPPLY_SLOTS],
        }
    }

    /// Replaces every slot with a new piece.
    pub fn fill(&mut self, pieces: [SupplyPiece; SUPPLY_SLOTS]) {
        self.slots = pieces.map(Some);
    }

    /// Returns the piece in `slot`, or `None` if it is consumed or out of range.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<SupplyPiece> {
        self.slots.get(slot).copied().flatten()
    }

    /// Removes and returns the piece in `slot`.
    pub fn take(&mut self, slot: usize) -> Option<SupplyPiece> {
        self.slots.get_mut(slot)?.take()
    }

    /// Unplaced pieces with their slot index.
    pub fn pending(&self) -> impl Iterator<Item = (usize, SupplyPiece)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, piece)| piece.map(|piece| (slot, piece)))
    }

    #[must_use]
    pub fn descriptors(&self) -> ArrayVec<PieceDescriptor, SUPPLY_SLOTS> {
        self.pending()
            .map(|(slot, piece)| PieceDescriptor::new(slot, piece))
            .collect()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots = [None; SUPPLY_SLOTS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BitGrid, Position};

    const SEED: SupplySeed = SupplySeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);

    #[test]
    fn test_seed_format() {
        let text = SEED.to_string();
        assert_eq!(text, "0123456789abcdeffedcba9876543210");
        assert_eq!(text.parse::<SupplySeed>().unwrap(), SEED);

        let json = serde_json::to_string(&SEED).unwrap();
        assert_eq!(json, "\"0123456789abcdeffedcba9876543210\"");
        assert_eq!(serde_json::from_str::<SupplySeed>(&json).unwrap(), SEED);

        assert!("0123".parse::<SupplySeed>().is_err());
        assert!("0123456789abcdeffedcba987654321g".parse::<SupplySeed>().is_err());
        assert!(serde_json::from_str::<SupplySeed>("\"xyz\"").is_err());
    }

    #[test]
    fn test_seed_rejects_sign() {
        let signed = format!("+{}", "1".repeat(31));
        assert_eq!(signed.len(), 32);
        assert!(signed.parse::<SupplySeed>().is_err());
        assert!(format!("-{}", "1".repeat(31)).parse::<SupplySeed>().is_err());
    }

    #[test]
    fn test_same_seed_same_waves() {
        let mut a = SupplyGenerator::with_seed(SEED);
        let mut b = SupplyGenerator::with_seed(SEED);
        for _ in 0..100 {
            assert_eq!(
                a.generate_wave(&BitGrid::EMPTY),
                b.generate_wave(&BitGrid::EMPTY)
            );
        }
    }

    #[test]
    fn test_weighted_tiers() {
        const DRAWS: usize = 40_000;
        let mut generator = SupplyGenerator::with_seed(SEED);
        let mut counts = [0_usize; ShapeId::LEN];
        for _ in 0..DRAWS {
            counts[generator.draw_weighted().index()] += 1;
        }

        #[expect(clippy::cast_precision_loss)]
        let share = |indices: &[usize]| {
            indices.iter().map(|&i| counts[i]).sum::<usize>() as f64 / DRAWS as f64
        };
        let base = (0..7).collect::<Vec<_>>();
        let rotated = (14..22).collect::<Vec<_>>();
        let r_family = (24..28).collect::<Vec<_>>();
        let standard = [base.as_slice(), &rotated, &r_family].concat();

        assert!((share(&standard) - 0.65).abs() < 0.02);
        assert!((share(&base) - 0.39).abs() < 0.02);
        assert!((share(&rotated) - 0.13).abs() < 0.02);
        assert!((share(&r_family) - 0.13).abs() < 0.02);
        assert!((share(&[9, 10]) - 0.15).abs() < 0.02);
        assert!((share(&[11, 12, 13]) - 0.15).abs() < 0.02);
        assert!((share(&[7, 8, 22, 23]) - 0.05).abs() < 0.01);
        assert!(counts[7] > counts[8]);
        assert!(rotated.iter().chain(&r_family).all(|&i| counts[i] > 0));
    }

    #[test]
    fn test_compatible_draw_respects_board() {
        let mut generator = SupplyGenerator::with_seed(SEED);
        for _ in 0..200 {
            let shape = generator.draw_compatible(&BitGrid::EMPTY);
            assert!(shape.index() < 10, "{shape}");
        }

        // Only isolated single cells are free.
        let mut bits = BitGrid::FULL;
        bits.vacate(Position::new(0, 0));
        bits.vacate(Position::new(4, 4));
        for _ in 0..50 {
            assert_eq!(generator.draw_compatible(&bits), ShapeId::SINGLE);
        }

        // Nothing fits at all.
        assert_eq!(generator.draw_compatible(&BitGrid::FULL), ShapeId::SINGLE);
    }

    #[test]
    fn test_queue_slots() {
        let mut queue = SupplyQueue::new();
        assert!(queue.is_exhausted());

        queue.fill([
            SupplyPiece {
                id: PieceId(0),
                shape: ShapeId::O,
            },
            SupplyPiece {
                id: PieceId(1),
                shape: ShapeId::T,
            },
            SupplyPiece {
                id: PieceId(2),
                shape: ShapeId::SINGLE,
            },
        ]);
        assert_eq!(queue.descriptors().len(), 3);

        let taken = queue.take(1).unwrap();
        assert_eq!(taken.shape, ShapeId::T);
        assert!(queue.take(1).is_none());
        assert!(queue.get(5).is_none());
        assert!(queue.take(5).is_none());

        let descriptors = queue.descriptors();
        assert_eq!(
            descriptors.iter().map(|d| d.slot).collect::<Vec<_>>(),
            [0, 2]
        );
        assert_eq!(descriptors[1].offsets, ShapeId::SINGLE.offsets());
        assert_eq!(descriptors[1].color, ShapeId::SINGLE.color());

        queue.take(0);
        queue.take(2);
        assert!(queue.is_exhausted());
    }
}
