use std::{collections::VecDeque, fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Draws one bag: a uniformly shuffled permutation of all 7 piece kinds.
pub fn draw_bag<R: Rng + ?Sized>(rng: &mut R) -> [PieceKind; PieceKind::LEN] {
    let mut bag = PieceKind::ALL;
    bag.shuffle(rng);
    bag
}

/// Upcoming-piece queue fed by the 7-bag randomizer.
///
/// # 7-Bag System
///
/// 1. A "bag" holds all 7 piece kinds in shuffled order
/// 2. Pieces are drawn from the bag in that order
/// 3. When the bag runs out, a new shuffled bag is drawn
///
/// Every kind appears exactly once per bag, so the same kind never repeats more
/// than twice in a row and never goes missing for more than 12 pieces.
///
/// The lookahead queue always holds [`PieceBuffer::PREVIEW_LEN`] pieces after a
/// [`PieceBuffer::pop_next`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::with_seed(PieceSeed::from_bytes([0; 16]));
///
/// let upcoming: Vec<_> = buffer.next_pieces().collect();
/// assert_eq!(upcoming.len(), PieceBuffer::PREVIEW_LEN);
///
/// let first = buffer.pop_next();
/// assert_eq!(first, upcoming[0]);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    // Remaining pieces of the current bag, stored back to front.
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
    queue: VecDeque<PieceKind>,
}

impl PieceBuffer {
    /// Number of upcoming pieces kept in the lookahead queue.
    pub const PREVIEW_LEN: usize = 5;

    /// Creates a piece buffer whose bags are shuffled by a generator seeded with `seed`.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.to_bytes()),
            bag: ArrayVec::new(),
            queue: VecDeque::with_capacity(Self::PREVIEW_LEN + 1),
        };
        this.refill();
        this
    }

    fn draw_from_bag(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            let mut bag = draw_bag(&mut self.rng);
            bag.reverse();
            self.bag = ArrayVec::from(bag);
        }
        self.bag.pop().expect("Piece bag should never be empty")
    }

    /// Tops the lookahead queue up to [`Self::PREVIEW_LEN`] pieces.
    fn refill(&mut self) {
        while self.queue.len() < Self::PREVIEW_LEN {
            let kind = self.draw_from_bag();
            self.queue.push_back(kind);
        }
    }

    /// Dequeues the next piece and refills the queue behind it.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (should never happen with proper refill logic).
    pub fn pop_next(&mut self) -> PieceKind {
        self.refill();
        let kind = self
            .queue
            .pop_front()
            .expect("Piece queue should never be empty");
        self.refill();
        kind
    }

    /// Returns an iterator over the upcoming pieces, next piece first.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}

/// Seed for the piece randomizer.
///
/// A 128-bit seed that initializes the generator of a [`PieceBuffer`]. It is shown
/// and parsed as a 32-character hex string.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceBuffer, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = PieceBuffer::with_seed(seed);
/// let mut b = PieceBuffer::with_seed(seed.to_string().parse().unwrap());
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece seed {input:?}: expected 32 hex characters")]
pub struct ParsePieceSeedError {
    #[error(not(source))]
    input: String,
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePieceSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
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

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}
