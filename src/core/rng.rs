//! Random sources for dice and shuffles.
//!
//! Effects never call an ambient RNG. Every die roll and shuffle goes through
//! a [`RandomSource`] supplied when the `GameState` is built, so a match can
//! be replayed from its seed and tests can script exact outcomes.
//!
//! - [`GameRng`]: seeded ChaCha8 stream, the default for real matches
//! - [`FixedRolls`]: scripted die faces, for tests and replays
//!
//! ```
//! use holo_ccg::core::{FixedRolls, GameRng, RandomSource};
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.roll(6), b.roll(6));
//!
//! let mut scripted = FixedRolls::new([3, 5]);
//! assert_eq!(scripted.roll(6), 3);
//! assert_eq!(scripted.roll(6), 5);
//! assert_eq!(scripted.roll(6), 3);
//! ```

use std::fmt::Debug;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of randomness consumed by the engine.
///
/// Implementations must be cloneable through [`RandomSource::box_clone`]
/// because state snapshots (taken before every effect execution) carry the
/// random source along with the zones.
pub trait RandomSource: Send + Sync + Debug {
    /// Roll a die with `sides` faces. Returns a value in `1..=sides`.
    fn roll(&mut self, sides: u8) -> u8;

    /// Pick a uniform index in `0..len`. `len` is never zero.
    fn index(&mut self, len: usize) -> usize;

    /// Clone into a fresh box.
    fn box_clone(&self) -> Box<dyn RandomSource>;

    /// Fisher-Yates shuffle driven by [`RandomSource::index`].
    fn shuffle_indices(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        for i in (1..len).rev() {
            let j = self.index(i + 1);
            order.swap(i, j);
        }
        order
    }
}

impl Clone for Box<dyn RandomSource> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Deterministic seeded RNG.
///
/// ChaCha8 keyed by a `u64`. The same seed replays the same match.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for GameRng {
    fn roll(&mut self, sides: u8) -> u8 {
        self.inner.gen_range(1..=sides.max(1))
    }

    fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len.max(1))
    }

    fn box_clone(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}

/// Scripted die faces, returned in order and then repeated.
///
/// Index requests (used by shuffles) always return 0, so a shuffle under
/// `FixedRolls` is a fixed permutation rather than a random one.
#[derive(Clone, Debug)]
pub struct FixedRolls {
    faces: Vec<u8>,
    cursor: usize,
}

impl FixedRolls {
    /// Create a source that yields `faces` cyclically.
    ///
    /// An empty script behaves like a die that always shows 1.
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            cursor: 0,
        }
    }

    /// How many rolls have been consumed so far.
    #[must_use]
    pub fn rolls_taken(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for FixedRolls {
    fn roll(&mut self, sides: u8) -> u8 {
        let face = if self.faces.is_empty() {
            1
        } else {
            self.faces[self.cursor % self.faces.len()]
        };
        self.cursor += 1;
        face.clamp(1, sides.max(1))
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }

    fn box_clone(&self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}
