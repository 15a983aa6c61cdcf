use chrono::Utc;
use parking_lot::Mutex;
use rand::distr::uniform::SampleUniform;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::{instrument, warn};

/// Maximal number of draws before a truncated normal gives up
const MAX_TRUNCATED_DRAWS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    #[error("ParseError: expected 'D<seed>', got '{0}'")]
    Parse(String),
}

/// Source of randomness consumed by every stochastic operation of a genome.
///
/// Object safe: field managers receive a `&mut dyn Dice`. All the convenient
/// draws live on [`DiceExt`], which is implemented for every `Dice`.
pub trait Dice {
    fn seed(&self) -> u64;
    fn reset(&mut self, seed: u64);
    fn next_u64(&mut self) -> u64;
}

/// Adapts any [`Dice`] to `rand`'s generator traits.
pub struct DiceRng<'a, D: ?Sized>(&'a mut D);

impl<D: Dice + ?Sized> RngCore for DiceRng<'_, D> {
    fn next_u32(&mut self) -> u32 {
        (self.0.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.0.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

pub trait DiceExt: Dice {
    fn rng(&mut self) -> DiceRng<'_, Self> {
        DiceRng(self)
    }

    /// Uniform draw in `[lower, upper]`. Degenerate ranges return `lower`.
    fn draw<T>(&mut self, lower: T, upper: T) -> T
    where
        T: SampleUniform + PartialOrd + Copy,
    {
        if lower >= upper {
            return lower;
        }
        self.rng().random_range(lower..=upper)
    }

    fn toss_coin(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.rng().random_bool(probability)
        }
    }

    /// Returns either argument with equal probability
    fn toss<T>(&mut self, heads: T, tails: T) -> T {
        if self.toss_coin(0.5) { heads } else { tails }
    }

    /// Weighted pick over the keys of `weights`.
    ///
    /// Non-positive weights are never picked. Returns `None` when nothing can be
    /// picked.
    fn pick_one<'k, K>(&mut self, weights: &'k BTreeMap<K, f32>) -> Option<&'k K> {
        let total: f64 = weights.values().filter(|w| **w > 0.0).map(|w| *w as f64).sum();
        if total <= 0.0 {
            return None;
        }

        let spin = self.rng().random_range(0.0..total);
        let mut cumulative = 0.0;
        let mut last = None;
        for (key, weight) in weights.iter().filter(|(_, w)| **w > 0.0) {
            cumulative += *weight as f64;
            last = Some(key);
            if cumulative >= spin {
                return Some(key);
            }
        }

        // Rounding may leave the spin just above the cumulated total
        last
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng());
    }

    fn normal(&mut self, mean: f64, stddev: f64) -> f64 {
        match Normal::new(mean, stddev) {
            Ok(normal) => normal.sample(&mut self.rng()),
            Err(_) => mean,
        }
    }

    /// Normal draw re-sampled until it lands in `[min, max]` (and differs from
    /// zero if requested).
    #[instrument(level = "debug", skip(self))]
    fn truncated_normal(
        &mut self,
        mean: f64,
        stddev: f64,
        min: f64,
        max: f64,
        non_zero: bool,
    ) -> Option<f64> {
        let normal = Normal::new(mean, stddev).ok()?;
        for _ in 0..MAX_TRUNCATED_DRAWS {
            let value = normal.sample(&mut self.rng());
            if value < min || max < value || (non_zero && value == 0.0) {
                continue;
            }
            return Some(value);
        }

        warn!(
            mean,
            stddev, min, max, "Failed to draw from truncated normal distribution"
        );
        None
    }

    /// Uniformly distributed direction in `N` dimensions
    fn random_unit_vector<const N: usize>(&mut self) -> [f64; N] {
        loop {
            let mut vector = [0.0; N];
            for x in vector.iter_mut() {
                *x = self.normal(0.0, 1.0);
            }
            let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > f64::EPSILON || N == 0 {
                vector.iter_mut().for_each(|x| *x /= norm.max(f64::EPSILON));
                return vector;
            }
        }
    }
}

impl<D: Dice + ?Sized> DiceExt for D {}

fn current_millis() -> u64 {
    Utc::now().timestamp_millis().unsigned_abs()
}

fn parse_seed(input: &str) -> Result<u64, DiceError> {
    input
        .trim()
        .strip_prefix('D')
        .and_then(|seed| seed.parse().ok())
        .ok_or_else(|| DiceError::Parse(input.to_string()))
}

// ============================================================
// FastDice
// ============================================================

/// Seeded generator. Not meant to be shared between threads; use
/// [`AtomicDice`] for that.
#[derive(Debug, Clone)]
pub struct FastDice {
    seed: u64,
    rng: StdRng,
}

impl FastDice {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for FastDice {
    fn default() -> Self {
        Self::new(current_millis())
    }
}

impl Dice for FastDice {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn reset(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl fmt::Display for FastDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.seed)
    }
}

impl FromStr for FastDice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_seed(s).map(Self::new)
    }
}

// ============================================================
// AtomicDice
// ============================================================

/// Mutex guarded generator. `&AtomicDice` is itself a [`Dice`] and can be
/// handed to several threads at once.
#[derive(Debug)]
pub struct AtomicDice {
    inner: Mutex<FastDice>,
}

impl AtomicDice {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(FastDice::new(seed)),
        }
    }
}

impl Default for AtomicDice {
    fn default() -> Self {
        Self::new(current_millis())
    }
}

impl Dice for &AtomicDice {
    fn seed(&self) -> u64 {
        self.inner.lock().seed()
    }

    fn reset(&mut self, seed: u64) {
        self.inner.lock().reset(seed);
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.lock().next_u64()
    }
}

impl Dice for AtomicDice {
    fn seed(&self) -> u64 {
        self.inner.lock().seed()
    }

    fn reset(&mut self, seed: u64) {
        self.inner.get_mut().reset(seed);
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.get_mut().next_u64()
    }
}

impl fmt::Display for AtomicDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.seed())
    }
}

impl FromStr for AtomicDice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_seed(s).map(Self::new)
    }
}
