// Random sources for Verse Roulette.
//
// Every random decision on the page (which mode to show, which verse to
// sample for each act, which pool image illustrates a stanza, which slogan
// appears, whether a Randomize press re-rolls the mode) goes through the
// `RandomSource` trait defined here. Nothing else in the workspace touches a
// random number generator directly.
//
// Two implementations:
// - `PageRng`: xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
//   Used by the server. Seeded from config for reproducible pages, or from the
//   wall clock when no seed is given.
// - `ScriptedRng`: replays a fixed list of picks and rolls. Used by tests to
//   assert exact selections ("the second opening verse, the third pool
//   image") without reverse-engineering generator output.
//
// The trait's provided methods are written in terms of `next_u64`, so a new
// source only needs to supply raw bits. `ScriptedRng` overrides the derived
// methods so that a scripted pick maps directly onto the chosen index.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A source of random choices, injectable wherever the page randomizes.
pub trait RandomSource {
    /// Generate the next raw `u64`.
    fn next_u64(&mut self) -> u64;

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Uses the upper 53 bits of a `u64` to fill the mantissa.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        assert!(low < high, "range_usize: low must be less than high");
        let range = (high - low) as u64;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1)) as usize;
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range) as usize;
            }
        }
    }

    /// Return `true` with probability `p`.
    ///
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick a uniform index into a collection of `len` items, or `None` when
    /// the collection is empty.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.range_usize(0, len))
        }
    }
}

/// Pick a uniform element of `items`, or `None` when `items` is empty.
pub fn pick<'a, T, R: RandomSource + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    rng.pick_index(items.len()).map(|i| &items[i])
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }

    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        (**self).range_usize(low, high)
    }

    fn random_bool(&mut self, p: f64) -> bool {
        (**self).random_bool(p)
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        (**self).pick_index(len)
    }
}

/// Xoshiro256++ PRNG, the page's production random source.
///
/// Two `PageRng` instances created with the same seed produce identical
/// pages given identical datasets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageRng {
    s: [u64; 4],
}

impl PageRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a PRNG seeded from the wall clock. Each page load without a
    /// configured seed gets a different sequence.
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }
}

impl RandomSource for PageRng {
    fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }
}

/// Nanoseconds since the Unix epoch, folded into a `u64`. Falls back to a
/// fixed constant if the clock reads before the epoch.
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed_5eed_5eed_5eed)
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// A random source that replays scripted decisions.
///
/// `picks` feed `range_usize` / `pick_index`: each scripted value `v` selects
/// `low + v % (high - low)`, so a test can say "take index 2" directly.
/// `rolls` feed `next_f64` / `random_bool`.
///
/// Once a script runs out, picks default to 0 (the first item) and rolls
/// default to 0.5, which keeps the 30% mode re-roll from firing.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    picks: VecDeque<usize>,
    rolls: VecDeque<f64>,
    picks_taken: usize,
    rolls_taken: usize,
}

impl ScriptedRng {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add scripted rolls for `next_f64` / `random_bool`.
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = f64>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    /// Append more picks to the end of the script.
    pub fn push_picks(&mut self, picks: impl IntoIterator<Item = usize>) {
        self.picks.extend(picks);
    }

    /// How many picks have been consumed so far (scripted or defaulted).
    pub fn picks_taken(&self) -> usize {
        self.picks_taken
    }

    pub fn rolls_taken(&self) -> usize {
        self.rolls_taken
    }

    fn next_pick(&mut self) -> usize {
        self.picks_taken += 1;
        self.picks.pop_front().unwrap_or(0)
    }
}

impl RandomSource for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        self.next_pick() as u64
    }

    fn next_f64(&mut self) -> f64 {
        self.rolls_taken += 1;
        self.rolls.pop_front().unwrap_or(0.5)
    }

    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        assert!(low < high, "range_usize: low must be less than high");
        low + self.next_pick() % (high - low)
    }
}
