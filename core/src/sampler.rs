//! Weighted question selection.
//!
//! Tier `k` holds the pairs `(k, 1) ..= (k, k)`. Every member of tier `k`
//! carries weight `2^-((n - k) + 1)`, so the top tier gets `1/2`, the next
//! `1/4` and so on down to tier 1.

use crate::problem::FactorPair;
use rand::Rng;
use tracing::debug;

/// Redraws allowed when a draw repeats the previous question.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Weight of a single member of tier `k` when the largest tier is `max_factor`.
pub fn tier_weight(max_factor: u8, k: u8) -> f64 {
    let distance = i32::from(max_factor.saturating_sub(k));
    0.5f64.powi(distance + 1)
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    pair: FactorPair,
    weight: f64,
}

#[derive(Debug, Clone)]
pub struct WeightTable {
    max_factor: u8,
    candidates: Vec<Candidate>,
    total: f64,
}

impl WeightTable {
    /// Lists tiers from largest to smallest, members in ascending order.
    pub fn build(max_factor: u8) -> Self {
        let n = max_factor.max(1);
        let count = usize::from(n) * (usize::from(n) + 1) / 2;
        let mut candidates = Vec::with_capacity(count);
        let mut total = 0.0;

        for k in (1..=n).rev() {
            let weight = tier_weight(n, k);
            for i in 1..=k {
                candidates.push(Candidate {
                    pair: FactorPair::new(k, i),
                    weight,
                });
                total += weight;
            }
        }

        Self {
            max_factor: n,
            candidates,
            total,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Returns the first candidate whose cumulative weight reaches `r`.
    ///
    /// The running sum is accumulated in the same order as `total`, so for
    /// any `r < total` the walk matches before the end. Values at or past the
    /// total land on the last candidate.
    pub fn select(&self, r: f64) -> FactorPair {
        let mut cumulative = 0.0;
        for candidate in &self.candidates {
            cumulative += candidate.weight;
            if r <= cumulative {
                return candidate.pair;
            }
        }
        self.candidates
            .last()
            .map_or(FactorPair::new(1, 1), |c| c.pair)
    }

    /// Expected fraction of draws that land in tier `k`.
    pub fn tier_share(&self, k: u8) -> f64 {
        if k == 0 || k > self.max_factor {
            return 0.0;
        }
        f64::from(k) * tier_weight(self.max_factor, k) / self.total
    }

    /// One weighted draw with a coin flip deciding which factor is shown first.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> FactorPair {
        let r = rng.gen::<f64>() * self.total;
        let pair = self.select(r);
        if rng.gen_bool(0.5) {
            pair
        } else {
            pair.swapped()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuestionSampler {
    max_attempts: u32,
}

impl Default for QuestionSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionSampler {
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// A single weighted draw, without repeat avoidance.
    pub fn draw<R: Rng + ?Sized>(&self, max_factor: u8, rng: &mut R) -> FactorPair {
        if max_factor <= 1 {
            return FactorPair::new(1, 1);
        }
        WeightTable::build(max_factor).draw(rng)
    }

    /// Picks the next question, redrawing a bounded number of times when the
    /// result would repeat `previous` exactly. If every redraw collides the
    /// repeat is returned.
    pub fn next<R: Rng + ?Sized>(
        &self,
        max_factor: u8,
        previous: Option<&FactorPair>,
        rng: &mut R,
    ) -> FactorPair {
        if max_factor <= 1 {
            return FactorPair::new(1, 1);
        }

        let table = WeightTable::build(max_factor);
        let mut pair = table.draw(rng);

        let Some(previous) = previous else {
            return pair;
        };

        let previous_key = previous.key();
        let mut attempts = 0;
        while pair.key() == previous_key && attempts < self.max_attempts {
            pair = table.draw(rng);
            attempts += 1;
        }

        if pair.key() == previous_key {
            debug!(question = %pair, attempts, "accepting repeated question");
        } else if attempts > 0 {
            debug!(question = %pair, attempts, "redrew to avoid a repeat");
        }

        pair
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    struct CountingRng {
        inner: StepRng,
        calls: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.calls += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.calls += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.calls += 1;
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.calls += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    #[test]
    fn candidate_count_is_triangular() {
        for n in 1..=20u8 {
            let n_usize = usize::from(n);
            assert_eq!(WeightTable::build(n).candidates.len(), n_usize * (n_usize + 1) / 2);
        }
        assert_eq!(WeightTable::build(20).candidates.len(), 210);
    }

    #[test]
    fn tier_weights_halve_per_step() {
        assert_eq!(tier_weight(12, 12), 0.5);
        assert_eq!(tier_weight(12, 11), 0.25);
        assert_eq!(tier_weight(12, 1), 0.5f64.powi(12));
    }

    #[test]
    fn two_factor_table_walk() {
        let table = WeightTable::build(2);
        assert_eq!(table.total(), 1.25);

        assert_eq!(table.select(0.0), FactorPair::new(2, 1));
        assert_eq!(table.select(0.5), FactorPair::new(2, 1));
        assert_eq!(table.select(0.75), FactorPair::new(2, 2));
        assert_eq!(table.select(1.0), FactorPair::new(2, 2));
        assert_eq!(table.select(1.249_999), FactorPair::new(1, 1));
    }

    #[test]
    fn select_past_total_lands_on_last_candidate() {
        let table = WeightTable::build(5);
        assert_eq!(table.select(table.total()), FactorPair::new(1, 1));
        assert_eq!(table.select(table.total() * 2.0), FactorPair::new(1, 1));
    }

    #[test]
    fn tier_shares_sum_to_one() {
        let table = WeightTable::build(12);
        let sum: f64 = (1..=12).map(|k| table.tier_share(k)).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(table.tier_share(0), 0.0);
        assert_eq!(table.tier_share(13), 0.0);
    }

    #[test]
    fn top_tier_holds_about_half_the_mass_at_twenty() {
        let share = WeightTable::build(20).tier_share(20);
        assert!((share - 0.5).abs() < 0.03, "share {share}");
    }

    #[test]
    fn max_factor_one_is_constant() {
        let sampler = QuestionSampler::new();
        let mut rng = StdRng::seed_from_u64(1);
        let previous = FactorPair::new(1, 1);
        for _ in 0..100 {
            assert_eq!(sampler.next(1, Some(&previous), &mut rng), previous);
            assert_eq!(sampler.draw(1, &mut rng), previous);
        }
        assert_eq!(sampler.next(0, None, &mut rng), previous);
    }

    #[test]
    fn zero_draw_picks_top_tier_first_member_in_order() {
        let sampler = QuestionSampler::new();
        let mut rng = StepRng::new(0, 0);
        assert_eq!(sampler.next(12, None, &mut rng), FactorPair::new(12, 1));
    }

    #[test]
    fn maximal_draw_picks_bottom_tier_swapped() {
        let sampler = QuestionSampler::new();
        let mut rng = StepRng::new(u64::MAX, 0);
        assert_eq!(sampler.next(2, None, &mut rng), FactorPair::new(1, 1));
    }

    #[test]
    fn pinned_sequence_redraws_past_the_repeat() {
        // Draws: (3,1) kept order, (3,1) kept order, then (3,2).
        let sampler = QuestionSampler::new();
        let mut rng = StepRng::new(0, 1 << 60);
        let previous = FactorPair::new(3, 1);
        assert_eq!(sampler.next(3, Some(&previous), &mut rng), FactorPair::new(3, 2));
    }

    #[test]
    fn retries_are_bounded_then_the_repeat_is_accepted() {
        let sampler = QuestionSampler::new();
        let mut rng = CountingRng {
            inner: StepRng::new(0, 0),
            calls: 0,
        };
        let previous = FactorPair::new(6, 1);
        assert_eq!(sampler.next(6, Some(&previous), &mut rng), previous);
        // Two random values per draw, one initial draw plus ten redraws.
        assert_eq!(rng.calls, 2 * (1 + DEFAULT_MAX_ATTEMPTS as usize));
    }

    #[test]
    fn zero_attempts_disables_repeat_avoidance() {
        let sampler = QuestionSampler::with_max_attempts(0);
        let mut rng = CountingRng {
            inner: StepRng::new(0, 0),
            calls: 0,
        };
        let previous = FactorPair::new(4, 1);
        assert_eq!(sampler.next(4, Some(&previous), &mut rng), previous);
        assert_eq!(rng.calls, 2);
    }

    #[test]
    fn pairs_stay_in_range() {
        let sampler = QuestionSampler::new();
        let mut rng = StdRng::seed_from_u64(7);
        let mut previous = None;
        for n in 1..=20u8 {
            for _ in 0..500 {
                let pair = sampler.next(n, previous.as_ref(), &mut rng);
                assert!((1..=n).contains(&pair.a), "{pair} outside 1..={n}");
                assert!((1..=n).contains(&pair.b), "{pair} outside 1..={n}");
                assert_eq!(pair.answer(), u32::from(pair.a) * u32::from(pair.b));
                previous = Some(pair);
            }
        }
    }
}
