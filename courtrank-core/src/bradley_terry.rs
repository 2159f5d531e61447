/// Bradley-Terry strength fitting by Minorize-Maximization.
///
/// Internal module — operates on pre-mapped `usize` indices, not caller IDs.
/// Fully deterministic: sparse tables use `BTreeMap` so summation order never
/// depends on hash seeds, and every iteration reads only the previous
/// iteration's full strength vector.
use std::collections::BTreeMap;

/// One in-pool aggregate row, endpoints pre-mapped to indices:
/// `(idx_lo, idx_hi, wins_lo, wins_hi)`.
pub(crate) type IndexedAggregate = (usize, usize, u64, u64);

pub(crate) struct BradleyTerry {
    num_players: usize,
    /// Sparse smoothed wins: wins_table[i] maps opponent index -> wins of i
    /// over that opponent, prior included.
    wins_table: Vec<BTreeMap<usize, f64>>,
    /// Total wins per player (precomputed for the MM numerator).
    total_wins: Vec<f64>,
    /// Current strengths.
    strengths: Vec<f64>,
}

impl BradleyTerry {
    /// Build the smoothed wins table from aggregate rows.
    ///
    /// `prior` pseudocounts are added to both directions of every pair that
    /// has at least one recorded vote. Pairs with no votes contribute
    /// nothing, so players without evidence keep their initial strength.
    pub fn new(num_players: usize, aggregates: &[IndexedAggregate], prior: f64) -> Self {
        let mut wins_table: Vec<BTreeMap<usize, f64>> =
            (0..num_players).map(|_| BTreeMap::new()).collect();

        for &(lo, hi, wins_lo, wins_hi) in aggregates {
            assert!(lo < num_players, "index {} out of range", lo);
            assert!(hi < num_players, "index {} out of range", hi);
            if wins_lo + wins_hi == 0 {
                continue;
            }
            *wins_table[lo].entry(hi).or_insert(0.0) += wins_lo as f64 + prior;
            *wins_table[hi].entry(lo).or_insert(0.0) += wins_hi as f64 + prior;
        }

        let total_wins: Vec<f64> = wins_table
            .iter()
            .map(|row| row.values().sum::<f64>())
            .collect();

        // Scale-invariant likelihood; 1/n is as good a start as any.
        let initial = 1.0 / num_players.max(1) as f64;

        BradleyTerry {
            num_players,
            wins_table,
            total_wins,
            strengths: vec![initial; num_players],
        }
    }

    /// Whether any pair contributed evidence at all.
    pub fn has_evidence(&self) -> bool {
        self.total_wins.iter().any(|&w| w > 0.0)
    }

    fn wins(&self, i: usize, j: usize) -> f64 {
        self.wins_table[i].get(&j).copied().unwrap_or(0.0)
    }

    /// One simultaneous MM pass: every new strength is computed from the
    /// previous iteration's full vector, never from a half-updated one.
    fn run_iteration(&mut self) {
        let mut next = vec![0.0; self.num_players];

        for i in 0..self.num_players {
            let w_i = self.strengths[i];
            let mut denominator = 0.0;

            // Only opponents i has actually faced (sparse).
            for (&j, &wins_i_over_j) in &self.wins_table[i] {
                let w_j = self.strengths[j];
                let games = wins_i_over_j + self.wins(j, i);
                if games > 0.0 && (w_i + w_j) > 0.0 {
                    denominator += games / (w_i + w_j);
                }
            }

            next[i] = if denominator > 0.0 {
                self.total_wins[i] / denominator
            } else {
                w_i
            };
        }

        self.strengths = next;
    }

    /// Divide the whole vector by its mean each pass. The likelihood is
    /// scale-invariant, so this only pins the scale and stops numerical
    /// drift over many iterations.
    fn renormalize(&mut self) {
        let sum: f64 = self.strengths.iter().sum();
        if sum <= 0.0 {
            return;
        }
        let mean = sum / self.num_players as f64;
        for w in &mut self.strengths {
            *w /= mean;
        }
    }

    /// Run the MM fit for up to `max_iterations`, exiting early once the
    /// maximum relative strength change drops below `tolerance`.
    pub fn fit(&mut self, max_iterations: usize, tolerance: f64) {
        for _ in 0..max_iterations {
            let previous = self.strengths.clone();
            self.run_iteration();
            self.renormalize();

            let max_relative_change = self
                .strengths
                .iter()
                .zip(previous.iter())
                .map(|(new, old)| (new - old).abs() / old.abs().max(f64::MIN_POSITIVE))
                .fold(0.0_f64, f64::max);

            if max_relative_change < tolerance {
                break;
            }
        }
    }

    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted(num: usize, aggregates: &[IndexedAggregate]) -> Vec<f64> {
        let mut bt = BradleyTerry::new(num, aggregates, 0.5);
        bt.fit(200, 1e-9);
        bt.strengths().to_vec()
    }

    #[test]
    fn test_basic_ordering() {
        // 0 dominates 1, 1 dominates 2
        let strengths = fitted(3, &[(0, 1, 9, 1), (1, 2, 9, 1)]);
        assert!(strengths[0] > strengths[1]);
        assert!(strengths[1] > strengths[2]);
    }

    #[test]
    fn test_no_evidence_keeps_uniform_strengths() {
        let mut bt = BradleyTerry::new(3, &[(0, 1, 0, 0)], 0.5);
        assert!(!bt.has_evidence());
        bt.fit(200, 1e-9);
        let s = bt.strengths();
        assert!((s[0] - s[1]).abs() < 1e-12);
        assert!((s[1] - s[2]).abs() < 1e-12);
    }

    #[test]
    fn test_undefeated_player_stays_finite() {
        let strengths = fitted(2, &[(0, 1, 10, 0)]);
        assert!(strengths[0].is_finite());
        assert!(strengths[0] > 0.0);
        assert!(strengths[1] > 0.0);
        assert!(strengths[0] > strengths[1]);
    }

    #[test]
    fn test_two_player_fit_matches_win_ratio() {
        // With prior 0.5: effective wins 6.5 vs 4.5. At the MLE the strength
        // ratio equals the (smoothed) win ratio.
        let strengths = fitted(2, &[(0, 1, 6, 4)]);
        let ratio = strengths[0] / strengths[1];
        assert!((ratio - 6.5 / 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_mean_normalization() {
        let strengths = fitted(3, &[(0, 1, 7, 3), (1, 2, 6, 4), (0, 2, 8, 2)]);
        let mean = strengths.iter().sum::<f64>() / strengths.len() as f64;
        assert!((mean - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let aggregates = vec![(0, 1, 12, 3), (1, 2, 5, 5), (0, 3, 2, 9), (2, 3, 4, 1)];
        let a = fitted(4, &aggregates);
        let b = fitted(4, &aggregates);
        assert_eq!(a, b);
    }
}
