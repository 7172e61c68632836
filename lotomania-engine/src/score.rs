use crate::config::ScoringWeights;
use crate::stats::HistoryStats;
use crate::POOL_SIZE;

#[derive(Debug, Clone)]
pub struct NumberScores {
    pub scores: [f64; POOL_SIZE],
}

impl NumberScores {
    pub fn from_stats(stats: &HistoryStats, weights: &ScoringWeights) -> Self {
        let mut scores = [0.0f64; POOL_SIZE];
        for (n, score) in scores.iter_mut().enumerate() {
            *score = weights.frequency * stats.frequency[n]
                + weights.recency * stats.recency[n]
                + weights.cycle * stats.cycle[n]
                + weights.pair * stats.pair_bonus[n]
                + weights.triple * stats.triple_bonus[n];
        }
        Self { scores }
    }

    pub fn get(&self, number: u8) -> f64 {
        self.scores[number as usize]
    }

    /// Les 100 numéros par score décroissant, puis par numéro croissant.
    pub fn ranking(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = (0..POOL_SIZE as u8).collect();
        numbers.sort_by(|&a, &b| {
            self.scores[b as usize]
                .total_cmp(&self.scores[a as usize])
                .then_with(|| a.cmp(&b))
        });
        numbers
    }
}
