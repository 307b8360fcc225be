//! Aggregate results over a batch of headless episodes.

use std::collections::BTreeMap;

/// Outcome of one finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeStats {
    pub score: u32,
    pub max_tile: u32,
    pub steps: u32,
    pub won: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub episodes: usize,
    pub avg_score: f64,
    pub median_score: f64,
    pub min_score: u32,
    pub max_score: u32,
    pub max_tile_overall: u32,
    pub wins: usize,
    pub avg_steps: f64,
    /// Max tile reached -> number of episodes that ended there.
    pub tile_distribution: BTreeMap<u32, u32>,
}

impl Summary {
    pub fn from_episodes(results: &[EpisodeStats]) -> Self {
        let episodes = results.len();
        let mut scores: Vec<u32> = results.iter().map(|r| r.score).collect();
        scores.sort_unstable();

        let (avg_score, avg_steps) = if episodes == 0 {
            (0.0, 0.0)
        } else {
            let total_score: u64 = scores.iter().map(|&s| s as u64).sum();
            let total_steps: u64 = results.iter().map(|r| r.steps as u64).sum();
            (
                total_score as f64 / episodes as f64,
                total_steps as f64 / episodes as f64,
            )
        };

        let median_score = match episodes {
            0 => 0.0,
            n if n % 2 == 0 => (scores[n / 2 - 1] as f64 + scores[n / 2] as f64) / 2.0,
            n => scores[n / 2] as f64,
        };

        let mut tile_distribution = BTreeMap::new();
        for r in results {
            *tile_distribution.entry(r.max_tile).or_insert(0u32) += 1;
        }

        Summary {
            episodes,
            avg_score,
            median_score,
            min_score: scores.first().copied().unwrap_or(0),
            max_score: scores.last().copied().unwrap_or(0),
            max_tile_overall: results.iter().map(|r| r.max_tile).max().unwrap_or(0),
            wins: results.iter().filter(|r| r.won).count(),
            avg_steps,
            tile_distribution,
        }
    }

    /// `tile:count` pairs in ascending tile order, comma separated.
    pub fn distribution_line(&self) -> String {
        self.tile_distribution
            .iter()
            .map(|(tile, count)| format!("{tile}:{count}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}
