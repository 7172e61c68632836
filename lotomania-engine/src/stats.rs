use std::collections::HashMap;

use crate::config::GenerationConfig;
use crate::{DRAW_SIZE, POOL_SIZE};

/// Écart attribué à un numéro jamais vu : au-delà de la fenêtre.
pub const UNSEEN_GAP_PENALTY: usize = 5;

/// Signaux par numéro, chacun normalisé dans [0, 1]. Index = numéro.
#[derive(Debug, Clone)]
pub struct HistoryStats {
    pub window_size: usize,
    pub counts: [u32; POOL_SIZE],
    pub gaps: [usize; POOL_SIZE],
    pub frequency: [f64; POOL_SIZE],
    pub recency: [f64; POOL_SIZE],
    pub cycle: [f64; POOL_SIZE],
    pub pair_bonus: [f64; POOL_SIZE],
    pub triple_bonus: [f64; POOL_SIZE],
    pub top_pairs: Vec<([u8; 2], u32)>,
    pub top_triples: Vec<([u8; 3], u32)>,
}

/// history[0] = tirage le plus récent.
pub fn compute_history_stats<D: AsRef<[u8]>>(history: &[D], config: &GenerationConfig) -> HistoryStats {
    let draws: Vec<Vec<u8>> = history.iter().map(|d| distinct_in_pool(d.as_ref())).collect();
    let window_size = draws.len();

    let mut counts = [0u32; POOL_SIZE];
    let mut gaps = [window_size + UNSEEN_GAP_PENALTY; POOL_SIZE];
    let mut seen = [false; POOL_SIZE];

    for (t, draw) in draws.iter().enumerate() {
        for &n in draw {
            let idx = n as usize;
            counts[idx] += 1;
            if !seen[idx] {
                seen[idx] = true;
                gaps[idx] = t;
            }
        }
    }

    let mut stats = HistoryStats {
        window_size,
        counts,
        gaps,
        frequency: [0.0; POOL_SIZE],
        recency: [0.0; POOL_SIZE],
        cycle: [0.0; POOL_SIZE],
        pair_bonus: [0.0; POOL_SIZE],
        triple_bonus: [0.0; POOL_SIZE],
        top_pairs: Vec::new(),
        top_triples: Vec::new(),
    };

    // Fenêtre vide : tous les signaux restent à zéro
    if window_size == 0 {
        return stats;
    }

    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);
    for n in 0..POOL_SIZE {
        stats.frequency[n] = counts[n] as f64 / max_count as f64;
        stats.recency[n] = 1.0 / (gaps[n] as f64 + 1.0);
        let z = (gaps[n] as f64 - config.cycle_target_gap) / config.cycle_sigma;
        stats.cycle[n] = (-0.5 * z * z).exp();
    }
    normalize_by_max(&mut stats.recency);
    normalize_by_max(&mut stats.cycle);

    stats.top_pairs = top_combinations(count_pairs(&draws), config.top_pairs);
    stats.top_triples = top_combinations(count_triples(&draws), config.top_triples);
    stats.pair_bonus = combination_bonus(&stats.top_pairs);
    stats.triple_bonus = combination_bonus(&stats.top_triples);

    stats
}

/// Numéros distincts d'un tirage, triés ; ceux hors de 0-99 sont ignorés.
fn distinct_in_pool(draw: &[u8]) -> Vec<u8> {
    let mut numbers: Vec<u8> = draw.iter().copied().filter(|&n| (n as usize) < POOL_SIZE).collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Divise par le maximum (parcours par numéro croissant). Un maximum nul laisse le vecteur à zéro.
pub fn normalize_by_max(values: &mut [f64; POOL_SIZE]) {
    let max = values.iter().fold(0.0f64, |acc, &v| if v > acc { v } else { acc });
    if max > 0.0 && max.is_finite() {
        for v in values.iter_mut() {
            *v /= max;
        }
    } else {
        *values = [0.0; POOL_SIZE];
    }
}

fn count_pairs(draws: &[Vec<u8>]) -> HashMap<[u8; 2], u32> {
    let mut counts = HashMap::new();
    for draw in draws {
        for i in 0..draw.len() {
            for j in (i + 1)..draw.len() {
                *counts.entry([draw[i], draw[j]]).or_insert(0) += 1;
            }
        }
    }
    counts
}

fn count_triples(draws: &[Vec<u8>]) -> HashMap<[u8; 3], u32> {
    let mut counts = HashMap::new();
    for draw in draws {
        for i in 0..draw.len() {
            for j in (i + 1)..draw.len() {
                for k in (j + 1)..draw.len() {
                    *counts.entry([draw[i], draw[j], draw[k]]).or_insert(0) += 1;
                }
            }
        }
    }
    counts
}

/// Les `k` combinaisons les plus fréquentes, égalités départagées par ordre croissant.
fn top_combinations<const N: usize>(counts: HashMap<[u8; N], u32>, k: usize) -> Vec<([u8; N], u32)> {
    let mut entries: Vec<([u8; N], u32)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(k);
    entries
}

fn combination_bonus<const N: usize>(top: &[([u8; N], u32)]) -> [f64; POOL_SIZE] {
    let mut bonus = [0.0f64; POOL_SIZE];
    for (combo, count) in top {
        for &n in combo {
            bonus[n as usize] += *count as f64;
        }
    }
    normalize_by_max(&mut bonus);
    bonus
}

/// Données de test synthétiques, pas des tirages réels :
/// le tirage i contient (i..i+20) mod 100.
pub fn shifted_window(n: usize) -> Vec<[u8; DRAW_SIZE]> {
    (0..n)
        .map(|i| {
            let mut draw = [0u8; DRAW_SIZE];
            for (k, slot) in draw.iter_mut().enumerate() {
                *slot = ((i + k) % POOL_SIZE) as u8;
            }
            draw
        })
        .collect()
}
