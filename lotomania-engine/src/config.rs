use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::POOL_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub frequency: f64,
    pub recency: f64,
    pub cycle: f64,
    pub pair: f64,
    pub triple: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            frequency: 0.35,
            recency: 0.15,
            cycle: 0.20,
            pair: 0.20,
            triple: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [self.frequency, self.recency, self.cycle, self.pair, self.triple]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Paramètres d'une génération. Les valeurs par défaut correspondent à la Lotomania
/// (grilles de 50 numéros, noyau de 11).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub lottery: String,
    pub count: usize,
    pub ticket_size: usize,
    pub nucleus_size: usize,
    pub diversity_overlap_max: usize,
    pub weights: ScoringWeights,
    /// Écart (en tirages) autour duquel le bonus de cycle est maximal.
    pub cycle_target_gap: f64,
    pub cycle_sigma: f64,
    pub top_pairs: usize,
    pub top_triples: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            lottery: "lotomania".to_string(),
            count: 1,
            ticket_size: 50,
            nucleus_size: 11,
            diversity_overlap_max: 30,
            weights: ScoringWeights::default(),
            // 100 numéros / 20 tirés : un numéro revient en moyenne tous les 5 concours
            cycle_target_gap: 5.0,
            cycle_sigma: 2.0,
            top_pairs: 30,
            top_triples: 30,
        }
    }
}

impl GenerationConfig {
    pub fn with_count(count: usize) -> Self {
        Self { count, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.count < 1 {
            return Err(EngineError::invalid("count doit être >= 1"));
        }
        if self.ticket_size > POOL_SIZE {
            return Err(EngineError::invalid(format!(
                "ticket_size {} dépasse le nombre de numéros ({})",
                self.ticket_size, POOL_SIZE
            )));
        }
        if self.nucleus_size >= self.ticket_size {
            return Err(EngineError::invalid(format!(
                "nucleus_size {} doit être < ticket_size {}",
                self.nucleus_size, self.ticket_size
            )));
        }
        let named = [
            ("frequency", self.weights.frequency),
            ("recency", self.weights.recency),
            ("cycle", self.weights.cycle),
            ("pair", self.weights.pair),
            ("triple", self.weights.triple),
        ];
        for (name, w) in named {
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::invalid(format!("poids {} invalide : {}", name, w)));
            }
        }
        // chaque poids fini ne suffit pas : la somme borne le score d'un numéro
        let total = self.weights.sum();
        if !total.is_finite() {
            return Err(EngineError::invalid(format!(
                "somme des poids non finie : {}",
                total
            )));
        }
        if !self.cycle_target_gap.is_finite() {
            return Err(EngineError::invalid("cycle_target_gap doit être fini"));
        }
        if !self.cycle_sigma.is_finite() || self.cycle_sigma <= 0.0 {
            return Err(EngineError::invalid(format!(
                "cycle_sigma doit être > 0 (reçu {})",
                self.cycle_sigma
            )));
        }
        Ok(())
    }
}

pub fn save_config(config: &GenerationConfig, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &Path) -> anyhow::Result<GenerationConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: GenerationConfig = serde_json::from_str(&json)?;
    Ok(config)
}
