use serde::{Deserialize, Serialize};

use crate::config::{GenerationConfig, ScoringWeights};
use crate::selection::{Placement, DIVERSITY_MAX_RETRIES, DIVERSITY_STRIDE};
use crate::stats::UNSEEN_GAP_PENALTY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringMetadata {
    pub weights: ScoringWeights,
    pub cycle_target_gap: f64,
    pub cycle_sigma: f64,
    pub top_pairs: usize,
    pub top_triples: usize,
    pub unseen_gap_penalty: usize,
    pub diversity_stride: usize,
    pub diversity_max_retries: usize,
}

impl ScoringMetadata {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            weights: config.weights,
            cycle_target_gap: config.cycle_target_gap,
            cycle_sigma: config.cycle_sigma,
            top_pairs: config.top_pairs,
            top_triples: config.top_triples,
            unseen_gap_penalty: UNSEEN_GAP_PENALTY,
            diversity_stride: DIVERSITY_STRIDE,
            diversity_max_retries: DIVERSITY_MAX_RETRIES,
        }
    }
}

/// Trace d'une grille : tout ce qu'il faut pour la recalculer à l'identique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub lottery: String,
    pub base_draw_id: String,
    pub window: usize,
    pub nucleus: Vec<u8>,
    pub nucleus_rule: String,
    pub diversity_overlap_max: usize,
    pub ticket_index: usize,
    pub seed: u64,
    pub start_offset: usize,
    pub final_offset: usize,
    pub retries: usize,
    pub overlap_satisfied: bool,
    pub max_overlap: usize,
    pub padded: usize,
    pub scoring: ScoringMetadata,
    pub notes: Vec<String>,
}

pub struct TicketTrace<'a> {
    pub ticket_index: usize,
    pub seed: u64,
    pub start_offset: usize,
    pub placement: &'a Placement,
}

pub fn record_audit(
    config: &GenerationConfig,
    base_draw_id: &str,
    window: usize,
    nucleus: &[u8],
    trace: &TicketTrace<'_>,
) -> AuditRecord {
    let placement = trace.placement;
    AuditRecord {
        lottery: config.lottery.clone(),
        base_draw_id: base_draw_id.to_string(),
        window,
        nucleus: nucleus.to_vec(),
        nucleus_rule: format!(
            "top-{} par score (fréquence, récence, cycle, paires, triplets)",
            config.nucleus_size
        ),
        diversity_overlap_max: config.diversity_overlap_max,
        ticket_index: trace.ticket_index,
        seed: trace.seed,
        start_offset: trace.start_offset,
        final_offset: placement.start,
        retries: placement.retries,
        overlap_satisfied: placement.satisfied,
        max_overlap: placement.max_overlap,
        padded: placement.padded,
        scoring: ScoringMetadata::from_config(config),
        notes: build_notes(config, window, trace),
    }
}

fn build_notes(config: &GenerationConfig, window: usize, trace: &TicketTrace<'_>) -> Vec<String> {
    let placement = trace.placement;
    let mut notes = vec![
        "moteur déterministe : user_id + base_draw_id + ticket_index".to_string(),
        format!(
            "noyau fixe de {} numéros + périphérie mobile de {} numéros",
            config.nucleus_size,
            config.ticket_size - config.nucleus_size
        ),
        format!(
            "graine sha256 tronquée, départ {} dans le classement restant",
            trace.start_offset
        ),
        format!(
            "fenêtre : {} tirage(s) effectivement utilisés (taille demandée non reprise ici)",
            window
        ),
    ];

    if window == 0 {
        notes.push("historique vide : classement par ordre croissant des numéros".to_string());
    }

    if placement.retries > 0 && placement.satisfied {
        notes.push(format!(
            "recouvrement ramené à {} (borne {}) après {} décalage(s) de {}",
            placement.max_overlap, config.diversity_overlap_max, placement.retries, DIVERSITY_STRIDE
        ));
    } else if !placement.satisfied {
        notes.push(format!(
            "borne de recouvrement {} non atteinte après {} essais : dernier candidat accepté (recouvrement {})",
            config.diversity_overlap_max, placement.retries, placement.max_overlap
        ));
    }

    if placement.padded > 0 {
        notes.push(format!(
            "{} numéro(s) complété(s) par les plus petits absents",
            placement.padded
        ));
    }

    notes
}
