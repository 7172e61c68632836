use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::{record_audit, AuditRecord, TicketTrace};
use crate::config::GenerationConfig;
use crate::error::EngineError;
use crate::score::NumberScores;
use crate::seed::{stable_seed, ticket_salt};
use crate::selection::{
    enforce_diversity, initial_start, periphery_ranking, pick_nucleus, DiversityRule, Ticket,
};
use crate::stats::{compute_history_stats, HistoryStats};

#[derive(Debug, Clone)]
pub struct Analysis {
    pub stats: HistoryStats,
    pub scores: NumberScores,
    pub ranking: Vec<u8>,
}

/// Statistiques + scores + classement, calculés une fois par appel.
pub fn analyze<D: AsRef<[u8]>>(history: &[D], config: &GenerationConfig) -> Analysis {
    let stats = compute_history_stats(history, config);
    let scores = NumberScores::from_stats(&stats, &config.weights);
    let ranking = scores.ranking();
    Analysis { stats, scores, ranking }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub tickets: Vec<Ticket>,
    pub audits: Vec<AuditRecord>,
}

impl Generation {
    pub fn nucleus(&self) -> &[u8] {
        self.audits.first().map(|a| a.nucleus.as_slice()).unwrap_or(&[])
    }
}

/// Génère `config.count` grilles pour un utilisateur à partir de l'historique
/// (history[0] = tirage le plus récent). Mêmes entrées, même sortie.
pub fn generate<D: AsRef<[u8]>>(
    user_id: u64,
    base_draw_id: &str,
    history: &[D],
    config: &GenerationConfig,
) -> Result<Generation, EngineError> {
    config.validate()?;

    let analysis = analyze(history, config);
    let nucleus = pick_nucleus(&analysis.ranking, config.nucleus_size);
    let ranked = periphery_ranking(&analysis.ranking, &nucleus);
    debug!(
        window = analysis.stats.window_size,
        nucleus = ?nucleus,
        ranked = ranked.len(),
        "classement calculé"
    );

    let rule = DiversityRule {
        nucleus: &nucleus,
        ranked: &ranked,
        ticket_size: config.ticket_size,
        overlap_max: config.diversity_overlap_max,
    };

    let mut tickets: Vec<Ticket> = Vec::with_capacity(config.count);
    let mut audits = Vec::with_capacity(config.count);

    for ticket_index in 1..=config.count {
        let seed = stable_seed(user_id, base_draw_id, &ticket_salt(ticket_index));
        let start = initial_start(seed, ranked.len());
        let placement = enforce_diversity(&tickets, &rule, start);

        if !placement.satisfied {
            warn!(
                ticket_index,
                retries = placement.retries,
                max_overlap = placement.max_overlap,
                bound = config.diversity_overlap_max,
                "borne de recouvrement non atteinte, dernier candidat conservé"
            );
        } else {
            debug!(ticket_index, seed, start, retries = placement.retries, "grille acceptée");
        }

        let trace = TicketTrace {
            ticket_index,
            seed,
            start_offset: start,
            placement: &placement,
        };
        audits.push(record_audit(config, base_draw_id, analysis.stats.window_size, &nucleus, &trace));
        tickets.push(placement.ticket);
    }

    Ok(Generation { tickets, audits })
}
