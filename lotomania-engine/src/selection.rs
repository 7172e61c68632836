use crate::POOL_SIZE;

/// Numéros d'une grille, triés par ordre croissant.
pub type Ticket = Vec<u8>;

/// Décalage appliqué au point de départ à chaque nouvel essai.
pub const DIVERSITY_STRIDE: usize = 17;
pub const DIVERSITY_MAX_RETRIES: usize = 20;

/// Noyau : les `nucleus_size` premiers numéros du classement, triés.
pub fn pick_nucleus(ranking: &[u8], nucleus_size: usize) -> Vec<u8> {
    let mut nucleus: Vec<u8> = ranking.iter().take(nucleus_size).copied().collect();
    nucleus.sort_unstable();
    nucleus
}

/// Classement restant une fois le noyau retiré (ordre conservé).
pub fn periphery_ranking(ranking: &[u8], nucleus: &[u8]) -> Vec<u8> {
    ranking.iter().copied().filter(|n| !nucleus.contains(n)).collect()
}

pub fn initial_start(seed: u64, ranked_len: usize) -> usize {
    if ranked_len == 0 {
        return 0;
    }
    (seed % ranked_len as u64) as usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ticket: Ticket,
    /// Numéros ajoutés par le complément « plus petits absents ».
    pub padded: usize,
}

/// Noyau + périphérie lue circulairement depuis `start`, complétée si besoin
/// par les plus petits numéros absents pour atteindre exactement `ticket_size`.
pub fn build_ticket(nucleus: &[u8], ranked: &[u8], start: usize, ticket_size: usize) -> Candidate {
    let mut in_ticket = [false; POOL_SIZE];
    let mut ticket: Ticket = Vec::with_capacity(ticket_size);
    for &n in nucleus {
        if (n as usize) < POOL_SIZE && !in_ticket[n as usize] {
            in_ticket[n as usize] = true;
            ticket.push(n);
        }
    }

    let need = ticket_size.saturating_sub(ticket.len());
    let mut collected = 0;
    for step in 0..ranked.len() {
        if collected >= need {
            break;
        }
        let n = ranked[(start + step) % ranked.len()];
        let idx = n as usize;
        if idx < POOL_SIZE && !in_ticket[idx] {
            in_ticket[idx] = true;
            ticket.push(n);
            collected += 1;
        }
    }

    let mut padded = 0;
    for n in 0..POOL_SIZE {
        if ticket.len() >= ticket_size {
            break;
        }
        if !in_ticket[n] {
            in_ticket[n] = true;
            ticket.push(n as u8);
            padded += 1;
        }
    }

    ticket.sort_unstable();
    Candidate { ticket, padded }
}

/// Nombre de numéros communs à deux grilles triées.
pub fn overlap(a: &[u8], b: &[u8]) -> usize {
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    common
}

pub fn max_overlap(accepted: &[Ticket], ticket: &[u8]) -> usize {
    accepted.iter().map(|t| overlap(t, ticket)).max().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub ticket: Ticket,
    pub start: usize,
    pub retries: usize,
    pub satisfied: bool,
    pub max_overlap: usize,
    pub padded: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DiversityRule<'a> {
    pub nucleus: &'a [u8],
    pub ranked: &'a [u8],
    pub ticket_size: usize,
    pub overlap_max: usize,
}

/// Étape du pli sur les grilles déjà acceptées : reconstruit le candidat en décalant
/// le départ de DIVERSITY_STRIDE tant qu'un recouvrement dépasse la borne, au plus
/// DIVERSITY_MAX_RETRIES fois. Au-delà, le dernier candidat est accepté tel quel.
pub fn enforce_diversity(accepted: &[Ticket], rule: &DiversityRule<'_>, initial: usize) -> Placement {
    let len = rule.ranked.len().max(1);
    let mut start = initial;
    let mut retries = 0;

    loop {
        let candidate = build_ticket(rule.nucleus, rule.ranked, start, rule.ticket_size);
        let worst = max_overlap(accepted, &candidate.ticket);
        let satisfied = worst <= rule.overlap_max;

        if satisfied || retries >= DIVERSITY_MAX_RETRIES {
            return Placement {
                ticket: candidate.ticket,
                start,
                retries,
                satisfied,
                max_overlap: worst,
                padded: candidate.padded,
            };
        }

        retries += 1;
        start = (start + DIVERSITY_STRIDE) % len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending() -> Vec<u8> {
        (0..100u8).collect()
    }

    #[test]
    fn test_pick_nucleus_sorted_top() {
        let ranking = vec![42, 7, 99, 3, 0, 1];
        assert_eq!(pick_nucleus(&ranking, 3), vec![7, 42, 99]);
        assert!(pick_nucleus(&ranking, 0).is_empty());
    }

    #[test]
    fn test_periphery_excludes_nucleus_and_keeps_order() {
        let ranking = vec![42, 7, 99, 3, 0, 1];
        let ranked = periphery_ranking(&ranking, &[7, 42]);
        assert_eq!(ranked, vec![99, 3, 0, 1]);
    }

    #[test]
    fn test_initial_start_modulo() {
        assert_eq!(initial_start(95, 89), 6);
        assert_eq!(initial_start(12345, 0), 0);
    }

    #[test]
    fn test_build_ticket_wraps_around() {
        let nucleus = vec![0, 1];
        let ranked: Vec<u8> = (2..100u8).collect();
        let candidate = build_ticket(&nucleus, &ranked, 96, 6);
        // départ sur 98, puis 99, 2, 3
        assert_eq!(candidate.ticket, vec![0, 1, 2, 3, 98, 99]);
        assert_eq!(candidate.padded, 0);
    }

    #[test]
    fn test_build_ticket_pads_with_smallest_missing() {
        let candidate = build_ticket(&[0, 1], &[50, 60], 0, 6);
        assert_eq!(candidate.ticket, vec![0, 1, 2, 3, 50, 60]);
        assert_eq!(candidate.padded, 2);
    }

    #[test]
    fn test_build_ticket_exact_size_full_pool() {
        let nucleus: Vec<u8> = (0..11u8).collect();
        let ranked = periphery_ranking(&ascending(), &nucleus);
        let candidate = build_ticket(&nucleus, &ranked, 40, 100);
        assert_eq!(candidate.ticket, ascending());
    }

    #[test]
    fn test_overlap_counts_common_numbers() {
        assert_eq!(overlap(&[1, 2, 3, 10], &[2, 3, 4, 10, 11]), 3);
        assert_eq!(overlap(&[1, 2], &[3, 4]), 0);
        assert_eq!(overlap(&[], &[3, 4]), 0);
    }

    #[test]
    fn test_diversity_first_ticket_accepted_as_is() {
        let ranked = ascending();
        let rule = DiversityRule { nucleus: &[], ranked: &ranked, ticket_size: 10, overlap_max: 0 };
        let placement = enforce_diversity(&[], &rule, 5);
        assert_eq!(placement.ticket, (5..15u8).collect::<Vec<_>>());
        assert_eq!(placement.retries, 0);
        assert!(placement.satisfied);
    }

    #[test]
    fn test_diversity_shifts_start_by_stride() {
        let ranked = ascending();
        let rule = DiversityRule { nucleus: &[], ranked: &ranked, ticket_size: 10, overlap_max: 0 };
        let accepted = vec![(0..10u8).collect::<Vec<_>>()];
        let placement = enforce_diversity(&accepted, &rule, 5);
        assert_eq!(placement.retries, 1);
        assert_eq!(placement.start, 5 + DIVERSITY_STRIDE);
        assert_eq!(placement.ticket, (22..32u8).collect::<Vec<_>>());
        assert!(placement.satisfied);
        assert_eq!(placement.max_overlap, 0);
    }

    #[test]
    fn test_diversity_exhaustion_is_best_effort() {
        let ranked = ascending();
        // deux grilles de 60 numéros partagent toujours au moins 20 numéros
        let rule = DiversityRule { nucleus: &[], ranked: &ranked, ticket_size: 60, overlap_max: 0 };
        let accepted = vec![(0..60u8).collect::<Vec<_>>()];
        let placement = enforce_diversity(&accepted, &rule, 0);
        assert!(!placement.satisfied);
        assert_eq!(placement.retries, DIVERSITY_MAX_RETRIES);
        assert_eq!(placement.ticket.len(), 60);
        assert!(placement.max_overlap >= 20);
        assert_eq!(placement.start, (DIVERSITY_STRIDE * DIVERSITY_MAX_RETRIES) % 100);
    }
}
