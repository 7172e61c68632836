use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use crate::report::{GenerationReport, Verification};
use lotomania_db::models::{Draw, POOL_SIZE};
use lotomania_engine::Analysis;

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Concours", "Date", "Numéros"]);
    for draw in draws {
        table.add_row(vec![
            draw.contest.to_string(),
            draw.date.clone(),
            format_numbers(&draw.numbers),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Lignes lues       : {}", result.total_lines);
    println!("  Insérés           : {}", result.inserted);
    println!("  Mis à jour        : {}", result.updated);
    println!("  Inchangés         : {}", result.unchanged);
    println!("  Lignes ignorées   : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(analysis: &Analysis, top: usize) {
    let stats = &analysis.stats;
    println!("\n📊 Statistiques sur les {} derniers tirages\n", stats.window_size);

    let mut table = new_table(vec![
        "Rang", "Numéro", "Sorties", "Retard", "Fréq.", "Récence", "Cycle", "Paires", "Triplets", "Score",
    ]);
    for (rank, &n) in analysis.ranking.iter().enumerate().take(top.min(POOL_SIZE)) {
        let i = n as usize;
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(format!("{:02}", n)),
            Cell::new(stats.counts[i]),
            Cell::new(stats.gaps[i]),
            Cell::new(format!("{:.3}", stats.frequency[i])),
            Cell::new(format!("{:.3}", stats.recency[i])),
            Cell::new(format!("{:.3}", stats.cycle[i])),
            Cell::new(format!("{:.3}", stats.pair_bonus[i])),
            Cell::new(format!("{:.3}", stats.triple_bonus[i])),
            Cell::new(format!("{:.4}", analysis.scores.get(n))).fg(Color::Green),
        ]);
    }
    println!("{table}");

    if !stats.top_pairs.is_empty() {
        println!("\n── Paires les plus fréquentes ──");
        let mut table = new_table(vec!["Paire", "Occurrences"]);
        for (pair, count) in stats.top_pairs.iter().take(10) {
            table.add_row(vec![format_numbers(pair), count.to_string()]);
        }
        println!("{table}");
    }

    if !stats.top_triples.is_empty() {
        println!("\n── Triplets les plus fréquents ──");
        let mut table = new_table(vec!["Triplet", "Occurrences"]);
        for (triple, count) in stats.top_triples.iter().take(10) {
            table.add_row(vec![format_numbers(triple), count.to_string()]);
        }
        println!("{table}");
    }
}

pub fn display_report(report: &GenerationReport) {
    let generation = &report.generation;
    println!(
        "\n🎲 {} grille(s) — concours de base {}, utilisateur {}\n",
        generation.tickets.len(),
        report.base_draw_id,
        report.user_id
    );
    println!("Noyau : {}\n", format_numbers(generation.nucleus()));

    let mut table = new_table(vec!["#", "Numéros", "Graine", "Départ", "Essais", "Recouvrement"]);
    for (ticket, audit) in generation.tickets.iter().zip(&generation.audits) {
        let overlap_color = if audit.overlap_satisfied { Color::White } else { Color::Red };
        table.add_row(vec![
            Cell::new(audit.ticket_index),
            Cell::new(format_numbers(ticket)),
            Cell::new(audit.seed),
            Cell::new(audit.final_offset),
            Cell::new(audit.retries),
            Cell::new(format!("{} / {}", audit.max_overlap, audit.diversity_overlap_max)).fg(overlap_color),
        ]);
    }
    println!("{table}");
}

pub fn display_audit_notes(report: &GenerationReport) {
    for audit in &report.generation.audits {
        println!("\nGrille {} :", audit.ticket_index);
        for note in &audit.notes {
            println!("  - {}", note);
        }
    }
}

pub fn display_verification(verification: &Verification) {
    if verification.is_ok() {
        println!("✅ {} grille(s) recalculée(s) à l'identique.", verification.checked);
    } else {
        println!(
            "❌ {} grille(s) sur {} ne correspondent pas : {:?}",
            verification.mismatches.len(),
            verification.checked,
            verification.mismatches
        );
    }
}
