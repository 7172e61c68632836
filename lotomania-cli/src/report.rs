use anyhow::{Context, Result, bail};
use lotomania_db::rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use lotomania_db::db::{fetch_window_numbers, latest_contest};
use lotomania_db::models::format_numbers_csv;
use lotomania_engine::{Generation, GenerationConfig, generate};

/// Historique minimal exigé avant de générer (politique de l'appelant, pas du moteur).
pub const MIN_HISTORY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub user_id: u64,
    pub base_draw_id: String,
    pub window: u32,
    pub config: GenerationConfig,
    pub generation: Generation,
}

/// Charge la fenêtre se terminant au dernier concours et lance le moteur.
pub fn build_report(conn: &Connection, user_id: u64, window: u32, config: GenerationConfig) -> Result<GenerationReport> {
    let Some(latest) = latest_contest(conn)? else {
        bail!("Base vide. Lancez d'abord : lotomania import");
    };
    let history = fetch_window_numbers(conn, Some(latest), window)?;
    if history.len() < MIN_HISTORY {
        bail!(
            "Trop peu de tirages en base ({}, minimum {}). Importez d'abord les concours.",
            history.len(),
            MIN_HISTORY
        );
    }

    let base_draw_id = latest.to_string();
    let generation = generate(user_id, &base_draw_id, &history, &config)?;
    info!(user_id, base = %base_draw_id, tickets = generation.tickets.len(), "grilles générées");

    Ok(GenerationReport {
        user_id,
        base_draw_id,
        window,
        config,
        generation,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub checked: usize,
    /// Index (base 1) des grilles dont la grille ou l'audit diffère.
    pub mismatches: Vec<usize>,
}

impl Verification {
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Recalcule un rapport à partir de la même fenêtre et compare grille par grille.
pub fn verify_report(conn: &Connection, report: &GenerationReport) -> Result<Verification> {
    let contest: u32 = report
        .base_draw_id
        .parse()
        .with_context(|| format!("Concours de base illisible: '{}'", report.base_draw_id))?;
    let history = fetch_window_numbers(conn, Some(contest), report.window)?;
    let replay = generate(report.user_id, &report.base_draw_id, &history, &report.config)?;

    let expected = &report.generation;
    let checked = expected.tickets.len().max(replay.tickets.len());
    let mismatches = (0..checked)
        .filter(|&i| {
            expected.tickets.get(i) != replay.tickets.get(i)
                || expected.audits.get(i) != replay.audits.get(i)
        })
        .map(|i| i + 1)
        .collect();

    Ok(Verification { checked, mismatches })
}

pub fn save_report(report: &GenerationReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

pub fn load_report(path: &Path) -> Result<GenerationReport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {:?}", path))?;
    let report: GenerationReport = serde_json::from_str(&json)
        .with_context(|| format!("Rapport invalide {:?}", path))?;
    Ok(report)
}

pub fn export_csv(generation: &Generation, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("Impossible de créer {:?}", path))?;
    writer.write_record(["index", "numbers"])?;
    for (i, ticket) in generation.tickets.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), format_numbers_csv(ticket)])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotomania_db::db::{migrate, upsert_draw};
    use lotomania_db::models::{Draw, DRAW_SIZE};

    fn seeded_db(n: u32) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        for c in 1..=n {
            let mut numbers = [0u8; DRAW_SIZE];
            for (k, slot) in numbers.iter_mut().enumerate() {
                *slot = ((c as usize * 7 + k * 3) % 100) as u8;
            }
            numbers.sort_unstable();
            let draw = Draw { contest: 1000 + c, date: format!("2024-01-{:02}", c % 28 + 1), numbers };
            upsert_draw(&conn, &draw).unwrap();
        }
        conn
    }

    #[test]
    fn test_storage_and_engine_agree_on_pool() {
        assert_eq!(lotomania_db::models::POOL_SIZE, lotomania_engine::POOL_SIZE);
        assert_eq!(DRAW_SIZE, lotomania_engine::DRAW_SIZE);
    }

    #[test]
    fn test_build_report_uses_latest_contest() {
        let conn = seeded_db(30);
        let report = build_report(&conn, 1, 60, GenerationConfig::with_count(3)).unwrap();
        assert_eq!(report.base_draw_id, "1030");
        assert_eq!(report.generation.tickets.len(), 3);
        assert_eq!(report.generation.audits[0].window, 30);
    }

    #[test]
    fn test_build_report_requires_minimum_history() {
        let conn = seeded_db(10);
        let err = build_report(&conn, 1, 60, GenerationConfig::with_count(1)).unwrap_err();
        assert!(err.to_string().contains("Trop peu"));

        let empty = seeded_db(0);
        assert!(build_report(&empty, 1, 60, GenerationConfig::with_count(1)).is_err());
    }

    #[test]
    fn test_verify_report_roundtrip() {
        let conn = seeded_db(40);
        let report = build_report(&conn, 9, 25, GenerationConfig::with_count(4)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rapport.json");
        save_report(&report, &path).unwrap();
        let loaded = load_report(&path).unwrap();
        assert_eq!(loaded, report);

        let verification = verify_report(&conn, &loaded).unwrap();
        assert_eq!(verification.checked, 4);
        assert!(verification.is_ok());
    }

    #[test]
    fn test_verify_report_survives_newer_draws() {
        let conn = seeded_db(30);
        let report = build_report(&conn, 2, 60, GenerationConfig::with_count(2)).unwrap();

        let numbers = lotomania_db::models::validate_numbers(&(40..60u8).collect::<Vec<_>>()).unwrap();
        upsert_draw(&conn, &Draw { contest: 2000, date: "2024-03-01".to_string(), numbers }).unwrap();

        assert!(verify_report(&conn, &report).unwrap().is_ok());
    }

    #[test]
    fn test_verify_report_detects_tampering() {
        let conn = seeded_db(30);
        let mut report = build_report(&conn, 2, 60, GenerationConfig::with_count(2)).unwrap();
        report.generation.tickets[1][0] = 99;

        let verification = verify_report(&conn, &report).unwrap();
        assert_eq!(verification.mismatches, vec![2]);
    }

    #[test]
    fn test_export_csv() {
        let conn = seeded_db(25);
        let report = build_report(&conn, 3, 60, GenerationConfig::with_count(2)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grilles.csv");
        export_csv(&report.generation, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "index;numbers");
        assert!(lines[1].starts_with("1;"));
        assert_eq!(lines[1].split(';').nth(1).unwrap().split(',').count(), 50);
    }
}
