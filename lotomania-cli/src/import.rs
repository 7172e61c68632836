use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use lotomania_db::rusqlite::Connection;
use std::path::Path;
use tracing::{info, warn};

use lotomania_db::db::{UpsertOutcome, upsert_draw};
use lotomania_db::models::{Draw, DRAW_SIZE, validate_numbers};

pub fn parse_date(raw: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y")
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Ligne "<concours> - <jj/mm/aaaa> - <20 numéros>".
/// None si la ligne n'a pas cette forme (elle est ignorée).
pub fn parse_line(line: &str) -> Option<Result<Draw>> {
    let mut parts = line.splitn(3, '-');
    let contest_raw = parts.next()?.trim();
    let date_raw = parts.next()?.trim();
    let numbers_raw = parts.next()?.trim();

    if contest_raw.is_empty() || !contest_raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if date_raw.is_empty() || !date_raw.chars().all(|c| c.is_ascii_digit() || c == '/') {
        return None;
    }
    if numbers_raw.is_empty() {
        return None;
    }

    Some(parse_fields(contest_raw, date_raw, numbers_raw))
}

fn parse_fields(contest_raw: &str, date_raw: &str, numbers_raw: &str) -> Result<Draw> {
    let contest: u32 = contest_raw
        .parse()
        .with_context(|| format!("Concours illisible: '{}'", contest_raw))?;
    let date = parse_date(date_raw)?;

    let numbers: Vec<u8> = numbers_raw
        .split_whitespace()
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("Concours {} : numéro illisible '{}'", contest, s))
        })
        .collect::<Result<_>>()?;
    if numbers.len() != DRAW_SIZE {
        bail!("Concours {} : {} numéros attendus, {} reçus", contest, DRAW_SIZE, numbers.len());
    }
    let numbers = validate_numbers(&numbers)
        .with_context(|| format!("Concours {} invalide", contest))?;

    Ok(Draw { contest, date, numbers })
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub total_lines: u32,
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_text(conn: &Connection, text: &str) -> Result<ImportResult> {
    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        result.total_lines += 1;
        match parse_line(line) {
            None => result.skipped += 1,
            Some(Err(e)) => {
                warn!(line = i + 1, "{:#}", e);
                result.errors += 1;
            }
            Some(Ok(draw)) => match upsert_draw(&tx, &draw) {
                Ok(UpsertOutcome::Inserted) => result.inserted += 1,
                Ok(UpsertOutcome::Updated) => result.updated += 1,
                Ok(UpsertOutcome::Unchanged) => result.unchanged += 1,
                Err(e) => {
                    warn!(line = i + 1, contest = draw.contest, "{:#}", e);
                    result.errors += 1;
                }
            },
        }
    }

    tx.commit().context("Échec du commit")?;
    info!(
        inserted = result.inserted,
        updated = result.updated,
        errors = result.errors,
        "import terminé"
    );
    Ok(result)
}

pub fn import_file(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    import_text(conn, &text)
}
