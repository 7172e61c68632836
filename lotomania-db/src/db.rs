use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::models::{parse_numbers_csv, validate_numbers, Draw, DRAW_SIZE};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    contest       INTEGER PRIMARY KEY,
    date          TEXT NOT NULL,
    numbers_csv   TEXT NOT NULL
);
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

pub fn db_path() -> PathBuf {
    if let Some(custom) = std::env::var_os("LOTOMANIA_DB") {
        return PathBuf::from(custom);
    }
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotomania.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Un concours déjà présent est écrasé par la nouvelle version.
pub fn upsert_draw(conn: &Connection, draw: &Draw) -> Result<UpsertOutcome> {
    let csv = draw.numbers_csv();
    let existing: Option<(String, String)> = conn
        .query_row(
            "SELECT date, numbers_csv FROM draws WHERE contest = ?1",
            [draw.contest],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .context("Échec de la lecture du concours")?;

    match existing {
        None => {
            conn.execute(
                "INSERT INTO draws (contest, date, numbers_csv) VALUES (?1, ?2, ?3)",
                rusqlite::params![draw.contest, draw.date, csv],
            ).context("Échec de l'insertion")?;
            Ok(UpsertOutcome::Inserted)
        }
        Some((date, numbers)) if date == draw.date && numbers == csv => Ok(UpsertOutcome::Unchanged),
        Some(_) => {
            conn.execute(
                "UPDATE draws SET date = ?2, numbers_csv = ?3 WHERE contest = ?1",
                rusqlite::params![draw.contest, draw.date, csv],
            ).context("Échec de la mise à jour")?;
            Ok(UpsertOutcome::Updated)
        }
    }
}

fn row_to_draw(contest: u32, date: String, numbers_csv: &str) -> Result<Draw> {
    let numbers = parse_numbers_csv(numbers_csv)
        .with_context(|| format!("Concours {} : numéros illisibles", contest))?;
    let numbers = validate_numbers(&numbers)
        .with_context(|| format!("Concours {} : tirage invalide", contest))?;
    Ok(Draw { contest, date, numbers })
}

pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    fetch_window(conn, None, limit)
}

/// Les `limit` derniers concours jusqu'à `up_to_contest` inclus, du plus récent au plus ancien.
pub fn fetch_window(conn: &Connection, up_to_contest: Option<u32>, limit: u32) -> Result<Vec<Draw>> {
    let upper = up_to_contest.unwrap_or(u32::MAX);
    let mut stmt = conn.prepare(
        "SELECT contest, date, numbers_csv
         FROM draws WHERE contest <= ?1 ORDER BY contest DESC LIMIT ?2"
    )?;
    let rows = stmt.query_map(rusqlite::params![upper, limit], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?.collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(contest, date, csv)| row_to_draw(contest, date, &csv))
        .collect()
}

pub fn fetch_window_numbers(conn: &Connection, up_to_contest: Option<u32>, limit: u32) -> Result<Vec<[u8; DRAW_SIZE]>> {
    Ok(fetch_window(conn, up_to_contest, limit)?
        .into_iter()
        .map(|d| d.numbers)
        .collect())
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_contest(conn: &Connection) -> Result<Option<u32>> {
    let latest: Option<u32> = conn.query_row("SELECT MAX(contest) FROM draws", [], |row| row.get(0))?;
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(contest: u32, date: &str, start: u8) -> Draw {
        let mut numbers = [0u8; DRAW_SIZE];
        for (i, n) in numbers.iter_mut().enumerate() {
            *n = start + i as u8;
        }
        Draw { contest, date: date.to_string(), numbers }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = memory_db();
        assert_eq!(count_draws(&conn).unwrap(), 0);
        assert_eq!(latest_contest(&conn).unwrap(), None);

        let outcome = upsert_draw(&conn, &test_draw(2600, "2024-06-01", 0)).unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
        assert_eq!(latest_contest(&conn).unwrap(), Some(2600));
    }

    #[test]
    fn test_upsert_updates_and_unchanged() {
        let conn = memory_db();

        upsert_draw(&conn, &test_draw(1, "2024-01-01", 0)).unwrap();
        let same = upsert_draw(&conn, &test_draw(1, "2024-01-01", 0)).unwrap();
        assert_eq!(same, UpsertOutcome::Unchanged);

        let changed = upsert_draw(&conn, &test_draw(1, "2024-01-01", 10)).unwrap();
        assert_eq!(changed, UpsertOutcome::Updated);
        assert_eq!(count_draws(&conn).unwrap(), 1);

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws[0].numbers[0], 10);
    }

    #[test]
    fn test_fetch_order() {
        let conn = memory_db();

        upsert_draw(&conn, &test_draw(1, "2024-01-01", 0)).unwrap();
        upsert_draw(&conn, &test_draw(3, "2024-01-05", 20)).unwrap();
        upsert_draw(&conn, &test_draw(2, "2024-01-03", 40)).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].contest, 3);
        assert_eq!(draws[1].contest, 2);
        assert_eq!(draws[2].contest, 1);
    }

    #[test]
    fn test_fetch_window_up_to_contest() {
        let conn = memory_db();
        for c in 1..=10 {
            upsert_draw(&conn, &test_draw(c, "2024-01-01", c as u8)).unwrap();
        }

        let window = fetch_window(&conn, Some(7), 3).unwrap();
        let contests: Vec<u32> = window.iter().map(|d| d.contest).collect();
        assert_eq!(contests, vec![7, 6, 5]);

        let numbers = fetch_window_numbers(&conn, Some(7), 3).unwrap();
        assert_eq!(numbers[0][0], 7);
    }
}
