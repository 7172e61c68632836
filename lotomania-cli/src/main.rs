mod display;
mod import;
mod report;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lotomania_db::db::{count_draws, db_path, fetch_last_draws, fetch_window_numbers, latest_contest, migrate, open_db};
use lotomania_db::rusqlite::Connection;
use lotomania_engine::config::{load_config, save_config};
use lotomania_engine::{GenerationConfig, analyze};
use crate::display::{
    display_audit_notes, display_draws, display_import_summary, display_report, display_stats,
    display_verification,
};
use crate::report::{build_report, export_csv, load_report, save_report, verify_report};

#[derive(Parser)]
#[command(name = "lotomania", about = "Générateur déterministe de grilles Lotomania")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer des concours depuis un fichier texte ("concours - jj/mm/aaaa - 20 numéros")
    Import {
        /// Chemin vers le fichier
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers concours
    List {
        /// Nombre de concours à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher fréquences, retards et scores par numéro
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "60")]
        window: u32,

        /// Nombre de numéros affichés
        #[arg(short, long, default_value = "100")]
        top: usize,

        /// Fichier de configuration du moteur (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Générer des grilles pour un utilisateur
    Generate {
        /// Identifiant de l'utilisateur (entre dans la graine)
        #[arg(short, long)]
        user: u64,

        /// Nombre de grilles (1-50)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=50))]
        count: Option<u32>,

        /// Fenêtre d'analyse (20-200 tirages)
        #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u32).range(20..=200))]
        window: u32,

        /// Recouvrement maximal entre deux grilles
        #[arg(long)]
        overlap: Option<usize>,

        /// Fichier de configuration du moteur (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enregistrer le rapport complet (grilles + audits) en JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exporter les grilles en CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Afficher les notes d'audit de chaque grille
        #[arg(long)]
        notes: bool,
    },

    /// Recalculer un rapport et vérifier qu'il est identique
    Verify {
        /// Rapport JSON produit par `generate --output`
        #[arg(short, long)]
        report: PathBuf,
    },

    /// Écrire la configuration par défaut du moteur
    Config {
        /// Fichier de sortie (sinon affichage)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Config { output } = &cli.command {
        return cmd_config(output.as_deref());
    }

    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window, top, config } => cmd_stats(&conn, window, top, config.as_deref()),
        Command::Generate { user, count, window, overlap, config, output, csv, notes } => {
            let options = GenerateOptions { user, count, window, overlap, config, output, csv, notes };
            cmd_generate(&conn, &options)
        }
        Command::Verify { report } => cmd_verify(&conn, &report),
        Command::Config { .. } => Ok(()),
    }
}

fn engine_config(path: Option<&std::path::Path>) -> Result<GenerationConfig> {
    match path {
        Some(p) => load_config(p).with_context(|| format!("Configuration illisible {:?}", p)),
        None => Ok(GenerationConfig::default()),
    }
}

fn cmd_import(conn: &Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_file(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotomania import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, window: u32, top: usize, config: Option<&std::path::Path>) -> Result<()> {
    let Some(latest) = latest_contest(conn)? else {
        println!("Base vide. Lancez d'abord : lotomania import");
        return Ok(());
    };
    let config = engine_config(config)?;
    config.validate()?;
    let history = fetch_window_numbers(conn, Some(latest), window)?;
    let analysis = analyze(&history, &config);
    display_stats(&analysis, top);
    Ok(())
}

struct GenerateOptions {
    user: u64,
    count: Option<u32>,
    window: u32,
    overlap: Option<usize>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    csv: Option<PathBuf>,
    notes: bool,
}

fn cmd_generate(conn: &Connection, options: &GenerateOptions) -> Result<()> {
    let mut config = engine_config(options.config.as_deref())?;
    if let Some(count) = options.count {
        config.count = count as usize;
    }
    if let Some(overlap) = options.overlap {
        config.diversity_overlap_max = overlap;
    }

    let report = build_report(conn, options.user, options.window, config)?;
    display_report(&report);
    if options.notes {
        display_audit_notes(&report);
    }

    if let Some(path) = &options.output {
        save_report(&report, path)?;
        println!("\nRapport enregistré : {}", path.display());
    }
    if let Some(path) = &options.csv {
        export_csv(&report.generation, path)?;
        println!("Grilles exportées : {}", path.display());
    }
    Ok(())
}

fn cmd_verify(conn: &Connection, path: &PathBuf) -> Result<()> {
    let report = load_report(path)?;
    let verification = verify_report(conn, &report)?;
    display_verification(&verification);
    if !verification.is_ok() {
        bail!("Le rapport {:?} ne correspond plus à l'historique", path);
    }
    Ok(())
}

fn cmd_config(output: Option<&std::path::Path>) -> Result<()> {
    let config = GenerationConfig::default();
    match output {
        Some(path) => {
            save_config(&config, path)?;
            println!("Configuration écrite : {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}
