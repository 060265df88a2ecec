// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Vitrine: cultural-heritage archive viewer
//!
//! Command-line entry point. `serve` runs the web UI; the other commands
//! browse the seeded archive from the terminal.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use vitrine::config::AppConfig;
use vitrine::detail::{CardView, DetailView};
use vitrine::download::{download_filename, Downloader};
use vitrine::filter::FilterSpec;
use vitrine::model::ArtifactId;
use vitrine::session::{Role, Session, User};
use vitrine::store::{sample_artifacts, Archive};
use vitrine::web::CollectionSummary;
use vitrine::{Result, VitrineError};

/// Vitrine CLI - cultural-heritage archive viewer
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Browse and serve a cultural-heritage artifact archive", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Role to browse as
    #[arg(long, global = true, default_value = "viewer", value_parser = ["admin", "viewer"])]
    role: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web UI
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List collections visible to the role
    Collections,

    /// List artifacts, optionally scoped and filtered
    List {
        /// Only artifacts in this collection (tag or manual id)
        #[arg(long)]
        collection: Option<String>,

        /// Match any of these tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Match any of these MIME types
        #[arg(long)]
        file_type: Vec<String>,

        /// Match any of these uploaders
        #[arg(short, long)]
        uploader: Vec<String>,

        /// Uploaded on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Uploaded on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show an artifact's details
    Show {
        /// Artifact id
        id: i64,
    },

    /// Download an artifact's image
    Download {
        /// Artifact id
        id: i64,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Initialize a new Vitrine project
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("Vitrine v{}", env!("CARGO_PKG_VERSION"));
    }

    let config = AppConfig::load(&cli.config)?;
    let role: Role = cli.role.parse()?;
    let json = cli.format == "json";

    match cli.command {
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        Some(Commands::Collections) => run_collections(&config, role, json),
        Some(Commands::List { collection, tag, file_type, uploader, from, to }) => {
            let filters = FilterSpec::default()
                .with_tags(tag)
                .with_file_types(file_type)
                .with_uploaders(uploader)
                .with_date_range(
                    vitrine::filter::parse_date(from.as_deref())?,
                    vitrine::filter::parse_date(to.as_deref())?,
                );
            run_list(&config, role, collection, filters, json)
        }
        Some(Commands::Show { id }) => run_show(&config, role, ArtifactId(id), json),
        Some(Commands::Download { id, output }) => run_download(&config, role, ArtifactId(id), output).await,
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        Some(Commands::Init { dir, force }) => run_init(dir, force),
        None => run_serve(config, None, None).await,
    }
}

/// Session for the local operator over the configured seed archive
fn local_session(config: &AppConfig, role: Role) -> Result<Session> {
    let seed = Archive::load(config.archive.seed_path.as_deref())?;
    let user = User {
        username: std::env::var("USER").unwrap_or_else(|_| "operator".to_string()),
        role,
    };
    Ok(Session::for_user(user, &seed))
}

async fn run_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }
    config.validate()?;

    let seed = Archive::load(config.archive.seed_path.as_deref())?;
    info!("Serving {} seed artifacts", seed.artifacts().len());
    vitrine::web::start_server(config, seed).await
}

fn run_collections(config: &AppConfig, role: Role, json: bool) -> Result<()> {
    let session = local_session(config, role)?;
    let summaries: Vec<CollectionSummary> =
        session.collections().iter().map(CollectionSummary::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Collections ({}):", summaries.len());
    for c in &summaries {
        println!("  [{}] {} - {} ({})", c.kind, c.name, c.item_count_label, c.id);
    }
    Ok(())
}

fn run_list(
    config: &AppConfig,
    role: Role,
    collection: Option<String>,
    filters: FilterSpec,
    json: bool,
) -> Result<()> {
    let mut session = local_session(config, role)?;
    if let Some(id) = collection {
        session.open_collection(&id)?;
    }
    session.set_filters(filters);

    let permissions = session.permissions();
    let cards: Vec<CardView> = session
        .filtered_artifacts()
        .into_iter()
        .map(|a| CardView::build(a, &permissions))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    for card in &cards {
        let more = if card.more_tags > 0 {
            format!(" +{} more", card.more_tags)
        } else {
            String::new()
        };
        println!(
            "{:>14}  {}  {}  [{}{}]",
            card.id,
            card.upload_date,
            card.title,
            card.tags.join(", "),
            more
        );
    }
    println!("\n{} artifacts", cards.len());
    Ok(())
}

fn run_show(config: &AppConfig, role: Role, id: ArtifactId, json: bool) -> Result<()> {
    let session = local_session(config, role)?;
    let permissions = session.permissions();
    let view = DetailView::build(session.artifact(id)?, &permissions);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", view.title);
    println!("{}", "=".repeat(view.title.chars().count()));
    if let Some(banner) = &view.privacy_banner {
        println!("Privacy: {}", banner.level);
    }
    if let Some(consent) = &view.consent_status {
        if let Some(irb) = &consent.irb_approval {
            println!("IRB approved: {}", irb);
        }
        if let Some(date) = &consent.form_signed_on {
            println!("Consent signed: {}", date);
        }
    }
    if let Some(subject) = &view.subject {
        let marker = if subject.pseudonym_note { " (pseudonym)" } else { "" };
        println!("Subject: {}{}", subject.name, marker);
    }
    for (label, value) in [
        ("Context", view.context),
        ("Description", view.description),
        ("Function", view.function),
        ("Meaning", view.meaning),
        ("Transcript", view.transcript),
    ] {
        if let Some(text) = value {
            println!("\n{}:\n  {}", label, text);
        }
    }
    println!("\nTags: {}", view.tags.join(", "));
    println!(
        "Uploaded {} by {}",
        view.technical.upload_date,
        view.technical.uploader.unwrap_or("unknown")
    );
    println!("Download as: {}", view.download_filename);
    Ok(())
}

async fn run_download(config: &AppConfig, role: Role, id: ArtifactId, output: Option<PathBuf>) -> Result<()> {
    let session = local_session(config, role)?;
    let artifact = session.artifact(id)?;
    let dir = output.unwrap_or_else(|| PathBuf::from(&config.download.output_dir));

    let downloader = Downloader::from_config(&config.download)?;
    if !downloader.download(artifact, &dir).await {
        return Err(VitrineError::Download(format!("Artifact {} could not be downloaded", id)));
    }
    println!(
        "Downloaded to {:?}",
        dir.join(download_filename(&artifact.title, &artifact.file_type))
    );
    Ok(())
}

fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Web: {}", config.bind_addr());
            println!(
                "  Seed: {}",
                config.archive.seed_path.as_deref().unwrap_or("(built-in samples)")
            );
            println!("  Assets: {}", config.download.asset_root);
        }
    }

    Ok(())
}

/// Write a config, an editable seed file and the asset directory
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(VitrineError::Config(
            "config.json already exists. Use --force to overwrite".to_string(),
        ));
    }

    let assets = target.join("public").join("assets").join("artifacts");
    std::fs::create_dir_all(&assets)?;

    let seed_path = target.join("seed.json");
    if seed_path.exists() && !force {
        warn!("Keeping existing {:?}", seed_path);
    } else {
        std::fs::write(&seed_path, serde_json::to_string_pretty(&sample_artifacts())?)?;
    }

    let mut config = AppConfig::default();
    config.archive.seed_path = Some(seed_path.to_string_lossy().to_string());
    config.download.asset_root = target.join("public").to_string_lossy().to_string();
    config.save(&config_path)?;

    println!("Vitrine initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - config.json");
    println!("  - seed.json");
    println!("  - public/assets/artifacts/");
    println!("\nNext steps:");
    println!("  1. Put artifact images under public/assets/artifacts/");
    println!("  2. Start the web UI: vitrine serve");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["vitrine"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.role, "viewer");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_list_command() {
        let cli = Cli::try_parse_from([
            "vitrine", "--role", "admin", "list", "--tag", "animals", "--tag", "nature", "--from", "2024-01-01",
        ])
        .unwrap();

        assert_eq!(cli.role, "admin");
        match cli.command {
            Some(Commands::List { tag, from, collection, .. }) => {
                assert_eq!(tag, vec!["animals", "nature"]);
                assert_eq!(from.as_deref(), Some("2024-01-01"));
                assert!(collection.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["vitrine", "--role", "curator", "collections"]).is_err());
    }

    #[test]
    fn test_cli_serve_overrides() {
        let cli = Cli::try_parse_from(["vitrine", "serve", "-H", "0.0.0.0", "-p", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_writes_project() {
        let dir = tempfile::tempdir().unwrap();
        run_init(Some(dir.path().to_path_buf()), false).unwrap();

        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        let seed = Archive::load(config.archive.seed_path.as_deref()).unwrap();
        assert_eq!(seed.artifacts().len(), sample_artifacts().len());
        assert!(dir.path().join("public/assets/artifacts").is_dir());

        assert!(run_init(Some(dir.path().to_path_buf()), false).is_err());
        assert!(run_init(Some(dir.path().to_path_buf()), true).is_ok());
    }

    #[tokio::test]
    async fn test_download_command() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("public/assets/artifacts");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("notre-dame.png"), b"png").unwrap();

        let mut config = AppConfig::default();
        config.download.asset_root = dir.path().join("public").to_string_lossy().to_string();
        let out = dir.path().join("out");

        run_download(&config, Role::Viewer, ArtifactId(4), Some(out.clone())).await.unwrap();
        assert_eq!(std::fs::read(out.join("notre-dame-cathedral.png")).unwrap(), b"png");

        // Artifact 1 has no file under this asset root
        assert!(matches!(
            run_download(&config, Role::Viewer, ArtifactId(1), Some(out)).await,
            Err(VitrineError::Download(_))
        ));
    }

    #[test]
    fn test_local_session_respects_role() {
        let config = AppConfig::default();
        let viewer = local_session(&config, Role::Viewer).unwrap();
        let admin = local_session(&config, Role::Admin).unwrap();
        assert!(viewer.visible_artifacts().len() < admin.visible_artifacts().len());
    }
}
