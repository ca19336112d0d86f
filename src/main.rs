//! confboard: conference leaderboard command line.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use confboard::{
    auth::{Authenticator, hash_password},
    card::CardRenderer,
    config::Config,
    entry::{EntryForm, EntryPatch},
    persist::sqlite::SqliteSlots,
    rank::format_time,
    runtime::handle::{LeaderboardHandle, open_leaderboard},
    settings::ConferenceSettings,
    views::{AdminView, Download, LeaderboardPage, PublicView},
};

#[derive(Parser)]
#[command(name = "confboard")]
#[command(about = "Conference leaderboard: rankings, exports and share cards")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "CONFBOARD_CONFIG", default_value = "confboard.toml")]
    config: PathBuf,

    /// SQLite database (overrides config file)
    #[arg(long, env = "CONFBOARD_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the ranked leaderboard
    Show {
        /// Keep entries whose name or organization contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Print the leaderboard and reprint on every change until Ctrl-C
    Watch {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Start an admin session
    Login {
        #[arg(long, env = "CONFBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the admin session
    Logout,
    /// Add an entry
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        score: String,
        /// Completion time in seconds
        #[arg(long)]
        time: String,
    },
    /// Patch an entry
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        score: Option<u64>,
        #[arg(long)]
        time: Option<u64>,
    },
    /// Delete an entry
    Delete { id: String },
    /// Show or change conference settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Write a CSV or PDF export
    Export {
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Render an entry's share card
    Card {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print share text and links for an entry
    Share { id: String },
    /// Print an Argon2 hash for the [admin] password_hash setting
    HashPassword { password: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        conference_name: Option<String>,
        #[arg(long)]
        village_name: Option<String>,
        #[arg(long)]
        conference_date: Option<String>,
        #[arg(long)]
        conference_url: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Pdf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("confboard=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Command::HashPassword { password } = &cli.command {
        println!("{}", hash_password(password)?);
        return Ok(());
    }

    let mut config = Config::load(&cli.config)?;
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }
    info!(db = %config.storage.db_path.display(), "opening leaderboard");

    let slots = SqliteSlots::open(&config.storage.db_path)
        .with_context(|| format!("opening {}", config.storage.db_path.display()))?;
    let handle = open_leaderboard(Box::new(slots), config.runtime.clone())?;

    let result = run(cli.command, &handle, &config).await;
    handle.shutdown().await?;
    result
}

async fn run(command: Command, handle: &LeaderboardHandle, config: &Config) -> anyhow::Result<()> {
    let auth = Authenticator::new(handle.clone(), config.admin.clone());

    match command {
        Command::Show { search } => {
            let page = PublicView::new(handle.clone()).snapshot(&search).await?;
            print_page(&page);
        }
        Command::Watch { search } => {
            let mut view = PublicView::new(handle.clone());
            print_page(&view.snapshot(&search).await?);
            loop {
                tokio::select! {
                    changed = view.next_change() => {
                        changed?;
                        println!();
                        print_page(&view.snapshot(&search).await?);
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Login { password } => {
            auth.login(&password).await?;
            println!("logged in");
        }
        Command::Logout => {
            auth.logout().await?;
            println!("logged out");
        }
        Command::Add {
            name,
            org,
            score,
            time,
        } => {
            let admin = admin_view(&auth, handle).await?;
            let entry = admin
                .add_entry(EntryForm::new(name, org, score, time))
                .await?;
            println!("{}", entry.id);
        }
        Command::Update {
            id,
            name,
            org,
            score,
            time,
        } => {
            let admin = admin_view(&auth, handle).await?;
            let patch = EntryPatch {
                name,
                organization: org,
                score,
                time,
            };
            if !admin.update_entry(&id, patch).await? {
                anyhow::bail!("entry {id} not found or nothing to change");
            }
        }
        Command::Delete { id } => {
            let admin = admin_view(&auth, handle).await?;
            if !admin.delete_entry(&id).await? {
                println!("entry {id} was already gone");
            }
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => print_settings(&handle.settings().await?),
            SettingsAction::Set {
                conference_name,
                village_name,
                conference_date,
                conference_url,
            } => {
                let admin = admin_view(&auth, handle).await?;
                let mut settings = admin.settings().await?;
                if let Some(v) = conference_name {
                    settings.conference_name = v;
                }
                if let Some(v) = village_name {
                    settings.village_name = v;
                }
                if let Some(v) = conference_date {
                    settings.conference_date = v;
                }
                if let Some(v) = conference_url {
                    settings.conference_url = v;
                }
                admin.save_settings(settings.clone()).await?;
                print_settings(&settings);
            }
        },
        Command::Export { format, out } => {
            let admin = admin_view(&auth, handle).await?;
            let download = match format {
                ExportFormat::Csv => admin.export_csv().await?,
                ExportFormat::Pdf => admin.export_pdf().await?,
            };
            write_download(&out, &download)?;
        }
        Command::Card { id, out } => {
            let view = PublicView::new(handle.clone())
                .with_renderer(CardRenderer::from_config(&config.card)?);
            let card = view.share_card(&id).await?;
            if !card.card.has_qr {
                eprintln!("warning: card rendered without QR code");
            }
            write_download(
                &out,
                &Download {
                    file_name: card.file_name,
                    bytes: card.card.png,
                },
            )?;
        }
        Command::Share { id } => {
            let links = PublicView::new(handle.clone()).share_links(&id).await?;
            println!("{}", links.text);
            println!("twitter:  {}", links.twitter);
            println!("facebook: {}", links.facebook);
            println!("linkedin: {}", links.linkedin);
        }
        Command::HashPassword { .. } => {}
    }
    Ok(())
}

async fn admin_view(auth: &Authenticator, handle: &LeaderboardHandle) -> anyhow::Result<AdminView> {
    let session = auth
        .require()
        .await
        .context("admin commands need `confboard login` first")?;
    Ok(AdminView::new(handle.clone(), session))
}

fn write_download(dir: &Path, download: &Download) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(&download.file_name);
    std::fs::write(&path, &download.bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn print_settings(settings: &ConferenceSettings) {
    println!("{}", settings.conference_name);
    println!("{}", settings.village_name);
    println!("{} | {}", settings.conference_date, settings.conference_url);
}

fn print_page(page: &LeaderboardPage) {
    print_settings(&page.settings);
    println!();
    println!(
        "{:>4}  {:<24} {:<30} {:>8} {:>10}  {}",
        "Rank", "Name", "University/Company", "Score", "Time", "Id"
    );
    for row in &page.rows {
        println!(
            "{:>4}  {:<24} {:<30} {:>8} {:>10}  {}",
            format!("#{}", row.rank),
            row.entry.name,
            row.entry.organization,
            row.entry.score,
            format_time(row.entry.time),
            row.entry.id,
        );
    }
    if page.rows.is_empty() {
        println!("(no entries)");
    }

    if let Some(max) = page.chart.iter().map(|b| b.score).max().filter(|m| *m > 0) {
        println!();
        for bar in &page.chart {
            let width = (bar.score.saturating_mul(40) / max) as usize;
            println!("{:<12} {} {}", bar.label, "#".repeat(width), bar.score);
        }
    }
}
