//! Timesheet command-line client

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use timesheet_app::{
    AnalyticsView, AppContext, ConfigManager, EntryManager, ProjectManager, SummaryView,
    TimerEngine, entry::format_entry_line, timer::TimerEventType,
};
use timesheet_core::{
    analytics::Window,
    models::{MANUAL_PROJECT, Project},
    storage::init_data_dir,
    timer::format_seconds,
};

#[derive(Parser, Debug)]
#[command(name = "timesheet")]
#[command(about = "Log hours against projects and report on them", long_about = None)]
struct Cli {
    /// Log level for the terminal (defaults to the configured level)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in with it
    Register {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign in
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Log hours for the signed-in user
    Log {
        /// Project id or name; omit for a manual entry
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long, default_value = "")]
        task: String,
        #[arg(long, default_value = "1")]
        hours: String,
        /// Work date as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Run the timer until Ctrl-C, then log the elapsed hours
    Timer {
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long, default_value = "")]
        task: String,
    },
    /// List entries, newest first
    Entries {
        /// Every user's entries instead of your own
        #[arg(long)]
        all: bool,
    },
    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Hours per project over a trailing window
    Analytics {
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Your totals for today and this week
    Summary,
    /// Export the window's entries as CSV
    Export {
        #[arg(short, long)]
        days: Option<u32>,
        /// Target directory (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create a project
    Add {
        name: String,
        #[arg(short, long)]
        code: Option<String>,
    },
    /// List projects
    List,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the current configuration
    Show,
    /// Set the default report window in days
    SetWindow { days: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager =
        Arc::new(ConfigManager::new().context("Failed to load configuration")?);
    let config = config_manager.get().await;

    let data_dir = init_data_dir(config.store.data_dir.as_deref())
        .context("Failed to prepare the data directory")?;
    let log_level = cli.log_level.clone().unwrap_or(config.log_level);
    init_logging(&log_level, &data_dir)?;

    tracing::info!("Timesheet starting, data directory {}", data_dir.display());

    let ctx = AppContext::open(config_manager)
        .await
        .context("Failed to open the timesheet store")?;

    run(cli.command, &ctx).await
}

fn init_logging(level: &str, data_dir: &Path) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt::writer::MakeWriterExt};

    let terminal_level: tracing::Level = level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", level))?;
    let filter_level = terminal_level.max(tracing::Level::DEBUG);

    let log_file_path = data_dir.join("timesheet.log");
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("Failed to open {}", log_file_path.display()))?;

    // Terminal gets the chosen level, the file always gets DEBUG.
    let stderr_writer = std::io::stderr.with_max_level(terminal_level);
    let file_writer = log_file.with_max_level(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(stderr_writer.and(file_writer))
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(filter_level.as_str().to_lowercase())),
        )
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run(command: Command, ctx: &AppContext) -> Result<()> {
    match command {
        Command::Register { email, password } => {
            let identity = ctx.identity()?.register(&email, &password).await?;
            println!("Registered and signed in as {}", identity.display_name);
        }
        Command::Login { email, password } => {
            let identity = ctx.identity()?.sign_in(&email, &password).await?;
            println!("Signed in as {}", identity.display_name);
        }
        Command::Logout => {
            ctx.identity()?.sign_out().await?;
            println!("Signed out");
        }
        Command::Whoami => match ctx.identity()?.current() {
            Some(identity) => println!("{} ({})", identity.display_name, identity.user_id),
            None => println!("Not signed in"),
        },
        Command::Log {
            project,
            task,
            hours,
            date,
        } => {
            let entries = EntryManager::new(ctx)?;
            let project = resolve_project(ctx, project.as_deref())?;

            let mut draft = entries
                .draft(Local::now().date_naive())
                .with_project(project)
                .with_task(task);
            draft.hours = hours;
            if let Some(date) = date {
                draft.date = date;
            }

            let id = entries.log(draft).await?;
            println!("Logged entry {}", id);
        }
        Command::Timer { project, task } => run_timer(ctx, project.as_deref(), task).await?,
        Command::Entries { all } => {
            let entries = EntryManager::new(ctx)?;
            let snapshot = if all {
                entries.all_entries().current()
            } else {
                entries.my_entries()?.current()
            };

            if snapshot.is_empty() {
                println!("No entries yet");
            }
            for entry in snapshot.iter() {
                if all {
                    println!("{}  {}", format_entry_line(entry), entry.user_name);
                } else {
                    println!("{}", format_entry_line(entry));
                }
            }
        }
        Command::Projects { command } => {
            let projects = ProjectManager::new(ctx)?;
            match command {
                ProjectCommand::Add { name, code } => {
                    let id = projects.add(&name, code).await?;
                    println!("Created project {}", id);
                }
                ProjectCommand::List => {
                    let list = projects.list();
                    if list.is_empty() {
                        println!("No projects yet");
                    }
                    for project in list.iter() {
                        println!(
                            "{}  {:<30}  {}",
                            project.id,
                            project.name,
                            project.code.as_deref().unwrap_or("")
                        );
                    }
                }
            }
        }
        Command::Analytics { days } => {
            let window = resolve_window(ctx, days).await?;
            let now = Local::now();
            let mut view = AnalyticsView::new(window);
            view.replace_snapshot(ctx.store()?.entries_snapshot(), &now);

            println!("Hours by project, last {} days", window.days());
            if view.totals().is_empty() {
                println!("No entries in range");
            }
            for total in view.totals() {
                println!("{:<30}  {:>8.2}", total.name, total.rounded());
            }
        }
        Command::Summary => {
            let identity = ctx.identity()?.require()?;
            let mut view = SummaryView::new(identity.user_id);
            view.replace_snapshot(&ctx.store()?.entries_snapshot(), &Local::now());

            let summary = view.summary();
            println!("Today:     {:>8.2} h", summary.today_total);
            println!("This week: {:>8.2} h", summary.week_total);
        }
        Command::Export { days, out } => {
            let window = resolve_window(ctx, days).await?;
            let now = Local::now();
            let mut view = AnalyticsView::new(window);
            view.replace_snapshot(ctx.store()?.entries_snapshot(), &now);

            let export = view.export(&now)?;
            let dir = match out {
                Some(dir) => dir,
                None => std::env::current_dir().context("Failed to read current directory")?,
            };
            let path = export.save_in(&dir)?;
            println!("Wrote {} ({})", path.display(), export.mime_type);
        }
        Command::Config { command } => {
            let config = ctx.config();
            match command {
                ConfigCommand::Show => {
                    println!("{}", serde_json::to_string_pretty(&config.get().await)?);
                }
                ConfigCommand::SetWindow { days } => {
                    let updated = config.set_default_window(days).await?;
                    println!(
                        "Default window set to {} days",
                        updated.analytics.default_window_days
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_timer(ctx: &AppContext, project: Option<&str>, task: String) -> Result<()> {
    let entries = EntryManager::new(ctx)?;
    let identity = ctx.identity()?.require()?;
    let project = resolve_project(ctx, project)?;
    let label = project
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| MANUAL_PROJECT.to_string());

    let engine = TimerEngine::new();
    let mut events = engine.subscribe();
    engine.start().await;
    println!(
        "Timing '{}' for {}. Press Ctrl-C to stop and log.",
        label, identity.display_name
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let TimerEventType::Tick { elapsed_seconds, .. } = event.event_type {
                        print!("\r{}", format_seconds(elapsed_seconds));
                        std::io::stdout().flush()?;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    engine.stop().await?;
    println!();

    let draft = entries
        .draft(Local::now().date_naive())
        .with_project(project)
        .with_task(task);
    let draft = engine.to_draft_hours(draft).await;
    let hours = draft.hours.clone();

    let id = entries.log(draft).await?;
    println!("Logged {} hours as entry {}", hours, id);
    Ok(())
}

fn resolve_project(ctx: &AppContext, key: Option<&str>) -> Result<Option<Project>> {
    let Some(key) = key else {
        return Ok(None);
    };

    let project = ProjectManager::new(ctx)?
        .resolve(key)
        .with_context(|| format!("No project with id or name '{}'", key))?;
    Ok(Some(project))
}

async fn resolve_window(ctx: &AppContext, days: Option<u32>) -> Result<Window> {
    let window = match days {
        Some(days) => Window::new(days)?,
        None => ctx.config().default_window().await?,
    };
    Ok(window)
}
