use anyhow::{bail, Result};
use cesta_core::rest::RestRemote;
use cesta_core::{
    Category, Controller, LoadOutcome, MemRemote, Query, RemoteStore, SqliteCache,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;

mod config;
mod theme;

#[derive(Parser)]
#[command(name = "cesta", version, about = "Shared shopping list CLI")]
struct Cli {
    /// Optional cache database path (overrides settings)
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick or inspect the active profile
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Add an item to the list
    Add {
        name: String,
        #[arg(long, default_value_t = Category::Outros)]
        category: Category,
    },
    /// Show the list (incomplete first, newest first)
    List {
        /// Only items not yet checked off
        #[arg(long)]
        pending: bool,
        /// Case-insensitive substring match on the name
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Check or uncheck an item
    Toggle { id: String },
    /// Increase quantity by one
    Inc { id: String },
    /// Decrease quantity by one (never below 1)
    Dec { id: String },
    /// Rename an item
    Rename { id: String, name: String },
    /// Delete an item (completed items must be unchecked first)
    Delete { id: String },
    /// Full reload from the remote table
    Sync,
    /// Follow remote changes, reloading on every notification
    Watch,
}

#[derive(Subcommand)]
enum UserAction {
    /// Select the active user and store their theme
    Set { name: String },
    /// Print the active user and theme
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = config::load_settings();

    let db_path = cli
        .db
        .clone()
        .or_else(|| settings.cache.db_path.clone())
        .unwrap_or_else(config::default_db_path);
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let cache = SqliteCache::new(&db_path)?;

    let remote: Arc<dyn RemoteStore> = match &settings.rest {
        Some(rest) => {
            let poll = Duration::from_millis(rest.poll_ms.unwrap_or(2000));
            Arc::new(RestRemote::new(
                &rest.url,
                &rest.api_key,
                rest.table.as_deref(),
                poll,
            )?)
        }
        None => Arc::new(MemRemote::new()),
    };

    let mut ctl = Controller::new(Arc::clone(&remote), cache);
    ctl.load_profile();
    if ctl.state().current_user.is_empty() {
        // First run without a saved profile: fall back to the OS user.
        let user = whoami::username();
        ctl.set_user(&user, None);
    }

    match cli.command {
        Commands::User { action } => match action {
            UserAction::Set { name } => {
                let name = name.trim();
                if name.is_empty() {
                    bail!("user name must not be empty");
                }
                let theme = theme::theme_for(name);
                ctl.set_user(name, Some(theme::to_value(&theme)));
                println!("user set to {}", name);
            }
            UserAction::Show => {
                println!("user: {}", ctl.state().current_user);
                match &ctl.state().theme {
                    Some(t) => println!(
                        "theme: {}",
                        t.get("name").and_then(|n| n.as_str()).unwrap_or("custom")
                    ),
                    None => println!("theme: none"),
                }
            }
        },
        Commands::Add { name, category } => {
            ctl.load_cached();
            if let Some(item) = ctl.add(&name, category) {
                println!("added {}", item.id);
            }
            ctl.flush();
        }
        Commands::List {
            pending,
            search,
            json,
        } => {
            ctl.load_cached();
            let items = ctl.view(&Query {
                contains: search,
                pending_only: pending,
            });
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for i in &items {
                    let created = i.created_at.format(&Rfc3339).unwrap_or_default();
                    println!(
                        "{}\t{}\t{}x\t{}\t{}\t{}",
                        i.id,
                        if i.completed { "x" } else { " " },
                        i.quantity,
                        i.category,
                        created,
                        i.name
                    );
                }
            }
        }
        Commands::Toggle { id } => {
            ctl.load_cached();
            ctl.toggle(&id);
            ctl.flush();
            println!("toggled {}", id);
        }
        Commands::Inc { id } => {
            ctl.load_cached();
            ctl.change_quantity(&id, 1);
            ctl.flush();
            println!("updated {}", id);
        }
        Commands::Dec { id } => {
            ctl.load_cached();
            ctl.change_quantity(&id, -1);
            ctl.flush();
            println!("updated {}", id);
        }
        Commands::Rename { id, name } => {
            ctl.load_cached();
            ctl.rename(&id, &name);
            ctl.flush();
            println!("renamed {}", id);
        }
        Commands::Delete { id } => {
            ctl.load_cached();
            ctl.delete(&id)?;
            ctl.flush();
            println!("deleted {}", id);
        }
        Commands::Sync => {
            if settings.rest.is_none() {
                bail!(
                    "no remote configured; add a [rest] section to {}",
                    config::settings_path().display()
                );
            }
            report_load(ctl.load());
        }
        Commands::Watch => {
            if settings.rest.is_none() {
                bail!(
                    "no remote configured; add a [rest] section to {}",
                    config::settings_path().display()
                );
            }
            let (tx, rx) = mpsc::channel();
            let sub = remote.subscribe(Box::new(move || {
                let _ = tx.send(());
            }))?;
            report_load(ctl.load());
            eprintln!("watching for remote changes (ctrl-c to quit)");
            for _ in rx {
                report_load(ctl.load());
            }
            sub.unsubscribe();
        }
    }

    Ok(())
}

fn report_load(outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Fresh { count } => println!("synced {} items", count),
        LoadOutcome::CacheFallback { count } => {
            eprintln!(
                "warning: remote unreachable; using cached list ({} items)",
                count
            );
        }
    }
}
