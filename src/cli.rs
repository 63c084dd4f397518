use crate::config::{self, Backend, Settings};
use crate::dashboard::{MutationOutcome, PublicationController};
use crate::store::{self, Document, PaperStore};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "paper-tracker",
    version,
    about = "Track publications and their journal-review status, with optional TUI"
)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Remote store backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// API base URL (skips origin-based resolution)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Origin the dashboard is served from; localhost selects the dev API
    #[arg(long)]
    pub origin: Option<String>,

    /// Print JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print a text listing and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print an HTML table with styled status badges and exit (no TUI)
    #[arg(long, conflicts_with_all = ["json", "text"])]
    pub html: bool,

    /// Only show papers whose title or status contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Number of papers the progress indicator counts towards
    #[arg(long)]
    pub goal: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Add a paper
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        status: String,
    },
    /// Edit a paper's title and/or status
    Edit {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a paper
    Delete {
        #[arg(long)]
        id: u64,
    },
    /// Follow the document store and print the list whenever it changes
    Watch {
        /// Poll interval (defaults to the configured one)
        #[arg(long)]
        interval: Option<humantime::Duration>,
    },
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        self.command.is_none() && !self.json && !self.text && !self.html
    }
}

/// Resolve settings from file/env, then apply CLI overrides.
pub fn build_settings(args: &Cli) -> Result<Settings> {
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(b) = args.backend {
        settings.backend = b;
    }
    if let Some(base) = args.api_base.clone() {
        settings.api_base = Some(base);
    }
    if let Some(origin) = args.origin.clone() {
        settings.origin = origin;
    }
    if let Some(goal) = args.goal {
        settings.paper_goal = goal;
    }
    Ok(settings)
}

pub async fn run(args: Cli, settings: Settings) -> Result<()> {
    let store = store::build_store(&settings).context("configure store")?;
    let controller = PublicationController::new(store, settings.paper_goal);

    match args.command.clone() {
        Some(Command::Watch { interval }) => return run_watch(&settings, interval).await,
        Some(cmd) => {
            return run_mutation(controller, cmd, &args, &mut std::io::stdout()).await
        }
        None => {}
    }

    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, controller).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_listing(controller, &args).await;
        }
    }

    run_listing(controller, &args).await
}

async fn load<S: PaperStore>(controller: &mut PublicationController<S>) -> Result<()> {
    if !controller.refresh().await {
        anyhow::bail!("could not fetch papers from the store");
    }
    Ok(())
}

async fn run_listing<S: PaperStore>(mut controller: PublicationController<S>, args: &Cli) -> Result<()> {
    load(&mut controller).await?;
    if let Some(term) = args.search.as_deref() {
        controller.set_search_term(term);
    }
    write_listing(&mut std::io::stdout().lock(), &controller, args)
}

fn write_listing<S: PaperStore>(
    out: &mut impl Write,
    controller: &PublicationController<S>,
    args: &Cli,
) -> Result<()> {
    let state = controller.state();
    let visible = controller.visible_papers();
    if args.html {
        let html = crate::text_summary::build_html_table(
            &state.snapshot(),
            &visible,
            controller.progress(),
        );
        out.write_all(html.as_bytes())?;
    } else if args.json {
        let data = crate::model::DashboardData {
            papers: visible.into_iter().cloned().collect(),
            researcher: state.researcher.clone(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        let summary =
            crate::text_summary::build_text_summary(&state.snapshot(), &visible, controller.progress());
        for line in summary.lines {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

async fn run_mutation<S: PaperStore>(
    mut controller: PublicationController<S>,
    cmd: Command,
    args: &Cli,
    out: &mut impl Write,
) -> Result<()> {
    load(&mut controller).await?;
    if let Some(term) = args.search.as_deref() {
        controller.set_search_term(term);
    }
    let (action, outcome) = match cmd {
        Command::Add { title, status } => ("add", controller.add(&title, &status).await),
        Command::Edit { id, title, status } => {
            let Some(current) = controller.state().papers.iter().find(|p| p.id == id).cloned()
            else {
                anyhow::bail!("no paper with id {id}");
            };
            let title = title.unwrap_or(current.title);
            let status = status.unwrap_or(current.status);
            ("edit", controller.edit(id, &title, &status).await)
        }
        Command::Delete { id } => ("delete", controller.delete(id).await),
        Command::Watch { .. } => anyhow::bail!("watch does not modify papers"),
    };
    match outcome {
        MutationOutcome::Synced => {
            tracing::info!(action, "change saved");
            write_listing(out, &controller, args)
        }
        MutationOutcome::Rejected => anyhow::bail!("{action} rejected: title must not be empty"),
        MutationOutcome::NoMatch => anyhow::bail!("{action}: no matching paper"),
        MutationOutcome::PushFailed => anyhow::bail!("{action}: the store did not accept the change"),
    }
}

async fn run_watch(settings: &Settings, interval: Option<humantime::Duration>) -> Result<()> {
    if settings.backend != Backend::Firestore {
        anyhow::bail!("watch needs the firestore backend (use --backend firestore)");
    }
    let client = Arc::new(store::build_document_client(settings).context("configure document store")?);
    let interval = interval
        .map(std::time::Duration::from)
        .unwrap_or(settings.firestore.poll_interval);
    let mut sub = client.subscribe(
        settings.firestore.papers_collection.clone(),
        "id".into(),
        interval,
    );

    loop {
        tokio::select! {
            snapshot = sub.next() => {
                let Some(docs) = snapshot else { break };
                print_snapshot(&docs)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn print_snapshot(docs: &[Document]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let stamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into());
    writeln!(out, "== {stamp}: {} paper(s) ==", docs.len())?;
    for doc in docs {
        match store::paper_from_document(doc) {
            Ok(p) => writeln!(out, "#{}  {}  [{}]", p.id, p.title, p.status)?,
            Err(e) => tracing::warn!(error = %e, "skipping malformed document"),
        }
    }
    Ok(())
}
