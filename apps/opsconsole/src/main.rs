mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{Gateway, HttpGateway};
use controller::{
    view::markup, ActionHandle, Console, Dispatcher, FallbackPolicy, Markup, PageView, Settled,
    TransportPolicy, ViewEvent,
};
use futures::future::join_all;
use shared::domain::{ElementId, HistoryFormat, PlaybookId};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, DEFAULT_SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(name = "opsconsole", about = "Drive a playbook automation backend from the terminal")]
struct Args {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    /// Report transport failures and incomplete replies instead of leaving the page as is.
    #[arg(long)]
    surface_failures: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run playbooks concurrently, one output region each.
    Run {
        #[arg(required = true)]
        playbooks: Vec<String>,
    },
    /// Print a playbook's source.
    Show { playbook: String },
    /// Print the host inventory, or replace it with the contents of a file.
    Hosts {
        #[arg(long)]
        replace_with: Option<PathBuf>,
    },
    Status,
    ClearHistory,
    ToggleTheme,
    SetPlaybooksDir { dir: String },
    ExportHistory {
        #[arg(long, default_value = "json")]
        format: HistoryFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the run history with a `.json` or `.csv` export.
    ImportHistory { path: PathBuf },
}

impl Command {
    fn playbooks(&self) -> Vec<PlaybookId> {
        match self {
            Self::Run { playbooks } => playbooks.iter().map(PlaybookId::new).collect(),
            Self::Show { playbook } => vec![PlaybookId::new(playbook)],
            _ => Vec::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if args.surface_failures {
        settings.transport_policy = TransportPolicy::Surface;
        settings.fallback_policy = FallbackPolicy::Surface;
    }
    info!(server_url = %settings.server_url, "opsconsole starting");

    let gateway: Arc<dyn Gateway> = Arc::new(
        HttpGateway::with_config(settings.gateway_config()).context("invalid server url")?,
    );
    let markup = Markup::console(args.command.playbooks());
    let view = Arc::new(PageView::new(markup.clone()));
    let printer = tokio::spawn(print_events(view.subscribe()));

    let console = Arc::new(Console::with_options(
        gateway,
        view.clone(),
        settings.console_options(),
    ));
    let dispatcher = Dispatcher::wire(console, &markup)?;

    let outcome = execute(&dispatcher, &view, args.command).await;

    // Dropping the last page handle closes the event stream and ends the printer.
    drop(dispatcher);
    drop(view);
    printer.await.context("event printer panicked")?;
    outcome
}

async fn execute(dispatcher: &Dispatcher, view: &PageView, command: Command) -> Result<()> {
    let fire = |id: &str| dispatcher.fire(&ElementId::new(id));

    match command {
        Command::Run { playbooks } => {
            let handles = playbooks
                .iter()
                .map(|playbook| fire(format!("run-{playbook}").as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            settle_all(handles).await
        }
        Command::Show { playbook } => {
            settle_all(vec![fire(format!("show-{playbook}").as_str())?]).await
        }
        Command::Hosts { replace_with: None } => {
            settle_all(vec![fire(markup::SHOW_HOSTS_BTN)?]).await
        }
        Command::Hosts {
            replace_with: Some(path),
        } => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            settle_all(vec![fire(markup::EDIT_HOSTS_BTN)?]).await?;
            if !dispatcher.console().hosts_state().is_editable() {
                bail!("hosts inventory could not be opened for editing");
            }
            view.type_hosts(content)?;
            settle_all(vec![fire(markup::SAVE_HOSTS_BTN)?]).await
        }
        Command::Status => settle_all(vec![fire(markup::STATUS_BTN)?]).await,
        Command::ClearHistory => settle_all(vec![fire(markup::CLEAR_HISTORY_BTN)?]).await,
        Command::ToggleTheme => settle_all(vec![fire(markup::TOGGLE_THEME_BTN)?]).await,
        Command::SetPlaybooksDir { dir } => {
            let settled = dispatcher.console().update_playbooks_dir(&dir).await?;
            check(&settled)
        }
        Command::ExportHistory { format, output } => {
            let body = dispatcher.console().export_history(format).await?;
            match output {
                Some(path) => tokio::fs::write(&path, body)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{body}"),
            }
            Ok(())
        }
        Command::ImportHistory { path } => {
            let contents = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("{} is not a file", path.display()))?;
            let settled = dispatcher
                .console()
                .import_history(&filename, contents)
                .await?;
            check(&settled)
        }
    }
}

async fn settle_all(handles: Vec<ActionHandle>) -> Result<()> {
    let mut failed = 0;
    for joined in join_all(handles).await {
        let settled = joined.context("console task panicked")??;
        if check(&settled).is_err() {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} operation(s) did not complete");
    }
    Ok(())
}

fn check(settled: &Settled) -> Result<()> {
    match settled {
        Settled::Output(_) => Ok(()),
        Settled::Error(message) => bail!("{message}"),
        Settled::Pending => bail!("no result from backend"),
    }
}

async fn print_events(mut events: broadcast::Receiver<ViewEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => render(event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "terminal fell behind page updates")
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn render(event: ViewEvent) {
    match event {
        ViewEvent::RegionUpdated { region, text } => match region.playbook() {
            Some(playbook) => println!("[{playbook}]\n{text}"),
            None => println!("[{region}]\n{text}"),
        },
        ViewEvent::HostsUpdated(panel) if panel.box_visible => {
            let mode = if panel.readonly { "read-only" } else { "editable" };
            println!("--- hosts ({mode}) ---\n{}", panel.content);
        }
        ViewEvent::HostsUpdated(panel) => {
            if !panel.error.is_empty() {
                eprintln!("hosts: {}", panel.error);
            }
        }
        ViewEvent::StatusShown(text) => println!("{text}"),
        ViewEvent::SidebarStyled(style) => println!("sidebar: {}", style.css()),
        ViewEvent::Notified(message) => println!("! {message}"),
        ViewEvent::Reloaded => println!("(page reloaded)"),
    }
}
