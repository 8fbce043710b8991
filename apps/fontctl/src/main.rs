use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use console_core::{
    AlwaysConfirm, ApplyError, ConfirmationRequest, ConsoleEvent, FontConsoleClient,
    HttpFontStore, PendingFontFile, UserConfirmation,
};
use shared::domain::FontOrigin;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "fontctl", about = "Pending-change workflow for the font store")]
struct Args {
    #[arg(long)]
    server_url: String,
    /// Session token for the already-authenticated console session.
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show store availability and regeneration state.
    Status,
    /// List font families known to the store.
    List {
        #[arg(long)]
        custom: bool,
    },
    /// Upload files and/or remove families, then regenerate.
    Apply {
        #[arg(long = "add", value_name = "FILE")]
        add: Vec<PathBuf>,
        #[arg(long = "remove", value_name = "FAMILY")]
        remove: Vec<String>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Trigger regeneration without any pending changes.
    Regenerate {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

/// Interactive y/N prompt on stdin; `--yes` swaps in [`AlwaysConfirm`].
struct PromptConfirmation;

#[async_trait]
impl UserConfirmation for PromptConfirmation {
    async fn confirm(&self, request: ConfirmationRequest) -> bool {
        let summary = match request {
            ConfirmationRequest::ApplyPending {
                additions,
                deletions,
            } => format!("upload {additions} file(s), remove {deletions} family(ies), then regenerate"),
            ConfirmationRequest::RegenerateOnly => "regenerate the font store".to_string(),
        };
        print!("{summary}? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut store = HttpFontStore::new(args.server_url);
    if let Some(token) = args.token {
        store = store.with_session_token(token);
    }
    let skip_prompt = matches!(
        args.command,
        Command::Apply { yes: true, .. } | Command::Regenerate { yes: true }
    );
    let confirmation: Arc<dyn UserConfirmation> = if skip_prompt {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(PromptConfirmation)
    };
    let client = FontConsoleClient::new_with_confirmation(Arc::new(store), confirmation);

    match args.command {
        Command::Status => {
            let status = client.store_status().await?;
            println!(
                "available={} fonts={} custom={} generating={}",
                status.available, status.total_count, status.custom_count, status.is_generating
            );
            if let Some(job) = status.current_job {
                println!("current job: {}", job.0);
            }
        }
        Command::List { custom } => {
            client.refresh_catalog().await?;
            let catalog = client.catalog_snapshot().await;
            for resource in catalog.resources() {
                if custom && !resource.is_custom() {
                    continue;
                }
                let origin = match resource.origin {
                    FontOrigin::Builtin => "builtin",
                    FontOrigin::Custom => "custom",
                };
                println!("{} [{}] {}", resource.name, origin, resource.files.join(", "));
            }
        }
        Command::Apply { add, remove, .. } => {
            client.refresh_catalog().await?;
            let mut files = Vec::new();
            for path in add {
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .with_context(|| format!("unusable file name: {}", path.display()))?
                    .to_string();
                files.push(PendingFontFile { file_name, bytes });
            }
            client.add_font_files(files).await;
            for name in remove {
                client.mark_for_deletion(name).await;
            }
            run_apply(&client).await?;
        }
        Command::Regenerate { .. } => {
            run_apply(&client).await?;
        }
    }

    Ok(())
}

async fn run_apply(client: &Arc<FontConsoleClient>) -> Result<()> {
    let mut events = client.subscribe_events();
    let report = match client.apply_pending_changes().await {
        Ok(report) => report,
        Err(ApplyError::Cancelled) => {
            println!("aborted");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    for warning in &report.warnings {
        warn!("{warning}");
    }
    if report.job.adopted {
        println!("regeneration already running, following job {}", report.job.job_id.0);
    } else {
        println!("regeneration job {} started", report.job.job_id.0);
    }

    loop {
        match events.recv().await? {
            ConsoleEvent::JobProgress { status, message, .. } => {
                println!("  {:?}: {}", status, message.unwrap_or_default());
            }
            ConsoleEvent::JobCompleted { job_id } => {
                println!("job {} completed", job_id.0);
                break;
            }
            ConsoleEvent::JobFailed { job_id, detail } => {
                println!(
                    "job {} failed: {}",
                    job_id.0,
                    detail.unwrap_or_else(|| "no detail reported".to_string())
                );
                break;
            }
            _ => {}
        }
    }
    client.shutdown().await;
    Ok(())
}
