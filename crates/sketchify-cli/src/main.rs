//! Sketchify CLI: upload an image, render it and store the project.
//!
//! Configuration comes from SKETCHIFY_* environment variables (and `.env`);
//! global flags override them.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sketchify_cli::{init_tracing, progress_bar};
use sketchify_core::{
    log_error, AppError, Config, ErrorMetadata, IdentityProvider, LocalIdentity,
};
use sketchify_services::{
    create_kv_store, load_project, AttemptOutcome, CandidateFile, CompletionHandler,
    ImageValidator, IngestionSession, ProgressSettings, ProjectFlow, RenderOutput,
    RenderRequester, RenderSession, StorageBackend,
};
use tokio::sync::mpsc;

const PROGRESS_BAR_WIDTH: usize = 30;

#[derive(Parser)]
#[command(name = "sketchify", about = "Turn floor-plan sketches into stored projects")]
struct Cli {
    /// Sign in as this user (overrides SKETCHIFY_USER)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Storage backend: local or memory (overrides SKETCHIFY_STORAGE_BACKEND)
    #[arg(long, global = true)]
    storage_backend: Option<String>,

    /// Emit logs as JSON (always on in production)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a JPG or PNG image and create a project from it
    Upload {
        /// Path to the image
        file: PathBuf,
        /// Project name
        #[arg(long)]
        name: Option<String>,
    },
    /// Render an inline or remote image reference
    Render {
        /// data: URL or http(s) URL
        source: String,
        /// Extra attempts after a failed render
        #[arg(long, default_value = "0")]
        retries: u32,
    },
    /// Show a stored project
    Show {
        /// Project id
        id: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// User-facing failure with the error's suggested action, if any.
fn user_error(err: AppError) -> anyhow::Error {
    log_error(&err, "Command failed");
    tracing::debug!(details = %err.detailed_message(), "Error details");
    match err.suggested_action() {
        Some(action) => anyhow!("{} ({})", err.client_message(), action),
        None => anyhow!("{}", err.client_message()),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(user) = &cli.user {
        config.user = Some(user.clone());
    }
    if let Some(backend) = &cli.storage_backend {
        config.storage_backend = backend.parse::<StorageBackend>()?;
    }
    config.validate()?;
    Ok(config)
}

async fn upload(config: &Config, file: PathBuf, name: Option<String>) -> anyhow::Result<()> {
    let identity = Arc::new(LocalIdentity::new(config.user.clone()));
    if config.user.is_some() {
        let user = identity.sign_in().await.map_err(user_error)?;
        tracing::info!(user = %user.username, "Signed in");
    }
    if !identity.is_signed_in() {
        return Err(user_error(AppError::Unauthorized(
            "Sign in to upload images".to_string(),
        )));
    }

    let candidate = CandidateFile::from_path(&file)
        .await
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let (tx, mut completions) = mpsc::unbounded_channel();
    let on_complete: CompletionHandler = Arc::new(move |image| {
        let _ = tx.send(image);
    });
    let session = IngestionSession::new(
        identity,
        ImageValidator::from_config(config),
        ProgressSettings::from_config(config),
        on_complete,
    );

    let mut progress = session.subscribe_progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let value = *progress.borrow_and_update();
            eprint!("\r{}", progress_bar(value, PROGRESS_BAR_WIDTH));
            let _ = std::io::stderr().flush();
        }
    });

    let outcome = session.on_pick(candidate).await;
    let image = match outcome {
        AttemptOutcome::Started => completions
            .recv()
            .await
            .ok_or_else(|| anyhow!("Upload session ended before completion"))?,
        AttemptOutcome::Rejected(e) => return Err(user_error(e.into())),
        AttemptOutcome::ReadFailed => {
            return Err(user_error(AppError::ReadError(file.display().to_string())))
        }
        AttemptOutcome::Ignored | AttemptOutcome::Superseded => {
            bail!("Upload was not processed")
        }
    };

    session.close();
    drop(session);
    let _ = printer.await;
    eprintln!();

    let flow = ProjectFlow::from_config(config).await?;
    let record = flow
        .complete_upload(&image, name.as_deref())
        .await
        .map_err(|e| user_error(e.into()))?;

    print_json(&record)
}

async fn render(config: &Config, source: String, retries: u32) -> anyhow::Result<()> {
    let requester = RenderRequester::from_config(config)?;
    let mut session = RenderSession::new(requester, Some(source), None);

    session.start().await;
    let mut attempt = 0;
    while session.error().is_some() && attempt < retries {
        attempt += 1;
        tracing::info!(attempt, retries, "Retrying render");
        session.retry().await;
    }

    if let Some(message) = session.error() {
        bail!("{}", message);
    }
    let rendered_image = session
        .current_image()
        .ok_or_else(|| anyhow!("Render produced no image"))?
        .to_string();

    print_json(&RenderOutput {
        rendered_image,
        rendered_path: None,
    })
}

async fn show(config: &Config, id: String) -> anyhow::Result<()> {
    let kv = create_kv_store(config)
        .await
        .context("Failed to open key-value store")?;
    match load_project(kv.as_ref(), &id).await? {
        Some(project) => print_json(&project),
        None => bail!("Project {} not found", id),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(cli.log_json || config.is_production());

    match cli.command {
        Commands::Upload { file, name } => upload(&config, file, name).await,
        Commands::Render { source, retries } => render(&config, source, retries).await,
        Commands::Show { id } => show(&config, id).await,
    }
}
