///
/// This module implements the CLI interface for nic-upload: command parsing, wiring of
/// the concrete credential stores and HTTP transport, and the async `run` entrypoint.
///
/// All state and reconciliation logic lives in [`nic-upload-core`]; this module only
/// gathers files from the two input sources, drives one submission and renders it.
///
/// ## How To Use
/// - For command-line users: `nic-upload upload <FILES>... [--drop <DIR>]...`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`nic-upload-core`]: ../../nic-upload-core/
use crate::credentials::{ChainedCredentialStore, EnvCredentialStore, FileCredentialStore};
use crate::files::{read_drop_dir, read_selection};
use crate::load_config::{load_config, CliConfig, ConfigOverrides};
use crate::presenter::ConsolePresenter;
use crate::upload::HttpTransport;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use nic_upload_core::accumulator::FileSource;
use nic_upload_core::contract::StatusPresenter;
use nic_upload_core::reconcile::SubmissionStatus;
use nic_upload_core::session::UploadSession;
use nic_upload_core::submitter::{BatchSubmitter, SubmitterConfig};
use std::path::PathBuf;

/// CLI for nic-upload: submit files for NIC validation.
#[derive(Parser)]
#[clap(
    name = "nic-upload",
    version,
    about = "Submit files for NIC validation and report invalid entries per file"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload the given files as one batch and print the validation report
    Upload {
        /// Files to upload, sent in the order given
        files: Vec<PathBuf>,
        /// Add every file directly inside DIR, after the explicit files (repeatable)
        #[clap(long = "drop", value_name = "DIR")]
        drop_dirs: Vec<PathBuf>,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Upload endpoint URL, overriding the config file
        #[clap(long)]
        endpoint: Option<String>,
        /// Seconds to wait for the upload before giving up, overriding the config file
        #[clap(long)]
        timeout_secs: Option<u64>,
    },
}

fn build_submitter(
    config: &CliConfig,
) -> Result<BatchSubmitter<ChainedCredentialStore, HttpTransport>> {
    let token_name = &config.credential.token_name;
    let mut credentials = ChainedCredentialStore::new().with(EnvCredentialStore::new(token_name));
    if let Some(file) = &config.credential.file {
        credentials = credentials.with(FileCredentialStore::new(file, token_name));
    }

    let transport = HttpTransport::new(config.upload.endpoint.clone(), config.upload.timeout())
        .context("Failed to build HTTP client")?;

    Ok(BatchSubmitter::new(
        credentials,
        transport,
        SubmitterConfig {
            field_name: config.upload.field_name.clone(),
            timeout: config.upload.timeout(),
        },
    ))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Upload {
            files,
            drop_dirs,
            config,
            endpoint,
            timeout_secs,
        } => {
            let config = match config {
                Some(path) => load_config(path)?,
                None => CliConfig::default(),
            }
            .apply(&ConfigOverrides {
                endpoint,
                timeout_secs,
            })?;

            let mut session = UploadSession::new();
            if !files.is_empty() {
                session.add_files(FileSource::Selection, read_selection(&files).await?);
            }
            for dir in &drop_dirs {
                session.add_files(FileSource::DragDrop, read_drop_dir(dir).await?);
            }
            if session.files().is_empty() {
                bail!("No files to upload: pass file paths or --drop <DIR>");
            }

            let mut presenter = ConsolePresenter::new(std::io::stdout());
            presenter.render(session.files(), session.status());

            let submitter = build_submitter(&config)?;
            let ticket = session.begin_submission()?;
            presenter.render(session.files(), session.status());
            let outcome = submitter.submit(ticket.files()).await;
            session.complete_submission(ticket, outcome);
            presenter.render(session.files(), session.status());

            match session.status() {
                SubmissionStatus::Failed(reason) => {
                    tracing::error!(command = "upload", error = %reason, "Upload failed");
                    Err(anyhow!("Upload failed: {reason}"))
                }
                status => {
                    tracing::info!(command = "upload", status = status.label(), "Upload complete");
                    Ok(())
                }
            }
        }
    }
}
