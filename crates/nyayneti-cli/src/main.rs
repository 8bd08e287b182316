//! nyayneti-draft: Command-line client for the NyayNeti drafting backend.
//!
//! Runs the guided drafting workflow non-interactively: pick a template,
//! optionally extract values from an uploaded case document, supply the
//! remaining fields and generate the draft.

mod logging;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use nyayneti_client::{ClientConfig, HttpDraftingBackend};
use nyayneti_core::DraftingBackend;
use nyayneti_drafter::{DraftingWorkflow, WorkflowStep};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "nyayneti-draft")]
#[command(author, version, about = "Draft legal documents with the NyayNeti backend")]
#[command(propagate_version = true)]
struct Cli {
    /// Backend base URL (overrides config file and NYAYNETI_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available document templates
    Templates,

    /// List uploaded documents usable as drafting context
    Documents,

    /// Check that the backend is reachable
    Health,

    /// Generate a draft from a template
    Draft {
        /// Template id (see `templates`)
        #[arg(short, long)]
        template: String,

        /// Uploaded document to extract field values from
        #[arg(short, long)]
        context: Option<String>,

        /// Field value as name=value (can specify multiple; overrides extracted values)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Directory to download the generated document into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_json, cli.log_file.as_deref());

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns false when the command completed but reports failure.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let backend = Arc::new(build_backend(cli.api_url)?);

    match cli.command {
        Commands::Templates => cmd_templates(&backend).await?,
        Commands::Documents => cmd_documents(&backend).await?,
        Commands::Health => return cmd_health(&backend).await,
        Commands::Draft {
            template,
            context,
            fields,
            output,
        } => cmd_draft(backend, &template, context.as_deref(), &fields, output).await?,
    }

    Ok(true)
}

fn build_backend(api_url: Option<String>) -> anyhow::Result<HttpDraftingBackend> {
    let mut config = ClientConfig::load().context("Failed to load client configuration")?;
    if let Some(url) = api_url {
        config.base_url = url;
    }
    Ok(HttpDraftingBackend::new(config)?)
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name is empty in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_templates(backend: &HttpDraftingBackend) -> anyhow::Result<()> {
    let templates = backend.list_templates().await?;
    print_json(&serde_json::to_value(templates)?)
}

async fn cmd_documents(backend: &HttpDraftingBackend) -> anyhow::Result<()> {
    let documents = backend.list_documents().await?;
    print_json(&serde_json::to_value(documents)?)
}

async fn cmd_health(backend: &HttpDraftingBackend) -> anyhow::Result<bool> {
    let healthy = backend.health_check().await?;
    print_json(&json!({
        "api_url": backend.config().base_url,
        "healthy": healthy,
    }))?;
    Ok(healthy)
}

async fn cmd_draft(
    backend: Arc<HttpDraftingBackend>,
    template_id: &str,
    context: Option<&str>,
    fields: &[(String, String)],
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut workflow = DraftingWorkflow::start(backend.clone()).await;
    if let Some(message) = workflow.error() {
        bail!("{}", message);
    }

    workflow.select_template(template_id)?;

    match context {
        Some(doc_id) => {
            workflow.select_context(doc_id).await?;
            if let Some(advisory) = workflow.error() {
                warn!("{}", advisory);
            }
        }
        None => workflow.skip_context()?,
    }

    for (name, value) in fields {
        workflow.set_field(name, value.as_str())?;
    }

    let missing: Vec<&str> = workflow
        .missing_required_fields()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    if !missing.is_empty() {
        warn!(fields = ?missing, "Generating with required fields left empty");
    }

    workflow.generate().await?;
    if workflow.step() != WorkflowStep::Review {
        bail!(
            "{}",
            workflow.error().unwrap_or("Draft generation did not complete")
        );
    }

    let draft = workflow
        .result()
        .ok_or_else(|| anyhow!("No draft in review step"))?;

    let saved_to = match &output {
        Some(dir) => {
            let path = backend
                .download_draft_to(&draft.filename, dir)
                .await
                .with_context(|| format!("Failed to download {}", draft.filename))?;
            info!(path = %path.display(), "Draft saved");
            Some(path.display().to_string())
        }
        None => None,
    };

    print_json(&json!({
        "template": template_id,
        "context_doc_id": workflow.context_doc_id(),
        "filename": draft.filename,
        "format": draft.format(),
        "citations": draft.citations,
        "download_url": workflow.download_url(),
        "saved_to": saved_to,
        "full_text": draft.full_text,
    }))
}
