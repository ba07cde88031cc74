// This is the entry point of the note converter.
//
// **Architecture Overview:**
// - `core/` = Conversion logic (markdown classification, Docs requests)
// - `infra/` = Implementations of core traits (Google Docs over HTTP)
//
// This file's job is to:
// 1. Load configuration
// 2. Read the note (before any network call)
// 3. Build the API session for the run mode (dependency injection)
// 4. Run the conversion and report the result

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::process::ExitCode;

use anyhow::Context;

use crate::core::conversion::{plan_note, read_note, ConversionConfig, ConversionService, RunMode};
use crate::infra::google_docs::{
    DocsAuth, GoogleDocsClient, InstalledAppAuth, ServiceAccountAuth,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so a dry run's JSON on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Conversion failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ConversionConfig::from_env().context("Invalid configuration")?;

    let markdown = read_note(&config.note_path).await?;

    if config.dry_run {
        let plan = plan_note(&markdown);
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // The session is built once for this run and handed to the service.

    let auth = match config.run_mode {
        RunMode::Local => {
            let auth =
                InstalledAppAuth::from_files(&config.credentials_path, &config.token_cache_path)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("Failed to set up OAuth client")?;
            DocsAuth::InstalledApp(auth)
        }
        RunMode::Hosted => {
            let auth = ServiceAccountAuth::from_key(&config.service_account_key)
                .await
                .map_err(|e| anyhow::anyhow!(e))
                .context("Failed to set up service account")?;
            tracing::info!("Authenticating as service account {}", auth.client_email());
            DocsAuth::ServiceAccount(auth)
        }
    };

    let service = ConversionService::new(GoogleDocsClient::new(auth));

    println!("📝 Converting {}", config.note_path.display());
    let report = service.convert(&markdown, &config.target).await?;

    if report.created {
        println!("Created document with title: {}", report.document.title);
    }
    println!("Document ID: {}", report.document.document_id);
    println!(
        "✅ Wrote {} body and {} footer request(s): {}",
        report.body_requests,
        report.footer_requests,
        report.document.edit_url()
    );

    Ok(())
}
