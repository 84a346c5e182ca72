use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::Config;
use crate::download;
use crate::report::{self, RunReport};
use crate::session::{RemoteStore, SftpSession};

/// Run the whole extraction: parse the manifest, prompt for the password,
/// open one SFTP session, copy every selected document and report.
///
/// Per-file fetch failures are collected, not propagated — the run still
/// returns `Ok` when the connection succeeded, whatever the per-file error
/// count. Any error returned from here is fatal and maps to exit code 1 in
/// `main`. The session is closed on every path: explicitly at the end of
/// the run, and by `Drop` when an error propagates out early.
pub fn handle_extract(config: &Config) -> Result<()> {
    report::print_banner();

    let filter = config.filter_set();
    println!("\nParsing {}...", config.manifest_path.display());
    let documents = crate::manifest::parse_manifest(&config.manifest_path, filter.as_ref())?;
    tracing::debug!("manifest loaded: {} documents selected", documents.len());

    if let Some(ids) = &filter {
        let mut ids: Vec<u64> = ids.iter().copied().collect();
        ids.sort_unstable();
        println!("Found {} documents for patient IDs {:?}", documents.len(), ids);
    }
    if documents.is_empty() {
        return Err(crate::ExtractError::NoMatchingDocuments.into());
    }

    report::print_prerun(&documents);

    if config.host.is_empty() {
        return Err(crate::ExtractError::HostNotConfigured.into());
    }
    println!("SFTP Server: {}", config.host);
    println!("Username: {}", config.username);
    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        return Err(crate::ExtractError::MissingPassword.into());
    }

    println!("\nConnecting to {}...", config.host);
    let mut session =
        SftpSession::connect(&config.host, config.port, &config.username, &password)?;
    println!("{}", "Connected successfully!".green());

    // Connectivity probe only; a listing failure never aborts the run.
    match session.list_directory(".") {
        Ok(entries) => {
            let preview: Vec<&String> = entries.iter().take(5).collect();
            if entries.len() > 5 {
                println!("Root directory contents: {:?}...", preview);
            } else {
                println!("Root directory contents: {:?}", preview);
            }
        }
        Err(e) => println!("{} could not list root directory: {}", "Warning:".yellow(), e),
    }

    let patient_count = download::group_by_patient(&documents).len();
    println!("\nDownloading documents for {} patients...\n", patient_count);
    tracing::debug!("download phase started");

    let progress = RunReport::start(documents.len() as u64);
    let outcome =
        download::download_documents(&session, &documents, &config.output_dir, &progress)?;
    progress.finish();
    tracing::debug!(
        "download phase finished: {} ok, {} failed",
        outcome.success_count,
        outcome.error_count
    );

    report::print_summary(&outcome, &config.output_dir);

    if !outcome.errors.is_empty()
        && let Some(home) = dirs::home_dir()
        && let Ok(app_dir) = crate::util::ensure_app_dir(&home)
        && let Some(path) = crate::util::write_failures_jsonl(&app_dir, &outcome.errors)
    {
        println!("Failure ledger written: {}", path.display());
    }

    session.close();
    println!("\nConnection closed.");
    Ok(())
}
