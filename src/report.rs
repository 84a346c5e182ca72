use std::path::Path;

use cli_table::{Cell, CellStruct, Style, Table, format::Justify, print_stdout};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::download::DownloadOutcome;
use crate::manifest::DocumentRecord;

const MAX_REPORTED_ERRORS: usize = 10;

pub fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("{}", "Patient Document SFTP Extraction Tool".bold());
    println!("{}", "=".repeat(60));
}

/// Pre-run listing: distinct patients sorted by last-then-first name with
/// per-patient document counts, plus the overall total.
pub fn print_prerun(documents: &[DocumentRecord]) {
    let mut groups = crate::download::group_by_patient(documents);
    groups.sort_by(|a, b| {
        a.last_name.cmp(b.last_name).then_with(|| a.first_name.cmp(b.first_name))
    });

    println!("\nPatients to process:");
    let title = vec!["Patient".cell().bold(true), "Documents".cell().bold(true)];
    let mut table: Vec<Vec<CellStruct>> = Vec::new();
    for group in &groups {
        table.push(vec![
            group.folder_name().cell(),
            group.documents.len().cell().justify(Justify::Right),
        ]);
    }
    if print_stdout(table.table().title(title)).is_err() {
        // Fall back to plain lines when the table can't render (no tty).
        for group in &groups {
            println!("  - {}: {} documents", group.folder_name(), group.documents.len());
        }
    }
    println!("Total documents: {}\n", documents.len());
}

/// Per-file progress output for the download phase. Lines are routed through
/// the progress bar so they stay above it while it redraws.
pub struct RunReport {
    pb: ProgressBar,
}

impl RunReport {
    pub fn start(total_documents: u64) -> Self {
        let pb = ProgressBar::new(total_documents);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
            )
            .expect("valid progress template")
            .progress_chars("=> "),
        );
        Self { pb }
    }

    /// Silent report for tests; nothing is drawn or printed.
    pub fn hidden() -> Self {
        Self { pb: ProgressBar::hidden() }
    }

    pub fn patient_started(&self, folder_name: &str, document_count: usize) {
        self.pb.println(format!("Processing: {} ({} documents)", folder_name, document_count));
    }

    pub fn file_downloaded(&self, file_name: &str) {
        self.pb.println(format!("  {}: {}", "Downloaded".green(), file_name));
        self.pb.inc(1);
    }

    pub fn file_failed(&self, file_name: &str, error: &str) {
        self.pb.println(format!("  {}: {} - {}", "ERROR".red(), file_name, error));
        self.pb.inc(1);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

/// Post-run summary: totals, output directory, and up to the first ten
/// error records followed by a remainder count.
pub fn print_summary(outcome: &DownloadOutcome, output_root: &Path) {
    println!("\n{}", "=".repeat(60));
    println!("EXTRACTION COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Successfully downloaded: {}", outcome.success_count.green());
    println!("Errors: {}", outcome.error_count.red());
    println!("Output directory: {}", output_root.display());

    if !outcome.errors.is_empty() {
        println!("\nErrors encountered:");
        for err in outcome.errors.iter().take(MAX_REPORTED_ERRORS) {
            println!("  - {}/{}: {}", err.patient, err.file, err.error);
        }
        if outcome.errors.len() > MAX_REPORTED_ERRORS {
            println!("  ... and {} more errors", outcome.errors.len() - MAX_REPORTED_ERRORS);
        }
    }
}
